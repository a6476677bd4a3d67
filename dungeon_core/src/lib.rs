use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod dungeon;
pub mod error;
pub mod map;
pub mod monster;
pub mod perception;
pub mod player;
pub mod solver;
pub mod strategy;
pub mod topology;

pub use dungeon::{CandidateOrder, Dungeon, DungeonConfig};
pub use error::{ConfigError, DungeonError, Outcome};

/// Represents a grid coordinate as (row, col).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Returns the manhattan distance between two positions.
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four compass directions a passage can lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Returns the direction pointing back the way this one came.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        };
        f.write_str(letter)
    }
}

impl FromStr for Direction {
    type Err = DungeonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "s" | "south" => Ok(Direction::South),
            "e" | "east" => Ok(Direction::East),
            "w" | "west" => Ok(Direction::West),
            _ => Err(DungeonError::UnknownDirection(s.to_string())),
        }
    }
}

/// The kinds of treasure found in caves. Treasures compare by kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Treasure {
    Ruby,
    Sapphire,
    Diamond,
}

impl Treasure {
    pub const ALL: [Treasure; 3] = [Treasure::Ruby, Treasure::Sapphire, Treasure::Diamond];
}

impl fmt::Display for Treasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Treasure::Ruby => "Ruby",
            Treasure::Sapphire => "Sapphire",
            Treasure::Diamond => "Diamond",
        };
        f.write_str(name)
    }
}

/// Represents anything the player can pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Arrow,
    Treasure(Treasure),
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Arrow => f.write_str("Arrow"),
            Item::Treasure(treasure) => treasure.fmt(f),
        }
    }
}

impl FromStr for Item {
    type Err = DungeonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrow" => Ok(Item::Arrow),
            "ruby" => Ok(Item::Treasure(Treasure::Ruby)),
            "sapphire" => Ok(Item::Treasure(Treasure::Sapphire)),
            "diamond" => Ok(Item::Treasure(Treasure::Diamond)),
            _ => Err(DungeonError::InvalidItem(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Position::new(0, 4);
        let b = Position::new(3, 1);
        assert_eq!(a.manhattan_distance(&b), 6);
        assert_eq!(b.manhattan_distance(&a), 6);
        assert_eq!(a.manhattan_distance(&a), 0);
    }

    #[test]
    fn directions_parse_from_letters_and_words() {
        assert_eq!("N".parse::<Direction>().unwrap(), Direction::North);
        assert_eq!("west".parse::<Direction>().unwrap(), Direction::West);
        assert_eq!(" e ".parse::<Direction>().unwrap(), Direction::East);
        assert!(matches!(
            "up".parse::<Direction>(),
            Err(DungeonError::UnknownDirection(_))
        ));
    }

    #[test]
    fn opposite_is_an_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction, direction.opposite());
            assert_eq!(direction, direction.opposite().opposite());
        }
    }

    #[test]
    fn items_parse_case_insensitively() {
        assert_eq!("ARROW".parse::<Item>().unwrap(), Item::Arrow);
        assert_eq!(
            "Sapphire".parse::<Item>().unwrap(),
            Item::Treasure(Treasure::Sapphire)
        );
        assert!(matches!(
            "emerald".parse::<Item>(),
            Err(DungeonError::InvalidItem(name)) if name == "emerald"
        ));
    }
}
