use serde::{Deserialize, Serialize};

use crate::{Direction, Item, Position, map::GridError, player::PlayerState};

/// Represents invalid dungeon construction or seeding parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Dungeon must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },
    #[error("A {rows}x{cols} dungeon has more caves than can be addressed")]
    TooLarge { rows: usize, cols: usize },
    #[error("Rows or columns must be >= 5, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },
    #[error("A {rows}x{cols} dungeon cannot separate start and end by at least {min_distance}")]
    CannotSeparate {
        rows: usize,
        cols: usize,
        min_distance: usize,
    },
    #[error("Wrapping dungeon cannot have interconnectivity = 0")]
    WrappingWithoutInterconnectivity,
    #[error("Non-wrapping dungeon cannot have interconnectivity > 0, got {0}")]
    NonWrappingWithInterconnectivity(usize),
    #[error("Number of otyughs must be > 0 and <= {max}, got {requested}")]
    OtyughCount { requested: usize, max: usize },
    #[error("Only {free} caves are free for {requested} additional otyughs")]
    NotEnoughCaves { requested: usize, free: usize },
}

/// Represents errors raised by dungeon operations and player actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DungeonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Player not created, call enter_player first")]
    NotReady,
    #[error("Unknown direction '{0}'")]
    UnknownDirection(String),
    #[error("No passage leads {direction} from cave {position}")]
    InvalidDirection {
        position: Position,
        direction: Direction,
    },
    #[error("No arrows left")]
    NoArrows,
    #[error("{item} not available at cave {position}")]
    NotAvailable { item: Item, position: Position },
    #[error("Invalid item '{0}'")]
    InvalidItem(String),
    #[error("Arrow distance must be at least 1")]
    InvalidDistance,
    #[error("Cave {position} already holds an otyugh")]
    Occupied { position: Position },
    #[error("Player was eaten by an otyugh at cave {position}")]
    Eaten { position: Position },
    #[error("The game is over, player is {state:?}")]
    GameOver { state: PlayerState },
}

impl DungeonError {
    /// Maps a per-turn failure onto its stable outcome code.
    ///
    /// Returns `None` for errors that are not produced by player actions.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            DungeonError::Eaten { .. } => Some(Outcome::Eaten),
            DungeonError::InvalidDirection { .. } | DungeonError::UnknownDirection(_) => {
                Some(Outcome::InvalidDirection)
            }
            DungeonError::NoArrows => Some(Outcome::NoArrows),
            DungeonError::NotAvailable { .. } | DungeonError::InvalidItem(_) => {
                Some(Outcome::NotAvailable)
            }
            _ => None,
        }
    }
}

/// Stable result codes for per-turn player actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Ok,
    PickedUpArrows(u32),
    ShotMissed,
    ShotHit,
    ShotKilled,
    Eaten,
    InvalidDirection,
    NoArrows,
    NotAvailable,
}

impl Outcome {
    /// Collapses an action result into a single outcome code.
    pub fn from_result(result: &Result<Outcome, DungeonError>) -> Option<Outcome> {
        match result {
            Ok(outcome) => Some(*outcome),
            Err(err) => err.outcome(),
        }
    }
}
