use std::{collections::BTreeMap, fmt};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Direction, Item, Position, Treasure,
    error::{ConfigError, DungeonError, Outcome},
    map::Grid,
    monster::Otyugh,
    perception::{self, Smell},
    player::{Player, PlayerDescription, PlayerState},
    solver,
    topology::{self, Edge},
};

pub use crate::topology::CandidateOrder;

/// Minimum manhattan distance between the start and end caves.
pub const MIN_START_END_DISTANCE: usize = 5;

/// Something that can hold a pile of arrows: caves and the passages between them.
pub trait ArrowCache {
    /// Number of arrows currently cached.
    fn arrows(&self) -> u32;

    fn add_arrow(&mut self);

    /// Removes and returns every cached arrow.
    fn take_arrows(&mut self) -> u32;
}

/// A directed, single-hop connection out of a cave.
///
/// Endpoints are stored as positions into the dungeon grid. Every passage has
/// a twin leading the opposite way, stored on its destination cave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    direction: Direction,
    source: Position,
    destination: Position,
    arrows: u32,
}

impl Passage {
    pub fn new(direction: Direction, source: Position, destination: Position) -> Self {
        Passage {
            direction,
            source,
            destination,
            arrows: 0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn source(&self) -> Position {
        self.source
    }

    pub fn destination(&self) -> Position {
        self.destination
    }
}

impl ArrowCache for Passage {
    fn arrows(&self) -> u32 {
        self.arrows
    }

    fn add_arrow(&mut self) {
        self.arrows += 1;
    }

    fn take_arrows(&mut self) -> u32 {
        std::mem::take(&mut self.arrows)
    }
}

/// A single cave: its exits, loot, and at most one otyugh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    position: Position,
    passages: Vec<Passage>,
    treasures: Vec<Treasure>,
    arrows: u32,
    otyugh: Option<Otyugh>,
}

impl Node {
    pub fn new(position: Position) -> Self {
        Node {
            position,
            passages: Vec::new(),
            treasures: Vec::new(),
            arrows: 0,
            otyugh: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// Returns the passage leading `direction`, if there is one.
    pub fn passage(&self, direction: Direction) -> Option<&Passage> {
        self.passages.iter().find(|p| p.direction == direction)
    }

    pub(crate) fn passage_mut(&mut self, direction: Direction) -> Option<&mut Passage> {
        self.passages.iter_mut().find(|p| p.direction == direction)
    }

    /// Directions with a passage, in the order the passages were dug.
    pub fn exits(&self) -> Vec<Direction> {
        self.passages.iter().map(Passage::direction).collect()
    }

    pub fn treasures(&self) -> &[Treasure] {
        &self.treasures
    }

    pub fn otyugh(&self) -> Option<&Otyugh> {
        self.otyugh.as_ref()
    }

    pub(crate) fn otyugh_mut(&mut self) -> Option<&mut Otyugh> {
        self.otyugh.as_mut()
    }

    pub fn has_live_otyugh(&self) -> bool {
        self.otyugh.as_ref().is_some_and(Otyugh::is_alive)
    }

    /// Arrows cached in this cave's outgoing passages.
    pub fn passage_arrows(&self) -> u32 {
        self.passages.iter().map(ArrowCache::arrows).sum()
    }

    pub(crate) fn add_passage(&mut self, passage: Passage) {
        debug_assert!(
            self.passage(passage.direction).is_none(),
            "cave {} already has a passage {}",
            self.position,
            passage.direction
        );
        self.passages.push(passage);
    }

    pub(crate) fn add_treasure(&mut self, treasure: Treasure) {
        self.treasures.push(treasure);
    }

    /// Removes one treasure of the given kind.
    pub(crate) fn take_treasure(&mut self, kind: Treasure) -> Option<Treasure> {
        let index = self.treasures.iter().position(|t| *t == kind)?;
        Some(self.treasures.remove(index))
    }

    /// Removes and returns every treasure in the cave.
    pub(crate) fn take_all_treasure(&mut self) -> Vec<Treasure> {
        std::mem::take(&mut self.treasures)
    }

    pub(crate) fn add_otyugh(&mut self, otyugh: Otyugh) -> Result<(), DungeonError> {
        if self.otyugh.is_some() {
            return Err(DungeonError::Occupied {
                position: self.position,
            });
        }
        self.otyugh = Some(otyugh);
        Ok(())
    }

    pub(crate) fn remove_otyugh(&mut self) -> Option<Otyugh> {
        self.otyugh.take()
    }

    /// Counts each treasure kind present.
    pub fn treasure_tally(&self) -> BTreeMap<Treasure, usize> {
        tally(&self.treasures)
    }
}

impl ArrowCache for Node {
    fn arrows(&self) -> u32 {
        self.arrows
    }

    fn add_arrow(&mut self) {
        self.arrows += 1;
    }

    fn take_arrows(&mut self) -> u32 {
        std::mem::take(&mut self.arrows)
    }
}

pub(crate) fn tally(treasures: &[Treasure]) -> BTreeMap<Treasure, usize> {
    let mut counts = BTreeMap::new();
    for treasure in treasures {
        *counts.entry(*treasure).or_insert(0) += 1;
    }
    counts
}

/// Parameters fixed when a dungeon is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonConfig {
    pub wrapping: bool,
    pub rows: usize,
    pub cols: usize,
    pub interconnectivity: usize,
    #[serde(default)]
    pub candidate_order: CandidateOrder,
}

impl DungeonConfig {
    pub fn new(wrapping: bool, rows: usize, cols: usize, interconnectivity: usize) -> Self {
        DungeonConfig {
            wrapping,
            rows,
            cols,
            interconnectivity,
            candidate_order: CandidateOrder::RowMajor,
        }
    }

    pub fn with_candidate_order(mut self, order: CandidateOrder) -> Self {
        self.candidate_order = order;
        self
    }

    /// Checks the parameters without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (rows, cols) = (self.rows, self.cols);
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        if rows.checked_mul(cols).is_none() {
            return Err(ConfigError::TooLarge { rows, cols });
        }
        if rows < 5 && cols < 5 {
            return Err(ConfigError::TooSmall { rows, cols });
        }
        // Farthest pair of cells is opposite corners.
        if (rows - 1) + (cols - 1) < MIN_START_END_DISTANCE {
            return Err(ConfigError::CannotSeparate {
                rows,
                cols,
                min_distance: MIN_START_END_DISTANCE,
            });
        }
        match (self.wrapping, self.interconnectivity) {
            (true, 0) => Err(ConfigError::WrappingWithoutInterconnectivity),
            (false, n) if n > 0 => Err(ConfigError::NonWrappingWithInterconnectivity(n)),
            _ => Ok(()),
        }
    }
}

/// Human-readable state of a single cave, as the player would perceive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescription {
    pub position: Position,
    pub smell: Smell,
    pub arrows: u32,
    pub treasures: BTreeMap<Treasure, usize>,
    pub exits: Vec<Direction>,
}

impl fmt::Display for NodeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.smell {
            Smell::Strong => writeln!(f, "A terrible smell is coming from nearby")?,
            Smell::Faint => writeln!(f, "A less pungent smell is coming from nearby")?,
            Smell::None => {}
        }
        write!(f, "You are in cave {}", self.position)?;
        if self.arrows > 0 || !self.treasures.is_empty() {
            let mut loot = Vec::new();
            if self.arrows > 0 {
                loot.push(format!("{} Arrow", self.arrows));
            }
            for (treasure, count) in &self.treasures {
                loot.push(format!("{count} {treasure}"));
            }
            write!(f, "\nYou find {} here", loot.join(", "))?;
        }
        let exits: Vec<String> = self.exits.iter().map(ToString::to_string).collect();
        write!(f, "\nDoors lead to the {}", exits.join(", "))
    }
}

/// The dungeon: a grid of caves joined by passages, plus the player exploring it.
///
/// All randomness (start/end choice, item and otyugh placement, the coin flip
/// when meeting a wounded otyugh) comes from the injected `rng`, so a seeded
/// dungeon replays identically.
#[derive(Debug)]
pub struct Dungeon<R = StdRng> {
    config: DungeonConfig,
    grid: Grid<Node>,
    start: Position,
    end: Position,
    item_percentage: u32,
    otyugh_count: usize,
    player: Option<Player>,
    rng: R,
}

impl Dungeon<StdRng> {
    /// Builds a dungeon seeded from the operating system.
    pub fn new(config: DungeonConfig) -> Result<Self, DungeonError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Builds a reproducible dungeon from a fixed seed.
    pub fn seeded(config: DungeonConfig, seed: u64) -> Result<Self, DungeonError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Dungeon<R> {
    /// Builds a dungeon drawing all randomness from `rng`.
    pub fn with_rng(config: DungeonConfig, mut rng: R) -> Result<Self, DungeonError> {
        config.validate()?;
        let DungeonConfig { rows, cols, .. } = config;

        let mut grid = Grid::from_generator(rows, cols, Node::new);
        let edges = topology::generate(
            rows,
            cols,
            config.wrapping,
            config.interconnectivity,
            config.candidate_order,
            &mut rng,
        );
        for edge in &edges {
            dig(&mut grid, edge);
        }

        let (start, end) = loop {
            let start = random_position(&mut rng, rows, cols);
            let end = random_position(&mut rng, rows, cols);
            if start.manhattan_distance(&end) >= MIN_START_END_DISTANCE {
                break (start, end);
            }
        };

        tracing::info!(
            rows,
            cols,
            wrapping = config.wrapping,
            interconnectivity = config.interconnectivity,
            passages = edges.len() * 2,
            %start,
            %end,
            "built dungeon"
        );

        Ok(Dungeon {
            config,
            grid,
            start,
            end,
            item_percentage: 0,
            otyugh_count: 0,
            player: None,
            rng,
        })
    }

    /// Scatters treasure and arrows across the dungeon.
    ///
    /// Places `percentage * rows * cols / 100` treasures, each on a random
    /// cave, and as many arrows, each cached either on that cave or on one of
    /// its passages. Calls accumulate. Returns the number of treasures placed.
    pub fn add_treasure(&mut self, percentage: u32) -> usize {
        let (rows, cols) = (self.rows(), self.cols());
        let target = percentage as usize * rows * cols / 100;
        for _ in 0..target {
            let position = random_position(&mut self.rng, rows, cols);
            let kind = Treasure::ALL[self.rng.random_range(0..Treasure::ALL.len())];
            let node = &mut self.grid[position];
            node.add_treasure(kind);

            let in_passage = self.rng.random_bool(0.5);
            if in_passage && !node.passages.is_empty() {
                let index = self.rng.random_range(0..node.passages.len());
                node.passages[index].add_arrow();
            } else {
                node.add_arrow();
            }
        }
        self.item_percentage = percentage;
        tracing::info!(percentage, placed = target, "added treasure and arrows");
        target
    }

    /// Places `count` otyughs: one guarding the end cave and the rest on
    /// random caves other than the start.
    pub fn add_otyughs(&mut self, count: usize) -> Result<(), DungeonError> {
        let total = self.grid.len();
        if count == 0 || count > total {
            return Err(ConfigError::OtyughCount {
                requested: count,
                max: total,
            }
            .into());
        }
        let (start, end) = (self.start, self.end);
        let free = self
            .grid
            .enumerate()
            .filter(|(p, node)| *p != start && *p != end && node.otyugh().is_none())
            .count();
        if count - 1 > free {
            return Err(ConfigError::NotEnoughCaves {
                requested: count - 1,
                free,
            }
            .into());
        }

        if self.grid[end].otyugh().is_none() {
            self.grid[end].add_otyugh(Otyugh::new())?;
        }
        let (rows, cols) = (self.rows(), self.cols());
        let mut placed = 0;
        while placed < count - 1 {
            let position = random_position(&mut self.rng, rows, cols);
            if position == start {
                continue;
            }
            if self.grid[position].add_otyugh(Otyugh::new()).is_ok() {
                placed += 1;
            }
        }
        self.otyugh_count = count;
        tracing::info!(count, "added otyughs");
        Ok(())
    }

    /// Puts a fresh player on the start cave, replacing any previous one.
    pub fn enter_player(&mut self) {
        self.enter_player_named(crate::player::DEFAULT_PLAYER_NAME);
    }

    pub fn enter_player_named(&mut self, name: &str) {
        tracing::info!(name, start = %self.start, "player entered the dungeon");
        self.player = Some(Player::new(name, self.start));
    }

    pub fn move_player(&mut self, direction: Direction) -> Result<Outcome, DungeonError> {
        let player = self.player.as_mut().ok_or(DungeonError::NotReady)?;
        player.advance(direction, &mut self.grid, self.end, &mut self.rng)
    }

    pub fn shoot_arrow(
        &mut self,
        distance: usize,
        direction: Direction,
    ) -> Result<Outcome, DungeonError> {
        let player = self.player.as_mut().ok_or(DungeonError::NotReady)?;
        player.shoot(distance, direction, &mut self.grid)
    }

    /// Picks up an item by name: `"Arrow"` or a treasure kind.
    pub fn pickup_item(&mut self, name: &str) -> Result<Outcome, DungeonError> {
        self.player.as_ref().ok_or(DungeonError::NotReady)?;
        let item: Item = name.parse()?;
        self.pickup(item)
    }

    pub fn pickup(&mut self, item: Item) -> Result<Outcome, DungeonError> {
        let player = self.player.as_mut().ok_or(DungeonError::NotReady)?;
        player.pickup(item, &mut self.grid)
    }

    /// Picks up every treasure in the player's cave.
    pub fn pickup_treasure(&mut self) -> Result<Outcome, DungeonError> {
        let player = self.player.as_mut().ok_or(DungeonError::NotReady)?;
        player.pickup_treasure(&mut self.grid)
    }

    /// Moves the player straight to `position`, skipping encounters and pickups.
    pub fn relocate_player(&mut self, position: Position) -> Result<(), DungeonError> {
        self.grid.require(position)?;
        let player = self.player.as_mut().ok_or(DungeonError::NotReady)?;
        player.relocate(position);
        Ok(())
    }

    pub fn place_treasure(
        &mut self,
        position: Position,
        treasure: Treasure,
    ) -> Result<(), DungeonError> {
        self.grid.require_mut(position)?.add_treasure(treasure);
        Ok(())
    }

    pub fn place_arrow(&mut self, position: Position) -> Result<(), DungeonError> {
        self.grid.require_mut(position)?.add_arrow();
        Ok(())
    }

    pub fn place_otyugh(&mut self, position: Position) -> Result<(), DungeonError> {
        self.grid.require_mut(position)?.add_otyugh(Otyugh::new())
    }
}

impl<R> Dungeon<R> {
    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    pub fn rows(&self) -> usize {
        self.config.rows
    }

    pub fn cols(&self) -> usize {
        self.config.cols
    }

    pub fn is_wrapping(&self) -> bool {
        self.config.wrapping
    }

    pub fn interconnectivity(&self) -> usize {
        self.config.interconnectivity
    }

    /// Percentage passed to the most recent [`Dungeon::add_treasure`] call.
    pub fn item_percentage(&self) -> u32 {
        self.item_percentage
    }

    /// Count passed to the most recent successful [`Dungeon::add_otyughs`] call.
    pub fn otyugh_count(&self) -> usize {
        self.otyugh_count
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn start_node(&self) -> &Node {
        &self.grid[self.start]
    }

    pub fn end_node(&self) -> &Node {
        &self.grid[self.end]
    }

    pub fn grid(&self) -> &Grid<Node> {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut Grid<Node> {
        &mut self.grid
    }

    pub fn node(&self, position: Position) -> Option<&Node> {
        self.grid.get(position)
    }

    /// Treasures lying anywhere in the dungeon.
    pub fn treasure_count(&self) -> usize {
        self.grid.iter().map(|node| node.treasures().len()).sum()
    }

    /// Arrows cached in every cave and every passage.
    pub fn arrow_count(&self) -> u32 {
        self.grid
            .iter()
            .map(|node| node.arrows() + node.passage_arrows())
            .sum()
    }

    pub fn player(&self) -> Result<&Player, DungeonError> {
        self.player.as_ref().ok_or(DungeonError::NotReady)
    }

    pub fn player_state(&self) -> Result<PlayerState, DungeonError> {
        Ok(self.player()?.state())
    }

    pub fn player_description(&self) -> Result<PlayerDescription, DungeonError> {
        Ok(self.player()?.description())
    }

    /// Describes the cave the player is standing in.
    pub fn location_description(&self) -> Result<NodeDescription, DungeonError> {
        self.describe_node(self.player()?.position())
    }

    pub fn smell_at(&self, position: Position) -> Result<Smell, DungeonError> {
        let node = self.grid.require(position)?;
        Ok(perception::smell(&self.grid, node))
    }

    pub fn describe_node(&self, position: Position) -> Result<NodeDescription, DungeonError> {
        let node = self.grid.require(position)?;
        Ok(NodeDescription {
            position,
            smell: perception::smell(&self.grid, node),
            arrows: node.arrows(),
            treasures: node.treasure_tally(),
            exits: node.exits(),
        })
    }

    /// Describes every cave in row-major order.
    pub fn describe_all(&self) -> Vec<NodeDescription> {
        self.grid
            .enumerate()
            .map(|(position, node)| NodeDescription {
                position,
                smell: perception::smell(&self.grid, node),
                arrows: node.arrows(),
                treasures: node.treasure_tally(),
                exits: node.exits(),
            })
            .collect()
    }

    /// Caves in the order a breadth-first search from start visits them,
    /// stopping once the end cave is reached.
    pub fn bfs_traversal(&self) -> Vec<Position> {
        solver::bfs_traversal(&self.grid, self.start, self.end)
    }
}

fn random_position<R: Rng + ?Sized>(rng: &mut R, rows: usize, cols: usize) -> Position {
    Position::new(rng.random_range(0..rows), rng.random_range(0..cols))
}

/// Compass direction of the step from `from` to `to`, accounting for wrap edges
/// that jump between opposite borders.
fn direction_between(from: Position, to: Position) -> Direction {
    if from.row == to.row {
        if to.col == from.col + 1 {
            Direction::East
        } else if from.col == to.col + 1 {
            Direction::West
        } else if to.col > from.col {
            // Wrapped from the first column to the last.
            Direction::West
        } else {
            Direction::East
        }
    } else if to.row == from.row + 1 {
        Direction::South
    } else if from.row == to.row + 1 {
        Direction::North
    } else if to.row > from.row {
        Direction::North
    } else {
        Direction::South
    }
}

/// Joins both ends of an edge with a pair of opposite passages.
fn dig(grid: &mut Grid<Node>, edge: &Edge) {
    let direction = direction_between(edge.from, edge.to);
    grid[edge.from].add_passage(Passage::new(direction, edge.from, edge.to));
    grid[edge.to].add_passage(Passage::new(direction.opposite(), edge.to, edge.from));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dungeon(wrapping: bool, rows: usize, cols: usize, inter: usize) -> Dungeon {
        Dungeon::seeded(DungeonConfig::new(wrapping, rows, cols, inter), 42).unwrap()
    }

    #[test]
    fn direction_between_handles_wrap_edges() {
        let p = Position::new;
        assert_eq!(direction_between(p(2, 2), p(2, 3)), Direction::East);
        assert_eq!(direction_between(p(2, 3), p(2, 2)), Direction::West);
        assert_eq!(direction_between(p(1, 1), p(2, 1)), Direction::South);
        assert_eq!(direction_between(p(2, 1), p(1, 1)), Direction::North);
        assert_eq!(direction_between(p(0, 3), p(5, 3)), Direction::North);
        assert_eq!(direction_between(p(5, 3), p(0, 3)), Direction::South);
        assert_eq!(direction_between(p(4, 0), p(4, 6)), Direction::West);
        assert_eq!(direction_between(p(4, 6), p(4, 0)), Direction::East);
    }

    #[test]
    fn config_validation_rejects_bad_shapes() {
        let check = |w, r, c, i| DungeonConfig::new(w, r, c, i).validate();
        assert_eq!(check(false, 4, 4, 0), Err(ConfigError::TooSmall { rows: 4, cols: 4 }));
        assert_eq!(check(false, 0, 9, 0), Err(ConfigError::EmptyGrid { rows: 0, cols: 9 }));
        assert!(matches!(
            check(false, 5, 1, 0),
            Err(ConfigError::CannotSeparate { .. })
        ));
        assert_eq!(
            check(true, 6, 6, 0),
            Err(ConfigError::WrappingWithoutInterconnectivity)
        );
        assert_eq!(
            check(false, 6, 6, 2),
            Err(ConfigError::NonWrappingWithInterconnectivity(2))
        );
        assert_eq!(
            check(false, usize::MAX, usize::MAX, 0),
            Err(ConfigError::TooLarge {
                rows: usize::MAX,
                cols: usize::MAX
            })
        );
        assert!(matches!(
            Dungeon::seeded(DungeonConfig::new(false, usize::MAX, 2, 0), 0),
            Err(DungeonError::Config(ConfigError::TooLarge { .. }))
        ));
        assert_eq!(check(false, 4, 6, 0), Ok(()));
        assert_eq!(check(true, 5, 5, 1), Ok(()));
    }

    #[test]
    fn every_passage_has_an_opposite_twin() {
        let dungeon = dungeon(true, 6, 7, 5);
        for (position, node) in dungeon.grid().enumerate() {
            let mut seen = Vec::new();
            for passage in node.passages() {
                assert_eq!(passage.source(), position);
                assert!(!seen.contains(&passage.direction()), "duplicate direction");
                seen.push(passage.direction());

                let twin = dungeon.grid()[passage.destination()]
                    .passage(passage.direction().opposite())
                    .expect("missing twin passage");
                assert_eq!(twin.destination(), position);
            }
        }
    }

    #[test]
    fn start_and_end_are_far_apart() {
        for seed in 0..50 {
            let d = Dungeon::seeded(DungeonConfig::new(false, 5, 5, 0), seed).unwrap();
            assert!(d.start().manhattan_distance(&d.end()) >= MIN_START_END_DISTANCE);
        }
    }

    #[test]
    fn add_treasure_places_target_items() {
        let mut d = dungeon(false, 6, 8, 0);
        assert_eq!(d.add_treasure(50), 24);
        assert_eq!(d.treasure_count(), 24);
        assert_eq!(d.arrow_count(), 24);
        assert_eq!(d.item_percentage(), 50);

        // additive
        assert_eq!(d.add_treasure(10), 4);
        assert_eq!(d.treasure_count(), 28);
        assert_eq!(d.arrow_count(), 28);
        assert_eq!(d.item_percentage(), 10);
    }

    #[test]
    fn zero_percentage_places_nothing() {
        let mut d = dungeon(false, 5, 5, 0);
        assert_eq!(d.add_treasure(0), 0);
        assert_eq!(d.treasure_count(), 0);
        assert_eq!(d.arrow_count(), 0);
    }

    #[test]
    fn add_otyughs_guards_end_not_start() {
        let mut d = dungeon(false, 6, 6, 0);
        d.add_otyughs(8).unwrap();
        assert!(d.end_node().has_live_otyugh());
        assert!(d.start_node().otyugh().is_none());
        let placed = d.grid().iter().filter(|n| n.otyugh().is_some()).count();
        assert_eq!(placed, 8);
        assert_eq!(d.otyugh_count(), 8);
    }

    #[test]
    fn repeated_add_otyughs_reuses_the_end_guard() {
        let mut d = dungeon(false, 6, 6, 0);
        d.add_otyughs(3).unwrap();
        d.add_otyughs(3).unwrap();
        let guarded: Vec<Position> = d
            .grid()
            .enumerate()
            .filter(|(_, n)| n.otyugh().is_some())
            .map(|(p, _)| p)
            .collect();
        assert_eq!(guarded.len(), 5);
        assert_eq!(guarded.iter().filter(|p| **p == d.end()).count(), 1);
        assert!(!guarded.contains(&d.start()));
        assert_eq!(d.otyugh_count(), 3);
    }

    #[test]
    fn add_otyughs_rejects_bad_counts() {
        let mut d = dungeon(false, 5, 5, 0);
        assert_eq!(
            d.add_otyughs(0),
            Err(DungeonError::Config(ConfigError::OtyughCount {
                requested: 0,
                max: 25
            }))
        );
        assert_eq!(
            d.add_otyughs(26),
            Err(DungeonError::Config(ConfigError::OtyughCount {
                requested: 26,
                max: 25
            }))
        );
        // Start must stay clear and end is already counted, so 25 cannot fit.
        assert!(matches!(
            d.add_otyughs(25),
            Err(DungeonError::Config(ConfigError::NotEnoughCaves { .. }))
        ));
        assert!(d.add_otyughs(24).is_ok());
        assert!(d.start_node().otyugh().is_none());
    }

    #[test]
    fn placing_a_second_otyugh_fails() {
        let mut d = dungeon(false, 5, 5, 0);
        let p = Position::new(2, 2);
        d.place_otyugh(p).unwrap();
        assert_eq!(d.place_otyugh(p), Err(DungeonError::Occupied { position: p }));
    }

    #[test]
    fn player_queries_fail_before_entering() {
        let mut d = dungeon(false, 5, 5, 0);
        assert_eq!(d.player().err(), Some(DungeonError::NotReady));
        assert_eq!(d.player_description().err(), Some(DungeonError::NotReady));
        assert_eq!(d.move_player(Direction::North), Err(DungeonError::NotReady));
        assert_eq!(d.pickup_item("arrow"), Err(DungeonError::NotReady));
        d.enter_player();
        assert_eq!(d.player().unwrap().position(), d.start());
    }

    #[test]
    fn description_lists_loot_and_exits() {
        let mut d = dungeon(false, 5, 5, 0);
        let p = Position::new(1, 1);
        d.place_arrow(p).unwrap();
        d.place_arrow(p).unwrap();
        d.place_treasure(p, Treasure::Ruby).unwrap();
        let description = d.describe_node(p).unwrap();
        assert_eq!(description.arrows, 2);
        assert_eq!(description.treasures.get(&Treasure::Ruby), Some(&1));
        assert_eq!(description.exits, d.grid()[p].exits());
        let text = description.to_string();
        assert!(text.contains("You find 2 Arrow, 1 Ruby here"));
        assert!(text.contains("Doors lead to the"));
        assert_eq!(d.describe_all().len(), 25);
    }

    #[test]
    fn placement_out_of_bounds_is_a_grid_error() {
        let mut d = dungeon(false, 5, 5, 0);
        assert!(matches!(
            d.place_arrow(Position::new(9, 9)),
            Err(DungeonError::Grid(_))
        ));
    }
}
