use std::{collections::BTreeMap, fmt};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Direction, Item, Position, Treasure,
    dungeon::{ArrowCache, Node, tally},
    error::{DungeonError, Outcome},
    map::Grid,
    monster::{HitResult, Otyugh},
};

pub const DEFAULT_PLAYER_NAME: &str = "Explorer";

/// Arrows carried into the dungeon.
pub const STARTING_ARROWS: u32 = 3;

/// Where a playthrough stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerState {
    Exploring,
    Dead,
    Escaped,
}

/// The adventurer moving through the dungeon.
///
/// The player only records the position of its cave; the dungeon's grid owns
/// the caves themselves and is passed in for every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    position: Position,
    treasures: Vec<Treasure>,
    arrows: u32,
    state: PlayerState,
}

impl Player {
    pub(crate) fn new(name: &str, position: Position) -> Self {
        Player {
            name: name.to_string(),
            position,
            treasures: Vec::new(),
            arrows: STARTING_ARROWS,
            state: PlayerState::Exploring,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn treasures(&self) -> &[Treasure] {
        &self.treasures
    }

    pub fn arrows(&self) -> u32 {
        self.arrows
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn description(&self) -> PlayerDescription {
        PlayerDescription {
            name: self.name.clone(),
            position: self.position,
            arrows: self.arrows,
            treasures: tally(&self.treasures),
            state: self.state,
        }
    }

    fn ensure_exploring(&self) -> Result<(), DungeonError> {
        match self.state {
            PlayerState::Exploring => Ok(()),
            state => Err(DungeonError::GameOver { state }),
        }
    }

    /// Walks through the passage leading `direction`.
    ///
    /// Arrows lying in the passage are collected on the way. Entering a cave
    /// with an unhurt otyugh is fatal; a wounded one kills with probability
    /// one half, drawn from `rng`. Reaching `end` alive means escaping.
    pub(crate) fn advance<R: Rng + ?Sized>(
        &mut self,
        direction: Direction,
        grid: &mut Grid<Node>,
        end: Position,
        rng: &mut R,
    ) -> Result<Outcome, DungeonError> {
        self.ensure_exploring()?;
        let position = self.position;
        let passage = grid
            .require_mut(position)?
            .passage_mut(direction)
            .ok_or(DungeonError::InvalidDirection {
                position,
                direction,
            })?;
        let collected = passage.take_arrows();
        let destination = passage.destination();

        self.arrows += collected;
        self.position = destination;
        tracing::debug!(from = %position, to = %destination, %direction, collected, "player moved");

        if let Some(otyugh) = grid.require(destination)?.otyugh().filter(|o| o.is_alive()) {
            let fatal = !otyugh.is_wounded() || rng.random_bool(0.5);
            if fatal {
                self.state = PlayerState::Dead;
                tracing::info!(
                    at = %destination,
                    wounded = otyugh.is_wounded(),
                    "player eaten by an otyugh"
                );
                return Err(DungeonError::Eaten {
                    position: destination,
                });
            }
            tracing::info!(at = %destination, "player slipped past a wounded otyugh");
        }

        if destination == end {
            self.state = PlayerState::Escaped;
            tracing::info!(at = %destination, "player escaped the dungeon");
        }

        Ok(if collected > 0 {
            Outcome::PickedUpArrows(collected)
        } else {
            Outcome::Ok
        })
    }

    /// Fires one arrow `distance` caves straight along `direction`.
    ///
    /// The arrow never turns: if any cave on the way has no passage in
    /// `direction`, the arrow is lost and the shot misses.
    pub(crate) fn shoot(
        &mut self,
        distance: usize,
        direction: Direction,
        grid: &mut Grid<Node>,
    ) -> Result<Outcome, DungeonError> {
        self.ensure_exploring()?;
        if distance == 0 {
            return Err(DungeonError::InvalidDistance);
        }
        if self.arrows == 0 {
            return Err(DungeonError::NoArrows);
        }
        self.arrows -= 1;

        let mut target = self.position;
        for _ in 0..distance {
            match grid.require(target)?.passage(direction) {
                Some(passage) => target = passage.destination(),
                None => {
                    tracing::debug!(
                        from = %self.position,
                        %direction,
                        distance,
                        "arrow lost in the darkness"
                    );
                    return Ok(Outcome::ShotMissed);
                }
            }
        }

        let node = grid.require_mut(target)?;
        let outcome = match node.otyugh_mut().map(Otyugh::hit) {
            None => Outcome::ShotMissed,
            Some(HitResult::Wounded) => Outcome::ShotHit,
            Some(HitResult::Killed) => {
                node.remove_otyugh();
                tracing::info!(at = %target, "otyugh killed");
                Outcome::ShotKilled
            }
            Some(HitResult::AlreadyDead) => {
                node.remove_otyugh();
                Outcome::ShotMissed
            }
        };
        tracing::debug!(from = %self.position, %direction, distance, ?outcome, "arrow fired");
        Ok(outcome)
    }

    /// Picks up all arrows, or a single treasure of one kind, from the current cave.
    pub(crate) fn pickup(
        &mut self,
        item: Item,
        grid: &mut Grid<Node>,
    ) -> Result<Outcome, DungeonError> {
        self.ensure_exploring()?;
        let position = self.position;
        let node = grid.require_mut(position)?;
        let not_available = DungeonError::NotAvailable { item, position };
        match item {
            Item::Arrow => {
                let arrows = node.take_arrows();
                if arrows == 0 {
                    return Err(not_available);
                }
                self.arrows += arrows;
                tracing::debug!(at = %position, arrows, "picked up arrows");
                Ok(Outcome::PickedUpArrows(arrows))
            }
            Item::Treasure(kind) => {
                let treasure = node.take_treasure(kind).ok_or(not_available)?;
                self.treasures.push(treasure);
                tracing::debug!(at = %position, %treasure, "picked up treasure");
                Ok(Outcome::Ok)
            }
        }
    }

    /// Takes every treasure in the current cave.
    pub(crate) fn pickup_treasure(
        &mut self,
        grid: &mut Grid<Node>,
    ) -> Result<Outcome, DungeonError> {
        self.ensure_exploring()?;
        let taken = grid.require_mut(self.position)?.take_all_treasure();
        tracing::debug!(at = %self.position, count = taken.len(), "picked up all treasure");
        self.treasures.extend(taken);
        Ok(Outcome::Ok)
    }

    pub(crate) fn relocate(&mut self, position: Position) {
        self.position = position;
    }
}

/// Snapshot of the player for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDescription {
    pub name: String,
    pub position: Position,
    pub arrows: u32,
    pub treasures: BTreeMap<Treasure, usize>,
    pub state: PlayerState,
}

impl fmt::Display for PlayerDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Player: {}", self.name)?;
        writeln!(f, "Cave: {}", self.position)?;
        if self.treasures.is_empty() {
            writeln!(f, "Treasures: none")?;
        } else {
            let listed: Vec<String> = self
                .treasures
                .iter()
                .map(|(treasure, count)| format!("{count} {treasure}"))
                .collect();
            writeln!(f, "Treasures: {}", listed.join(", "))?;
        }
        write!(f, "Arrows: {}", self.arrows)
    }
}
