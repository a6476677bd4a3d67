use std::collections::{HashSet, VecDeque};

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Direction, Dungeon, Item, Position,
    dungeon::{ArrowCache, Node},
    error::{DungeonError, Outcome},
    map::Grid,
    perception::Smell,
    player::{Player, PlayerState},
    solver,
};

/// Represents actions a strategy can decide to take on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Wait,
    Move(Direction),
    Shoot { distance: usize, direction: Direction },
    PickupItem(Item),
    PickupTreasure,
}

/// Provides a read-only view of the dungeon relevant to the player.
#[derive(Debug)]
pub struct PlayerView<'a> {
    pub player: &'a Player,
    pub node: &'a Node,
    pub smell: Smell,
    pub grid: &'a Grid<Node>,
    pub end: Position,
}

/// Trait defining how a player is driven through the dungeon.
pub trait Strategy {
    /// Chooses the next action from the current view.
    /// `&mut self` lets a strategy keep plans or memory between turns.
    fn next_action(&mut self, view: &PlayerView) -> Action;

    /// Reports the outcome of the action just taken.
    fn observe(&mut self, _action: Action, _outcome: Outcome) {}
}

/// A strategy that wanders through random exits.
#[derive(Debug)]
pub struct RandomWalker {
    rng: StdRng,
}

impl RandomWalker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomWalker {
    fn next_action(&mut self, view: &PlayerView) -> Action {
        match view.node.exits().choose(&mut self.rng) {
            Some(direction) => Action::Move(*direction),
            None => Action::Wait,
        }
    }
}

/// A planning strategy that loots what it stands on and heads for the exit.
///
/// When the stench is strong it fires into the next cave on its route before
/// stepping in, until a shot either kills something there or misses, which
/// proves the cave is clear.
#[derive(Debug, Default)]
pub struct Autopilot {
    current_plan: VecDeque<Direction>,
    cleared: HashSet<Position>,
    target: Option<Position>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for Autopilot {
    fn next_action(&mut self, view: &PlayerView) -> Action {
        let here = view.player.position();

        // 1. Loot the current cave
        if view.node.arrows() > 0 {
            return Action::PickupItem(Item::Arrow);
        }
        if !view.node.treasures().is_empty() {
            return Action::PickupTreasure;
        }

        // 2. Plan a route to the exit if there is none
        if self.current_plan.is_empty() {
            match solver::shortest_path(view.grid, here, view.end) {
                Some(path) => self.current_plan.extend(path),
                None => return Action::Wait,
            }
        }
        let Some(&next) = self.current_plan.front() else {
            return Action::Wait;
        };
        let Some(passage) = view.node.passage(next) else {
            // Off the planned route; plan again next turn.
            self.current_plan.clear();
            return Action::Wait;
        };

        // 3. Clear the way when something reeks close by
        let ahead = passage.destination();
        if view.smell == Smell::Strong && view.player.arrows() > 0 && !self.cleared.contains(&ahead)
        {
            self.target = Some(ahead);
            return Action::Shoot {
                distance: 1,
                direction: next,
            };
        }

        // 4. Step forward
        self.current_plan.pop_front();
        Action::Move(next)
    }

    fn observe(&mut self, action: Action, outcome: Outcome) {
        let cleared = matches!(outcome, Outcome::ShotMissed | Outcome::ShotKilled);
        if let (Action::Shoot { .. }, Some(target), true) = (action, self.target, cleared) {
            self.cleared.insert(target);
        }
    }
}

/// One turn of a playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub action: Action,
    pub outcome: Outcome,
}

/// Summary of a strategy-driven playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaythroughReport {
    pub state: PlayerState,
    pub turns: Vec<TurnRecord>,
}

impl PlaythroughReport {
    /// Number of turns with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.turns.iter().filter(|t| t.outcome == outcome).count()
    }
}

impl<R: Rng> Dungeon<R> {
    /// Performs a single action for the player.
    pub fn apply(&mut self, action: Action) -> Result<Outcome, DungeonError> {
        match action {
            Action::Wait => match self.player_state()? {
                PlayerState::Exploring => Ok(Outcome::Ok),
                state => Err(DungeonError::GameOver { state }),
            },
            Action::Move(direction) => self.move_player(direction),
            Action::Shoot {
                distance,
                direction,
            } => self.shoot_arrow(distance, direction),
            Action::PickupItem(item) => self.pickup(item),
            Action::PickupTreasure => self.pickup_treasure(),
        }
    }

    /// Lets `strategy` play until the player dies, escapes, or `max_turns` pass.
    ///
    /// Failed actions with a stable outcome code (such as walking into a wall)
    /// are recorded and play continues. Any other error aborts the playthrough.
    pub fn play<S: Strategy + ?Sized>(
        &mut self,
        strategy: &mut S,
        max_turns: usize,
    ) -> Result<PlaythroughReport, DungeonError> {
        let mut turns = Vec::new();
        for _ in 0..max_turns {
            if self.player_state()? != PlayerState::Exploring {
                break;
            }
            let action = {
                let player = self.player()?;
                let position = player.position();
                let view = PlayerView {
                    player,
                    node: &self.grid()[position],
                    smell: self.smell_at(position)?,
                    grid: self.grid(),
                    end: self.end(),
                };
                strategy.next_action(&view)
            };

            let outcome = match self.apply(action) {
                Ok(outcome) => outcome,
                Err(err) => match err.outcome() {
                    Some(outcome) => outcome,
                    None => return Err(err),
                },
            };
            tracing::debug!(?action, ?outcome, "turn played");
            strategy.observe(action, outcome);
            turns.push(TurnRecord { action, outcome });
        }

        let state = self.player_state()?;
        tracing::info!(?state, turns = turns.len(), "playthrough finished");
        Ok(PlaythroughReport { state, turns })
    }
}
