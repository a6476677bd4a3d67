use serde::{Deserialize, Serialize};

/// Number of arrow hits that kill an otyugh.
pub const KILL_THRESHOLD: u8 = 2;

/// Observable health of an otyugh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    Unhurt,
    Wounded,
    Dead,
}

/// What happened when an arrow struck an otyugh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    Wounded,
    Killed,
    /// The otyugh was already dead; nothing changed.
    AlreadyDead,
}

/// A stationary monster guarding a cave.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Otyugh {
    hits: u8,
}

impl Otyugh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u8 {
        self.hits
    }

    pub fn health(&self) -> Health {
        match self.hits {
            0 => Health::Unhurt,
            1 => Health::Wounded,
            _ => Health::Dead,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hits < KILL_THRESHOLD
    }

    #[inline]
    pub fn is_wounded(&self) -> bool {
        self.hits == 1
    }

    /// Registers one arrow hit. Hitting a dead otyugh is a no-op.
    pub fn hit(&mut self) -> HitResult {
        if !self.is_alive() {
            return HitResult::AlreadyDead;
        }
        self.hits += 1;
        if self.is_alive() {
            HitResult::Wounded
        } else {
            HitResult::Killed
        }
    }
}
