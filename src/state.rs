use crate::constants::INITIAL_LIVES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Score, lives and level for one round. Rebuilt from scratch on restart.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Seconds of damage immunity left; zero or negative means inactive.
    pub invincibility: f64,
    pub phase: Phase,
}

impl GameState {
    pub fn new() -> Self {
        GameState {
            score: 0,
            lives: INITIAL_LIVES,
            level: 0,
            invincibility: 0.0,
            phase: Phase::Playing,
        }
    }

    pub fn playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    pub fn invincible(&self) -> bool {
        self.invincibility > 0.0
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
