// Game sections and the per-run session.
use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum Sections {
    #[default]
    Login,
    Playing,
    Scores,
}

/// State of the current run. Quiz, puzzle and combat all add to `score`.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct Session {
    pub player_name: String,
    pub score: u32,
    pub phase_index: usize,
}

impl Session {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            ..default()
        }
    }

    /// Back to phase 0 with no points, keeping the player's name.
    pub fn restart(&mut self) {
        self.score = 0;
        self.phase_index = 0;
    }

    pub fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

/// Player input that was refused. The message is shown to the player as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("Please enter your name!")]
    EmptyName,
    #[error("Select an option!")]
    NoOptionSelected,
    #[error("The values are not right. Adjust and try again!")]
    OutOfTolerance,
}
