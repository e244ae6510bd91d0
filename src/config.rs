// Tunable game rules: bonuses, tolerances and enemy behaviour.
use bevy::prelude::*;
use serde::Deserialize;

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(GameConfig::load());
    }
}

#[cfg(not(target_arch = "wasm32"))]
const CONFIG_PATH: &str = "innate.json";
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_ENV_VAR: &str = "INNATE_CONFIG";

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Points for each correctly answered quiz question.
    pub quiz_bonus: u32,
    /// Points for solving a phase puzzle.
    pub puzzle_bonus: u32,
    /// Points for each virus shot down.
    pub kill_bonus: u32,
    /// Max absolute difference between a slider and its target.
    pub puzzle_tolerance: u32,
    pub slider_start: u32,
    pub slider_max: u32,
    /// Enemies in phase 0; each later phase adds one.
    pub enemy_base: usize,
    pub enemy_speed: f32,
    /// Enemies closer than this to the player vanish without scoring.
    pub despawn_distance: f32,
    pub enemy_radius: f32,
    pub spawn_radius_min: f32,
    pub spawn_radius_max: f32,
    pub ledger_capacity: usize,
    pub ledger_path: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            quiz_bonus: 20,
            puzzle_bonus: 30,
            kill_bonus: 10,
            puzzle_tolerance: 10,
            slider_start: 50,
            slider_max: 100,
            enemy_base: 2,
            enemy_speed: 5.0,
            despawn_distance: 2.0,
            enemy_radius: 0.8,
            spawn_radius_min: 50.0,
            spawn_radius_max: 100.0,
            ledger_capacity: 10,
            ledger_path: "innate_scores.json".to_string(),
        }
    }
}

impl GameConfig {
    pub fn enemy_count(&self, phase_index: usize) -> usize {
        self.enemy_base + phase_index
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn load() -> Self {
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| CONFIG_PATH.to_string());
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no config at {path}, using defaults");
                return Self::default();
            }
            Err(err) => {
                warn!("could not read config {path}: {err}; using defaults");
                return Self::default();
            }
        };
        match Self::from_json(&text) {
            Ok(config) => {
                info!("loaded config from {path}");
                config
            }
            Err(err) => {
                warn!("invalid config {path}: {err}; using defaults");
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn load() -> Self {
        Self::default()
    }
}
