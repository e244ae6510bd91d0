// Persisted top-score list.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GameConfig;

pub struct LedgerPlugin;

impl Plugin for LedgerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Ranking>()
            .add_systems(Startup, open_ledger);
    }
}

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "innate_scores";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    #[error("score storage unavailable: {0}")]
    Unavailable(String),
    #[error("score file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored scores are not a JSON array: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Raw key-value storage for the serialized ledger.
pub trait LedgerStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, LedgerError>;
    fn write(&mut self, contents: &str) -> Result<(), LedgerError>;
}

#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore(pub Option<String>);

#[cfg(test)]
impl LedgerStore for MemoryStore {
    fn read(&self) -> Result<Option<String>, LedgerError> {
        Ok(self.0.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), LedgerError> {
        self.0 = Some(contents.to_string());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LedgerStore for FileStore {
    fn read(&self) -> Result<Option<String>, LedgerError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Browser local storage under a single key.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, LedgerError> {
        web_sys::window()
            .ok_or_else(|| LedgerError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|err| LedgerError::Unavailable(format!("{err:?}")))?
            .ok_or_else(|| LedgerError::Unavailable("local storage disabled".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl LedgerStore for LocalStorageStore {
    fn read(&self) -> Result<Option<String>, LedgerError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|err| LedgerError::Unavailable(format!("{err:?}")))
    }

    fn write(&mut self, contents: &str) -> Result<(), LedgerError> {
        Self::storage()?
            .set_item(&self.key, contents)
            .map_err(|err| LedgerError::Unavailable(format!("{err:?}")))
    }
}

/// Parses stored scores. Entries that don't have a string `name` and a
/// non-negative integer `score` are dropped.
pub fn parse_entries(contents: &str) -> Result<Vec<ScoreEntry>, LedgerError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(contents)?;
    Ok(values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

/// Adds `entry`, sorts by score descending and keeps the top `capacity`.
/// The sort is stable: on equal scores, earlier entries stay ahead.
pub fn insert_entry(entries: &mut Vec<ScoreEntry>, entry: ScoreEntry, capacity: usize) {
    entries.push(entry);
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(capacity);
}

/// `"1. Ana – 120 pts"`, one per entry.
pub fn ranked_lines(entries: &[ScoreEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("{}. {} – {} pts", i + 1, entry.name, entry.score))
        .collect()
}

#[derive(Resource)]
pub struct Ledger {
    store: Box<dyn LedgerStore>,
    capacity: usize,
}

impl Ledger {
    pub fn new(store: impl LedgerStore + 'static, capacity: usize) -> Self {
        Self {
            store: Box::new(store),
            capacity,
        }
    }

    /// Stored entries, or an empty list if nothing usable is stored.
    pub fn load(&self) -> Vec<ScoreEntry> {
        let contents = match self.store.read() {
            Ok(Some(contents)) => contents,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("could not read scores: {err}");
                return Vec::new();
            }
        };
        match parse_entries(&contents) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("discarding stored scores: {err}");
                Vec::new()
            }
        }
    }

    /// Records a finished game and returns the new top list. The list is
    /// returned even if it could not be saved.
    pub fn finalize(&mut self, entry: ScoreEntry) -> Vec<ScoreEntry> {
        let mut entries = self.load();
        insert_entry(&mut entries, entry, self.capacity);
        match serde_json::to_string(&entries) {
            Ok(contents) => {
                if let Err(err) = self.store.write(&contents) {
                    error!("could not save scores: {err}");
                }
            }
            Err(err) => error!("could not serialize scores: {err}"),
        }
        entries
    }
}

/// The top list shown on the scores screen.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct Ranking(pub Vec<ScoreEntry>);

fn open_ledger(mut commands: Commands, config: Res<GameConfig>) {
    #[cfg(not(target_arch = "wasm32"))]
    let store = FileStore::new(&config.ledger_path);
    #[cfg(target_arch = "wasm32")]
    let store = LocalStorageStore::new(STORAGE_KEY);

    commands.insert_resource(Ledger::new(store, config.ledger_capacity));
}
