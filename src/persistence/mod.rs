//! Saved levels and high score storage
//!
//! Features:
//! - Versioned JSON envelope
//! - Atomic writes (tmp file, then rename)
//! - Load failures degrade to empty data at the call sites that ask for it

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::{HighScoreEntry, HighScores};
use crate::level::SavedLevel;
use crate::sim::GameState;

/// Current on-disk format version
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported save format version: {0}")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    data: T,
}

/// Storage backend for levels and the leaderboard
pub trait Persistence {
    fn load_levels(&self) -> Result<Vec<SavedLevel>, PersistenceError>;
    fn store_levels(&mut self, levels: &[SavedLevel]) -> Result<(), PersistenceError>;
    fn load_high_scores(&self) -> Result<HighScores, PersistenceError>;
    fn store_high_scores(&mut self, scores: &HighScores) -> Result<(), PersistenceError>;

    /// Add a level, replacing any existing level with the same name
    fn save_level(&mut self, level: SavedLevel) -> Result<(), PersistenceError> {
        let mut levels = self.load_levels()?;
        match levels.iter_mut().find(|l| l.name == level.name) {
            Some(existing) => *existing = level,
            None => levels.push(level),
        }
        self.store_levels(&levels)
    }

    /// Returns false when no level had that name
    fn delete_level(&mut self, name: &str) -> Result<bool, PersistenceError> {
        let mut levels = self.load_levels()?;
        let before = levels.len();
        levels.retain(|l| l.name != name);
        if levels.len() == before {
            return Ok(false);
        }
        self.store_levels(&levels)?;
        Ok(true)
    }

    /// Insert into the leaderboard; returns the rank if it qualified
    fn record_high_score(&mut self, entry: HighScoreEntry) -> Result<Option<usize>, PersistenceError> {
        let mut scores = self.load_high_scores()?;
        let rank = scores.add_entry(entry);
        if rank.is_some() {
            self.store_high_scores(&scores)?;
        }
        Ok(rank)
    }
}

/// Playable levels for a `width` x `height` grid.
///
/// Unreadable storage yields an empty list; levels that fail validation are
/// skipped with a warning.
pub fn levels_or_default(store: &impl Persistence, width: i32, height: i32) -> Vec<SavedLevel> {
    let levels = store.load_levels().unwrap_or_else(|e| {
        log::warn!("Could not load saved levels, starting empty: {}", e);
        Vec::new()
    });
    levels
        .into_iter()
        .filter(|level| match level.data.validate(width, height) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Skipping saved level '{}': {}", level.name, e);
                false
            }
        })
        .collect()
}

/// Leaderboard for display; unreadable storage yields an empty board
pub fn high_scores_or_default(store: &impl Persistence) -> HighScores {
    store.load_high_scores().unwrap_or_else(|e| {
        log::warn!("Could not load high scores, starting fresh: {}", e);
        HighScores::new()
    })
}

/// Report a finished match to the leaderboard (best effort)
pub fn record_match(store: &mut impl Persistence, state: &GameState, timestamp: u64) -> Option<usize> {
    let entry = HighScoreEntry::from_state(state, timestamp);
    match store.record_high_score(entry) {
        Ok(Some(rank)) => {
            log::info!("New high score #{}", rank);
            Some(rank)
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("Failed to record high score: {}", e);
            None
        }
    }
}

/// JSON files in a directory (`levels.json`, `highscores.json`)
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    const LEVELS_FILE: &'static str = "levels.json";
    const SCORES_FILE: &'static str = "highscores.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Missing files read as the default value
    fn read<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, PersistenceError> {
        let path = self.dir.join(name);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };
        let envelope: Envelope<T> = serde_json::from_str(&json)?;
        if envelope.version > FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(envelope.version));
        }
        Ok(envelope.data)
    }

    fn write<T: Serialize>(&self, name: &str, data: &T) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(&Envelope {
            version: FORMAT_VERSION,
            data,
        })?;
        let path = self.dir.join(name);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl Persistence for JsonFileStore {
    fn load_levels(&self) -> Result<Vec<SavedLevel>, PersistenceError> {
        self.read(Self::LEVELS_FILE)
    }

    fn store_levels(&mut self, levels: &[SavedLevel]) -> Result<(), PersistenceError> {
        self.write(Self::LEVELS_FILE, &levels)
    }

    fn load_high_scores(&self) -> Result<HighScores, PersistenceError> {
        self.read(Self::SCORES_FILE)
    }

    fn store_high_scores(&mut self, scores: &HighScores) -> Result<(), PersistenceError> {
        self.write(Self::SCORES_FILE, scores)
    }
}

/// In-memory store for tests and sessions without a writable disk
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub levels: Vec<SavedLevel>,
    pub scores: HighScores,
}

impl Persistence for MemoryStore {
    fn load_levels(&self) -> Result<Vec<SavedLevel>, PersistenceError> {
        Ok(self.levels.clone())
    }

    fn store_levels(&mut self, levels: &[SavedLevel]) -> Result<(), PersistenceError> {
        self.levels = levels.to_vec();
        Ok(())
    }

    fn load_high_scores(&self) -> Result<HighScores, PersistenceError> {
        Ok(self.scores.clone())
    }

    fn store_high_scores(&mut self, scores: &HighScores) -> Result<(), PersistenceError> {
        self.scores = scores.clone();
        Ok(())
    }
}
