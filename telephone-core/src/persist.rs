//! Saving finished games.
//!
//! A save holds the roster summary and the full round history as pretty
//! JSON. Loading rebuilds the [`History`] through the same ordering checks
//! used while playing, so a hand-edited file with gaps is rejected.

use crate::game::CompletedGame;
use crate::participant::ParticipantKind;
use crate::record::{History, HistoryError, RoundRecord};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Invalid history: {0}")]
    History(#[from] HistoryError),
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPlayer {
    pub name: String,
    pub kind: ParticipantKind,
}

/// A finished game on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// Seconds since the Unix epoch when the save was made.
    pub saved_at: String,

    pub players: Vec<SavedPlayer>,

    /// Round records, oldest first.
    pub history: Vec<RoundRecord>,
}

impl SavedGame {
    pub fn from_game(game: &CompletedGame) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: timestamp(),
            players: game
                .players()
                .iter()
                .map(|(name, kind)| SavedPlayer {
                    name: name.clone(),
                    kind: *kind,
                })
                .collect(),
            history: game.history().rounds().to_vec(),
        }
    }

    /// Save to a JSON file, creating parent directories as needed.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }

    /// Rebuild the history, checking round order.
    pub fn into_history(self) -> Result<History, PersistError> {
        Ok(History::from_records(self.history)?)
    }

    pub fn into_game(self) -> Result<CompletedGame, PersistError> {
        let players = self
            .players
            .iter()
            .map(|p| (p.name.clone(), p.kind))
            .collect();
        let history = self.into_history()?;
        Ok(CompletedGame::from_parts(players, history))
    }
}

/// Default save file name inside `dir`, stamped with the current time.
pub fn save_path(dir: impl AsRef<Path>) -> PathBuf {
    dir.as_ref().join(format!("telephone_{}.json", timestamp()))
}

fn timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}
