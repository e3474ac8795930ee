//! The game orchestrator.
//!
//! A [`Game`] owns the roster and the history while rounds are played.
//! Playing consumes it and yields a [`CompletedGame`], the only place
//! chains can be reconstructed from, so reconstruction always sees a
//! finished history.

use crate::chain::{self, Chain, ChainError};
use crate::config::GameConfig;
use crate::participant::ParticipantKind;
use crate::persist::{PersistError, SavedGame};
use crate::record::{History, HistoryError};
use crate::round::RoundEngine;
use crate::roster::Roster;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors from running a game.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Number of rounds must be positive")]
    NoRounds,

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// A game that has not been played yet.
pub struct Game {
    engine: RoundEngine,
    history: History,
}

impl Game {
    pub fn new(roster: Roster, config: GameConfig) -> Self {
        Self {
            engine: RoundEngine::new(roster, &config),
            history: History::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        self.engine.roster()
    }

    /// Play `rounds` rounds back to back.
    ///
    /// Round N+1 only starts once round N has been recorded, because its
    /// guesses are made from round N's drawings.
    pub async fn play(mut self, rounds: u32) -> Result<CompletedGame, GameError> {
        if rounds == 0 {
            return Err(GameError::NoRounds);
        }

        for _ in 0..rounds {
            let round = self.history.next_round();
            let record = self.engine.run(round, self.history.last()).await;
            self.history.push(record)?;
        }

        info!(rounds = self.history.len(), "game finished");
        Ok(CompletedGame {
            players: self.engine.roster().summary(),
            history: self.history,
        })
    }
}

/// A finished game: a frozen history plus who played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedGame {
    players: Vec<(String, ParticipantKind)>,
    history: History,
}

impl CompletedGame {
    /// Reassemble a finished game, e.g. from a save file.
    pub fn from_parts(players: Vec<(String, ParticipantKind)>, history: History) -> Self {
        Self { players, history }
    }

    pub fn players(&self) -> &[(String, ParticipantKind)] {
        &self.players
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// The chain started by `origin`'s first prompt.
    pub fn chain(&self, origin: &str) -> Result<Chain, ChainError> {
        chain::reconstruct(&self.history, origin)
    }

    /// Every chain, one per round-1 author.
    pub fn chains(&self) -> Result<Vec<Chain>, ChainError> {
        chain::reconstruct_all(&self.history)
    }

    /// Save the game as JSON.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        SavedGame::from_game(self).save_json(path).await
    }

    /// Load a game saved with [`CompletedGame::save`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        SavedGame::load_json(path).await?.into_game()
    }
}
