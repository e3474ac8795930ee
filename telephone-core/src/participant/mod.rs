//! Players of the game.
//!
//! The round engine only ever sees `Arc<dyn Participant>`. Whether a
//! participant is a person at the keyboard or a model behind an API is
//! decided once, when the roster is built.

mod automated;
mod interactive;

pub use automated::{AutomatedParticipant, DEFAULT_TIME_LIMIT};
pub use interactive::{HumanInput, InteractiveParticipant, MAX_EMPTY_ANSWERS};

use crate::backend::BackendError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// What a participant is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Write an original prompt. There is no input.
    CreateText,
    /// Guess the prompt behind someone else's drawing.
    GuessText,
    /// Draw someone else's text.
    Draw,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::CreateText => "create_text",
            Phase::GuessText => "guess_text",
            Phase::Draw => "draw",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of participant, for display and saved games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Human,
    Automated,
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantKind::Human => write!(f, "Human"),
            ParticipantKind::Automated => write!(f, "AI"),
        }
    }
}

/// Errors a participant may surface to the round engine.
#[derive(Debug, Error)]
pub enum ParticipantError {
    #[error("Input capture failed: {0}")]
    Capture(#[from] std::io::Error),

    #[error("No input after {0} attempts")]
    NoInput(usize),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Task failed: {0}")]
    Task(String),
}

/// A player in the game.
#[async_trait]
pub trait Participant: Send + Sync {
    /// Unique name within the roster.
    fn name(&self) -> &str;

    fn kind(&self) -> ParticipantKind;

    /// Longest the engine waits for one `produce` call. `None` waits forever.
    fn time_limit(&self) -> Option<Duration> {
        None
    }

    /// Produce content for a phase.
    ///
    /// `previous` is `None` for [`Phase::CreateText`], a drawing reference
    /// for [`Phase::GuessText`] and a text for [`Phase::Draw`].
    async fn produce(
        &self,
        previous: Option<&str>,
        phase: Phase,
        round: u32,
    ) -> Result<String, ParticipantError>;

    /// Feedback about what this participant produced. Must not fail.
    fn receive(&self, _output: &str, _phase: Phase) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::CreateText.to_string(), "create_text");
        assert_eq!(Phase::GuessText.to_string(), "guess_text");
        assert_eq!(Phase::Draw.to_string(), "draw");
        assert_eq!(serde_json::to_string(&Phase::GuessText).unwrap(), "\"guess_text\"");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ParticipantKind::Human.to_string(), "Human");
        assert_eq!(ParticipantKind::Automated.to_string(), "AI");
    }
}
