//! Generation backends for automated participants.
//!
//! Automated players never talk to a model directly. They hold a
//! [`TextGenerator`] and a [`DrawingGenerator`], which may be backed by a
//! remote API ([`ClaudeText`], [`PollinationsDrawing`]) or work entirely
//! offline ([`CannedText`], [`SketchDrawing`]).

mod claude;
mod offline;
mod pollinations;

pub use claude::{ClaudeText, DEFAULT_MODEL};
pub use offline::{CannedText, SketchDrawing};
pub use pollinations::PollinationsDrawing;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default directory for drawings written during a game.
pub const DEFAULT_DRAWINGS_DIR: &str = "assets/drawings";

/// Prompts an automated player falls back to when it cannot generate one.
pub const PROMPT_POOL: &[&str] = &[
    "A sunny day at the beach.",
    "A cat chasing a mouse.",
    "An astronaut floating in space.",
    "A dragon flying over a castle.",
    "A robot making coffee.",
    "A magical forest with unicorns.",
    "A pirate ship battling a sea monster.",
];

/// Guesses an automated player falls back to when it cannot describe a drawing.
pub const GUESS_POOL: &[&str] = &[
    "A cat chasing a ball.",
    "A spaceship landing on Mars.",
    "A wizard casting a spell.",
    "A car racing on a track.",
    "A tree with colorful leaves.",
    "A dog playing fetch.",
    "A house by the lake.",
];

/// Errors from generation backends.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Backend returned no content")]
    Empty,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces text: fresh prompts, and guesses describing a drawing.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a short text from a free-form context.
    async fn generate_text(&self, context: &str) -> Result<String, BackendError>;

    /// Guess what a drawing shows, given its reference.
    async fn describe_drawing(&self, drawing: &str) -> Result<String, BackendError>;
}

/// Produces a drawing for a prompt and returns a reference to it.
#[async_trait]
pub trait DrawingGenerator: Send + Sync {
    async fn generate_drawing(
        &self,
        prompt: &str,
        owner: &str,
        round: u32,
    ) -> Result<String, BackendError>;
}

/// Pick a random entry from a fallback pool.
pub fn pick(pool: &[&str]) -> String {
    pool.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PROMPT_POOL[0])
        .to_string()
}

/// File-name form of a participant name.
///
/// Anything other than letters, digits and `-` becomes `_`, so the stem can
/// never escape a directory. Distinct names may share a stem; a
/// [`Roster`](crate::Roster) never holds two such names.
pub fn file_stem(owner: &str) -> String {
    owner
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Where a participant's drawing for a round is stored.
pub fn drawing_path(
    dir: impl AsRef<Path>,
    owner: &str,
    round: u32,
    extension: &str,
) -> PathBuf {
    let stem = file_stem(owner);
    dir.as_ref().join(format!("{stem}_drawing_{round}.{extension}"))
}

/// Trim model output down to a single clean line.
pub(crate) fn clean_line(raw: &str) -> Option<String> {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())?
        .trim_matches('"')
        .trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_path_sanitizes_owner() {
        let path = drawing_path("assets/drawings", "AI Bot 1", 2, "png");
        assert_eq!(path, PathBuf::from("assets/drawings/AI_Bot_1_drawing_2.png"));

        let path = drawing_path("out", "../evil", 1, "txt");
        assert_eq!(path, PathBuf::from("out/___evil_drawing_1.txt"));
    }

    #[test]
    fn test_file_stem_can_collide() {
        assert_eq!(file_stem("AI Bot 1"), file_stem("AI_Bot_1"));
        assert_ne!(file_stem("AI Bot 1"), file_stem("AI Bot 2"));
    }

    #[test]
    fn test_pick_from_pool() {
        let choice = pick(GUESS_POOL);
        assert!(GUESS_POOL.contains(&choice.as_str()));
    }

    #[test]
    fn test_clean_line() {
        assert_eq!(
            clean_line("\n  \"A fox in a hat\"  \nsecond line"),
            Some("A fox in a hat".to_string())
        );
        assert_eq!(clean_line("   \n  "), None);
        assert_eq!(clean_line("\"\""), None);
    }
}
