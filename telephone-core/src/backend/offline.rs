//! Backends that need no network access.

use super::{
    drawing_path, pick, BackendError, DrawingGenerator, TextGenerator, GUESS_POOL, PROMPT_POOL,
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Picks prompts and guesses from the built-in pools.
#[derive(Debug, Clone, Default)]
pub struct CannedText;

#[async_trait]
impl TextGenerator for CannedText {
    async fn generate_text(&self, _context: &str) -> Result<String, BackendError> {
        Ok(pick(PROMPT_POOL))
    }

    async fn describe_drawing(&self, _drawing: &str) -> Result<String, BackendError> {
        Ok(pick(GUESS_POOL))
    }
}

/// Writes a framed text sketch of the prompt to the drawings directory.
#[derive(Debug, Clone)]
pub struct SketchDrawing {
    dir: PathBuf,
}

impl SketchDrawing {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn render(prompt: &str) -> String {
        let width = prompt.chars().count() + 4;
        let border = format!("+{}+", "-".repeat(width));
        let blank = format!("|{}|", " ".repeat(width));
        [
            border.clone(),
            blank.clone(),
            format!("|  {prompt}  |"),
            blank,
            border,
        ]
        .join("\n")
    }
}

#[async_trait]
impl DrawingGenerator for SketchDrawing {
    async fn generate_drawing(
        &self,
        prompt: &str,
        owner: &str,
        round: u32,
    ) -> Result<String, BackendError> {
        fs::create_dir_all(&self.dir).await?;
        let path = drawing_path(&self.dir, owner, round, "txt");
        fs::write(&path, Self::render(prompt)).await?;
        Ok(path.to_string_lossy().into_owned())
    }
}
