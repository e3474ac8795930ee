//! Human input from the terminal.

use crate::{console, sketch};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use telephone_core::HumanInput;
use tokio::task;

/// Reads answers from stdin and drawings from the sketchpad.
pub struct ConsoleInput {
    drawings_dir: PathBuf,
}

impl ConsoleInput {
    pub fn new(drawings_dir: impl Into<PathBuf>) -> Self {
        Self {
            drawings_dir: drawings_dir.into(),
        }
    }
}

fn join_error(e: task::JoinError) -> io::Error {
    io::Error::other(e)
}

#[async_trait]
impl HumanInput for ConsoleInput {
    async fn capture_text(&self, label: &str) -> io::Result<String> {
        let label = label.to_string();
        task::spawn_blocking(move || {
            console::read_answer(&mut io::stdin().lock(), &mut io::stdout(), &label)
        })
        .await
        .map_err(join_error)?
    }

    async fn capture_drawing(&self, name: &str, round: u32, prompt: &str) -> io::Result<String> {
        let (name, prompt) = (name.to_string(), prompt.to_string());
        let dir = self.drawings_dir.clone();
        task::spawn_blocking(move || sketch::draw(&name, round, &prompt, &dir))
            .await
            .map_err(join_error)?
    }

    async fn render_drawing(&self, drawing: &str) -> io::Result<()> {
        let path = Path::new(drawing);
        if path.extension().is_some_and(|e| e == "txt") {
            let content = tokio::fs::read_to_string(path).await?;
            println!("{content}");
        } else if path.exists() {
            println!("Drawing saved at {drawing}");
        } else {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("no drawing at {drawing}")));
        }
        Ok(())
    }

    fn show(&self, message: &str) {
        println!("{message}");
    }
}
