use super::{Participant, ParticipantError, ParticipantKind, Phase};
use crate::record::{is_sentinel, NO_GUESS, NO_PROMPT};
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use tracing::warn;

/// How many empty answers are tolerated before giving up on a text prompt.
pub const MAX_EMPTY_ANSWERS: usize = 3;

/// The human side of the game: whatever UI captures text and drawings.
#[async_trait]
pub trait HumanInput: Send + Sync {
    /// Ask for one line of text.
    async fn capture_text(&self, label: &str) -> io::Result<String>;

    /// Let the participant draw and return a reference to the result.
    async fn capture_drawing(&self, name: &str, round: u32, prompt: &str) -> io::Result<String>;

    /// Show a drawing that is about to be guessed.
    async fn render_drawing(&self, drawing: &str) -> io::Result<()>;

    /// Show an informational message.
    fn show(&self, message: &str);
}

/// A participant whose contributions come from a person.
pub struct InteractiveParticipant {
    name: String,
    input: Arc<dyn HumanInput>,
}

impl InteractiveParticipant {
    pub fn new(name: impl Into<String>, input: Arc<dyn HumanInput>) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }

    /// Ask until a non-empty answer arrives, up to [`MAX_EMPTY_ANSWERS`] times.
    async fn ask(&self, label: &str) -> Result<String, ParticipantError> {
        for _ in 0..MAX_EMPTY_ANSWERS {
            let answer = self.input.capture_text(label).await?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            self.input.show("Please enter some text.");
        }
        Err(ParticipantError::NoInput(MAX_EMPTY_ANSWERS))
    }
}

#[async_trait]
impl Participant for InteractiveParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ParticipantKind {
        ParticipantKind::Human
    }

    async fn produce(
        &self,
        previous: Option<&str>,
        phase: Phase,
        round: u32,
    ) -> Result<String, ParticipantError> {
        match phase {
            Phase::CreateText => {
                self.ask(&format!("{}, enter your text prompt: ", self.name))
                    .await
            }
            Phase::GuessText => {
                let Some(drawing) = previous.filter(|d| !is_sentinel(d)) else {
                    self.input
                        .show(&format!("{}, no drawing available to guess.", self.name));
                    return Ok(NO_GUESS.to_string());
                };
                self.input
                    .show(&format!("{}, guess the text based on the drawing:", self.name));
                if let Err(e) = self.input.render_drawing(drawing).await {
                    warn!(participant = %self.name, error = %e, drawing, "could not show drawing");
                    self.input.show(&format!("(drawing at {drawing})"));
                }
                self.ask("Your guess: ").await
            }
            Phase::Draw => {
                let prompt = previous.unwrap_or(NO_PROMPT);
                self.input.show(&format!(
                    "{}, please draw based on the prompt: {prompt}",
                    self.name
                ));
                Ok(self.input.capture_drawing(&self.name, round, prompt).await?)
            }
        }
    }

    fn receive(&self, output: &str, phase: Phase) {
        let what = match phase {
            Phase::CreateText | Phase::GuessText => "text",
            Phase::Draw => "drawing",
        };
        self.input
            .show(&format!("{} received {what}: {output}", self.name));
    }
}
