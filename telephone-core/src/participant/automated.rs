use super::{Participant, ParticipantError, ParticipantKind, Phase};
use crate::backend::{pick, DrawingGenerator, TextGenerator, GUESS_POOL, PROMPT_POOL};
use crate::record::{is_sentinel, NO_DRAWING, NO_GUESS};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Default limit on a single automated `produce` call.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(90);

const CREATE_CONTEXT: &str =
    "Invent a prompt for the first round of a drawing telephone game.";

/// A participant driven by generation backends.
///
/// Backend failures never leave this type: a failed prompt or guess is
/// replaced by a pick from the fallback pools, a failed drawing by
/// [`NO_DRAWING`].
pub struct AutomatedParticipant {
    name: String,
    text: Arc<dyn TextGenerator>,
    drawing: Arc<dyn DrawingGenerator>,
    time_limit: Option<Duration>,
}

impl AutomatedParticipant {
    pub fn new(
        name: impl Into<String>,
        text: Arc<dyn TextGenerator>,
        drawing: Arc<dyn DrawingGenerator>,
    ) -> Self {
        Self {
            name: name.into(),
            text,
            drawing,
            time_limit: Some(DEFAULT_TIME_LIMIT),
        }
    }

    pub fn with_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.time_limit = limit;
        self
    }

    async fn create(&self) -> String {
        match self.text.generate_text(CREATE_CONTEXT).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    participant = %self.name,
                    error = %e,
                    "text generation failed, using fallback prompt"
                );
                pick(PROMPT_POOL)
            }
        }
    }

    async fn guess(&self, drawing: Option<&str>) -> String {
        let Some(drawing) = drawing.filter(|d| !is_sentinel(d)) else {
            info!(participant = %self.name, "no drawing to guess");
            return NO_GUESS.to_string();
        };
        match self.text.describe_drawing(drawing).await {
            Ok(guess) => guess,
            Err(e) => {
                warn!(participant = %self.name, error = %e, "guess failed, using fallback guess");
                pick(GUESS_POOL)
            }
        }
    }

    async fn draw(&self, prompt: Option<&str>, round: u32) -> String {
        let Some(prompt) = prompt.filter(|p| !is_sentinel(p)) else {
            info!(participant = %self.name, "no valid prompt to draw");
            return NO_DRAWING.to_string();
        };
        match self.drawing.generate_drawing(prompt, &self.name, round).await {
            Ok(reference) => reference,
            Err(e) => {
                warn!(participant = %self.name, error = %e, "drawing generation failed");
                NO_DRAWING.to_string()
            }
        }
    }
}

#[async_trait]
impl Participant for AutomatedParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ParticipantKind {
        ParticipantKind::Automated
    }

    fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    async fn produce(
        &self,
        previous: Option<&str>,
        phase: Phase,
        round: u32,
    ) -> Result<String, ParticipantError> {
        let output = match phase {
            Phase::CreateText => self.create().await,
            Phase::GuessText => self.guess(previous).await,
            Phase::Draw => self.draw(previous, round).await,
        };
        info!(participant = %self.name, %phase, round, output = %output, "automated output");
        Ok(output)
    }
}
