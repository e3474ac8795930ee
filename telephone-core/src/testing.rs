//! Testing utilities for the telephone game.
//!
//! This module provides deterministic stand-ins for everything that
//! normally needs a person or a network:
//! - `ScriptedParticipant` for round and game tests
//! - `ScriptedInput` for driving an `InteractiveParticipant`
//! - `MockText` / `MockDrawing` for automated participants
//! - `init_logging` to see engine logs from tests

use crate::backend::{BackendError, DrawingGenerator, TextGenerator};
use crate::participant::{HumanInput, Participant, ParticipantError, ParticipantKind, Phase};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Filter comes from `TEST_LOG`, then `RUST_LOG`, then `warn`.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A participant with predictable output.
///
/// - create: the scripted text, or `"{name}'s prompt"`
/// - guess: `"{name} guessed {drawing}"`
/// - draw: `"{name} drew {prompt}"`
pub struct ScriptedParticipant {
    name: String,
    kind: ParticipantKind,
    text: Option<String>,
    failing: Vec<Phase>,
    panicking: Vec<Phase>,
    delay: Option<Duration>,
    time_limit: Option<Duration>,
    received: Mutex<Vec<(String, Phase)>>,
}

impl ScriptedParticipant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParticipantKind::Automated,
            text: None,
            failing: Vec::new(),
            panicking: Vec::new(),
            delay: None,
            time_limit: None,
            received: Mutex::new(Vec::new()),
        }
    }

    /// Text to hand in when creating a prompt.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_kind(mut self, kind: ParticipantKind) -> Self {
        self.kind = kind;
        self
    }

    /// Return an error whenever asked for `phase`.
    pub fn failing_on(mut self, phase: Phase) -> Self {
        self.failing.push(phase);
        self
    }

    /// Panic whenever asked for `phase`.
    pub fn panicking_on(mut self, phase: Phase) -> Self {
        self.panicking.push(phase);
        self
    }

    /// Sleep before every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Feedback received so far, in order.
    pub fn received(&self) -> Vec<(String, Phase)> {
        lock(&self.received).clone()
    }
}

#[async_trait]
impl Participant for ScriptedParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ParticipantKind {
        self.kind
    }

    fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    async fn produce(
        &self,
        previous: Option<&str>,
        phase: Phase,
        _round: u32,
    ) -> Result<String, ParticipantError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panicking.contains(&phase) {
            panic!("{} panicked during {phase}", self.name);
        }
        if self.failing.contains(&phase) {
            return Err(ParticipantError::Task(format!("{} failed during {phase}", self.name)));
        }

        let previous = previous.unwrap_or_default();
        Ok(match phase {
            Phase::CreateText => self
                .text
                .clone()
                .unwrap_or_else(|| format!("{}'s prompt", self.name)),
            Phase::GuessText => format!("{} guessed {previous}", self.name),
            Phase::Draw => format!("{} drew {previous}", self.name),
        })
    }

    fn receive(&self, output: &str, phase: Phase) {
        lock(&self.received).push((output.to_string(), phase));
    }
}

/// Human input read from a queue of canned answers.
///
/// Drawings come back as `"sketch/{name}_{round}.txt"`. Once the queue is
/// empty, text capture fails like a closed stdin.
pub struct ScriptedInput {
    answers: Mutex<VecDeque<String>>,
    messages: Mutex<Vec<String>>,
    rendered: Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new<I>(answers: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            messages: Mutex::new(Vec::new()),
            rendered: Mutex::new(Vec::new()),
        }
    }

    /// Everything passed to `show`.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }

    /// Drawings that were rendered for guessing.
    pub fn rendered(&self) -> Vec<String> {
        lock(&self.rendered).clone()
    }
}

#[async_trait]
impl HumanInput for ScriptedInput {
    async fn capture_text(&self, _label: &str) -> io::Result<String> {
        lock(&self.answers)
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted answers"))
    }

    async fn capture_drawing(&self, name: &str, round: u32, _prompt: &str) -> io::Result<String> {
        Ok(format!("sketch/{name}_{round}.txt"))
    }

    async fn render_drawing(&self, drawing: &str) -> io::Result<()> {
        lock(&self.rendered).push(drawing.to_string());
        Ok(())
    }

    fn show(&self, message: &str) {
        lock(&self.messages).push(message.to_string());
    }
}

/// A text backend that always replies the same way, or always fails.
pub struct MockText {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockText {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of backend calls.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    fn answer(&self) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| BackendError::Network("mock text backend is down".to_string()))
    }
}

#[async_trait]
impl TextGenerator for MockText {
    async fn generate_text(&self, _context: &str) -> Result<String, BackendError> {
        self.answer()
    }

    async fn describe_drawing(&self, _drawing: &str) -> Result<String, BackendError> {
        self.answer()
    }
}

/// A drawing backend returning `"mock/{owner}_{round}.png"`, or failing.
pub struct MockDrawing {
    succeed: bool,
    calls: Arc<AtomicUsize>,
}

impl MockDrawing {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl DrawingGenerator for MockDrawing {
    async fn generate_drawing(
        &self,
        _prompt: &str,
        owner: &str,
        round: u32,
    ) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(format!("mock/{owner}_{round}.png"))
        } else {
            Err(BackendError::Api {
                status: 503,
                message: "mock drawing backend is down".to_string(),
            })
        }
    }
}
