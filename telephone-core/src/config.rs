//! Game and automated-player configuration.

use crate::backend::DEFAULT_DRAWINGS_DIR;
use crate::derange::DerangePolicy;
use crate::participant::DEFAULT_TIME_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of drawings produced at the same time.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// How the drawing phase schedules participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scheduling {
    /// One participant at a time, in roster order.
    Sequential,
    /// All participants at once, at most `max_workers` in flight.
    Concurrent { max_workers: usize },
}

impl Default for Scheduling {
    fn default() -> Self {
        Scheduling::Concurrent {
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

/// Configuration for a game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// How assignments are drawn.
    pub derange_policy: DerangePolicy,

    /// How the drawing phase is scheduled.
    pub scheduling: Scheduling,

    /// Seed for assignment randomness. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Where drawings are written.
    pub drawings_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            derange_policy: DerangePolicy::default(),
            scheduling: Scheduling::default(),
            seed: None,
            drawings_dir: PathBuf::from(DEFAULT_DRAWINGS_DIR),
        }
    }
}

impl GameConfig {
    /// Defaults, with the drawings directory taken from
    /// `TELEPHONE_DRAWINGS_DIR` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("TELEPHONE_DRAWINGS_DIR") {
            if !dir.trim().is_empty() {
                config.drawings_dir = PathBuf::from(dir);
            }
        }
        config
    }

    pub fn with_derange_policy(mut self, policy: DerangePolicy) -> Self {
        self.derange_policy = policy;
        self
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_drawings_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.drawings_dir = dir.into();
        self
    }
}

/// Configuration shared by automated participants.
#[derive(Debug, Clone)]
pub struct AutomatedConfig {
    /// Limit on a single generation call, including fallbacks.
    pub time_limit: Option<Duration>,

    /// Text model to use.
    pub model: String,

    /// Maximum tokens per text completion.
    pub max_tokens: usize,
}

impl Default for AutomatedConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(DEFAULT_TIME_LIMIT),
            model: crate::backend::DEFAULT_MODEL.to_string(),
            max_tokens: 100,
        }
    }
}

impl AutomatedConfig {
    /// Defaults, with the model taken from `TELEPHONE_MODEL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("TELEPHONE_MODEL") {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }
        config
    }
}
