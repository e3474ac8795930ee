//! Round engine for a drawing telephone game.
//!
//! This crate provides:
//! - Derangement-based assignment so nobody receives their own work
//! - Interactive and automated participants behind one trait
//! - A round engine with sequential or concurrent drawing
//! - Chain reconstruction over a finished game
//! - Remote and offline generation backends
//! - Game persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use telephone_core::backend::{CannedText, SketchDrawing};
//! use telephone_core::{AutomatedParticipant, Game, GameConfig, Participant, RosterBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::default();
//!     let drawing = Arc::new(SketchDrawing::new(&config.drawings_dir));
//!
//!     let roster = RosterBuilder::new(|name: String| {
//!         Arc::new(AutomatedParticipant::new(name, Arc::new(CannedText), drawing.clone()))
//!             as Arc<dyn Participant>
//!     })
//!     .with_bots(4)
//!     .build()?;
//!
//!     let game = Game::new(roster, config).play(2).await?;
//!     for chain in game.chains()? {
//!         println!("{chain}");
//!     }
//!     game.save("telephone.json").await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod chain;
pub mod config;
pub mod derange;
pub mod game;
pub mod participant;
pub mod persist;
pub mod record;
pub mod round;
pub mod roster;
pub mod testing;

// Primary public API
pub use chain::{reconstruct, reconstruct_all, Action, Chain, ChainError, ChainStep};
pub use config::{AutomatedConfig, GameConfig, Scheduling};
pub use derange::{derange, derange_with_rng, DerangeError, DerangePolicy};
pub use game::{CompletedGame, Game, GameError};
pub use participant::{
    AutomatedParticipant, HumanInput, InteractiveParticipant, Participant, ParticipantError,
    ParticipantKind, Phase,
};
pub use persist::{PersistError, SavedGame};
pub use record::{History, RoundRecord, NO_DRAWING, NO_GUESS, NO_PROMPT, NO_TEXT};
pub use roster::{Roster, RosterBuilder, RosterError, MIN_PARTICIPANTS};
