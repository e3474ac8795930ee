//! Integration tests that call the real generation APIs.
//!
//! The text test requires ANTHROPIC_API_KEY (via .env file or environment).
//! Run with: `cargo test -p telephone-core --test api_integration -- --ignored`

use std::sync::Arc;
use telephone_core::backend::{ClaudeText, PollinationsDrawing, TextGenerator};
use telephone_core::{AutomatedParticipant, Participant, Phase, NO_DRAWING};
use tempfile::TempDir;

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

fn has_api_key() -> bool {
    std::env::var("ANTHROPIC_API_KEY").is_ok()
}

#[tokio::test]
#[ignore]
async fn test_claude_invents_a_prompt() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let text = ClaudeText::from_env().expect("Failed to create client");
    let prompt = text
        .generate_text("Invent a prompt for a drawing game.")
        .await
        .expect("Claude should respond");
    assert!(!prompt.trim().is_empty());
    assert!(!prompt.contains('\n'));
}

#[tokio::test]
#[ignore]
async fn test_automated_participant_draws_online() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: ANTHROPIC_API_KEY not set");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let bot = AutomatedParticipant::new(
        "AI Bot 1",
        Arc::new(ClaudeText::from_env().expect("Failed to create client")),
        Arc::new(PollinationsDrawing::new(temp_dir.path()).expect("Failed to create client")),
    );

    let drawing = bot
        .produce(Some("A lighthouse in a storm"), Phase::Draw, 1)
        .await
        .unwrap();
    assert_ne!(drawing, NO_DRAWING, "image service unavailable");
    assert!(std::path::Path::new(&drawing).exists());

    let guess = bot.produce(Some(&drawing), Phase::GuessText, 2).await.unwrap();
    println!("Guess: {guess}");
    assert!(!guess.trim().is_empty());
}
