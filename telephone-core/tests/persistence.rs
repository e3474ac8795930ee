//! Save/load of finished games.
//!
//! Run with: `cargo test -p telephone-core --test persistence`

use std::sync::Arc;
use telephone_core::persist::{SavedGame, SAVE_VERSION};
use telephone_core::testing::ScriptedParticipant;
use telephone_core::{
    CompletedGame, Game, GameConfig, Participant, ParticipantKind, PersistError, Roster,
};
use tempfile::TempDir;

async fn finished_game() -> CompletedGame {
    let participants: Vec<Arc<dyn Participant>> = vec![
        Arc::new(ScriptedParticipant::new("Alice").with_kind(ParticipantKind::Human)),
        Arc::new(ScriptedParticipant::new("AI Bot 1")),
        Arc::new(ScriptedParticipant::new("AI Bot 2")),
    ];
    Game::new(Roster::new(participants).unwrap(), GameConfig::default().with_seed(17))
        .play(2)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("saves").join("game.json");

    let game = finished_game().await;
    game.save(&path).await.unwrap();
    assert!(path.exists());

    let loaded = CompletedGame::load(&path).await.unwrap();
    assert_eq!(loaded, game);
    assert_eq!(loaded.chains().unwrap(), game.chains().unwrap());
    assert_eq!(loaded.players()[0].1, ParticipantKind::Human);
}

#[tokio::test]
async fn test_save_file_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("game.json");
    finished_game().await.save(&path).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["version"], SAVE_VERSION);
    assert_eq!(json["players"][1]["kind"], "automated");
    assert_eq!(json["history"][0]["round"], 1);
    assert!(json["history"][0]["guess_assignments"].as_object().unwrap().is_empty());
    assert_eq!(json["history"][1]["guess_assignments"].as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_version_mismatch_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("old.json");

    let mut saved = SavedGame::from_game(&finished_game().await);
    saved.version = SAVE_VERSION + 1;
    saved.save_json(&path).await.unwrap();

    match CompletedGame::load(&path).await {
        Err(PersistError::VersionMismatch { expected, found }) => {
            assert_eq!(expected, SAVE_VERSION);
            assert_eq!(found, SAVE_VERSION + 1);
        }
        other => panic!("expected version mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let result = SavedGame::load_json(temp_dir.path().join("nope.json")).await;
    assert!(matches!(result, Err(PersistError::Io(_))));
}
