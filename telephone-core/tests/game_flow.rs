//! Full games played end to end with scripted and mocked participants.
//!
//! Run with: `cargo test -p telephone-core --test game_flow`

use std::collections::BTreeSet;
use std::sync::Arc;
use telephone_core::backend::{DrawingGenerator, SketchDrawing};
use telephone_core::chain::Action;
use telephone_core::record::is_sentinel;
use telephone_core::testing::{
    init_logging, MockDrawing, MockText, ScriptedInput, ScriptedParticipant,
};
use telephone_core::{
    AutomatedParticipant, CompletedGame, Game, GameConfig, InteractiveParticipant, Participant,
    ParticipantKind, RosterBuilder, Scheduling, NO_DRAWING,
};

fn scripted(names: &[&str]) -> telephone_core::Roster {
    let participants: Vec<Arc<dyn Participant>> = names
        .iter()
        .map(|name| Arc::new(ScriptedParticipant::new(*name)) as Arc<dyn Participant>)
        .collect();
    telephone_core::Roster::new(participants).unwrap()
}

/// Every mapping has exactly one entry per participant and nobody ever
/// receives their own work.
fn assert_well_formed(game: &CompletedGame) {
    let names: Vec<&str> = game.players().iter().map(|(n, _)| n.as_str()).collect();
    let mut previous: Option<&telephone_core::RoundRecord> = None;

    for record in game.history() {
        for map in [&record.texts, &record.draw_assignments, &record.drawings] {
            assert_eq!(map.len(), names.len());
            for name in &names {
                assert!(
                    map.contains_key(*name),
                    "{name} missing in round {}",
                    record.round_number
                );
            }
        }

        for (name, assigned) in &record.draw_assignments {
            let owners = record.texts.values().filter(|t| *t == assigned).count();
            if !is_sentinel(assigned) && owners == 1 {
                assert_ne!(&record.texts[name], assigned, "{name} drew their own text");
            }
        }

        match previous {
            None => assert!(record.guess_assignments.is_empty()),
            Some(prev) => {
                assert_eq!(record.guess_assignments.len(), names.len());
                for (name, drawing) in &record.guess_assignments {
                    if !is_sentinel(drawing) {
                        assert_ne!(
                            &prev.drawings[name],
                            drawing,
                            "{name} guessed their own drawing"
                        );
                    }
                }
            }
        }
        previous = Some(record);
    }
}

#[tokio::test]
async fn test_concurrent_game_is_well_formed() {
    init_logging();
    let config = GameConfig::default()
        .with_scheduling(Scheduling::Concurrent { max_workers: 2 })
        .with_seed(42);
    let game = Game::new(scripted(&["Ann", "Ben", "Cat", "Dan", "Eve"]), config)
        .play(4)
        .await
        .unwrap();

    assert_eq!(game.history().len(), 4);
    assert_well_formed(&game);
}

#[tokio::test]
async fn test_sequential_game_is_well_formed() {
    init_logging();
    let config = GameConfig::default()
        .with_scheduling(Scheduling::Sequential)
        .with_seed(7);
    let game = Game::new(scripted(&["Ann", "Ben", "Cat"]), config)
        .play(3)
        .await
        .unwrap();
    assert_well_formed(&game);
}

#[tokio::test]
async fn test_one_failing_backend_only_affects_its_owner() {
    init_logging();
    let broken = MockDrawing::failing();
    let broken_calls = broken.calls();
    let broken: Arc<dyn DrawingGenerator> = Arc::new(broken);
    let working: Arc<dyn DrawingGenerator> = Arc::new(MockDrawing::succeeding());

    let roster = RosterBuilder::new(move |name: String| {
        let drawing = if name == "AI Bot 2" {
            broken.clone()
        } else {
            working.clone()
        };
        Arc::new(AutomatedParticipant::new(
            name,
            Arc::new(MockText::replying("A lighthouse")),
            drawing,
        )) as Arc<dyn Participant>
    })
    .with_bots(4)
    .build()
    .unwrap();

    let game = Game::new(roster, GameConfig::default().with_seed(3))
        .play(1)
        .await
        .unwrap();

    let record = game.history().round(1).unwrap();
    assert_eq!(record.drawings["AI Bot 2"], NO_DRAWING);
    for name in ["AI Bot 1", "AI Bot 3", "AI Bot 4"] {
        assert_eq!(record.drawings[name], format!("mock/{name}_1.png"));
    }
    assert_eq!(broken_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_human_and_bots_play_together() {
    init_logging();
    let input = Arc::new(ScriptedInput::new(["A cat on a piano", "A dog", "spare"]));
    let human: Arc<dyn Participant> =
        Arc::new(InteractiveParticipant::new("Alice", input.clone()));

    let mut builder = RosterBuilder::new(|name: String| {
        Arc::new(AutomatedParticipant::new(
            name,
            Arc::new(MockText::replying("A sunset")),
            Arc::new(MockDrawing::succeeding()),
        )) as Arc<dyn Participant>
    })
    .with_participant(human);
    let added = builder.fill_to_minimum();
    assert_eq!(added, vec!["AI Bot 1".to_string(), "AI Bot 2".to_string()]);

    let game = Game::new(builder.build().unwrap(), GameConfig::default().with_seed(9))
        .play(2)
        .await
        .unwrap();

    let first = game.history().round(1).unwrap();
    assert_eq!(first.texts["Alice"], "A cat on a piano");
    assert_eq!(first.drawings["Alice"], "sketch/Alice_1.txt");
    assert_eq!(
        game.players()[0],
        ("Alice".to_string(), ParticipantKind::Human)
    );

    let second = game.history().round(2).unwrap();
    assert_eq!(second.texts["Alice"], "A dog");
    assert_eq!(input.rendered().len(), 1);
    assert!(input
        .messages()
        .iter()
        .any(|m| m.starts_with("Alice received drawing: ")));
    assert_well_formed(&game);
}

#[tokio::test]
async fn test_chains_follow_assignments() {
    init_logging();
    let game = Game::new(
        scripted(&["Ann", "Ben", "Cat", "Dan"]),
        GameConfig::default().with_seed(5),
    )
    .play(3)
    .await
    .unwrap();

    let chains = game.chains().unwrap();
    assert_eq!(chains.len(), 4);

    for chain in &chains {
        // text, then (drawing, guess) pairs, ending on the last round's drawing
        assert_eq!(chain.steps.len(), 6, "{chain}");
        assert!(!chain.ambiguous);

        for pair in chain.steps.windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            let record = game.history().round(after.round).unwrap();
            match after.action {
                Action::Drawing => {
                    assert_eq!(record.draw_assignments[&after.participant], before.content);
                    assert_eq!(record.drawings[&after.participant], after.content);
                }
                Action::Guess => {
                    assert_eq!(record.guess_assignments[&after.participant], before.content);
                    assert_eq!(record.texts[&after.participant], after.content);
                }
                Action::Text => panic!("text only starts a chain"),
            }
        }
    }

    assert_eq!(game.chains().unwrap(), chains);
}

#[tokio::test]
async fn test_look_alike_names_get_their_own_drawing_files() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let drawing: Arc<dyn DrawingGenerator> = Arc::new(SketchDrawing::new(dir.path()));
    let make = move |name: String| {
        Arc::new(AutomatedParticipant::new(
            name,
            Arc::new(MockText::replying("A kite")),
            drawing.clone(),
        )) as Arc<dyn Participant>
    };

    let look_alike = make("AI_Bot_1".to_string());
    let mut builder = RosterBuilder::new(make).with_participant(look_alike);
    assert_eq!(builder.fill_to_minimum(), vec!["AI Bot 2", "AI Bot 3"]);

    let config = GameConfig::default()
        .with_scheduling(Scheduling::Sequential)
        .with_seed(1);
    let game = Game::new(builder.build().unwrap(), config)
        .play(2)
        .await
        .unwrap();

    for record in game.history() {
        let files: BTreeSet<&String> = record.drawings.values().collect();
        assert_eq!(files.len(), 3, "drawings shared a file in round {}", record.round_number);
        for file in files {
            assert!(std::path::Path::new(file).exists());
        }
    }
}
