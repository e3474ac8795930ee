//! The round engine.
//!
//! A round moves through [`RoundState::TextPhase`], [`RoundState::Assign`],
//! [`RoundState::DrawPhase`] and [`RoundState::Record`]. Every participant
//! gets exactly one entry in every mapping of the finished
//! [`RoundRecord`]: failures along the way are logged and replaced by
//! sentinel content, never propagated.

use crate::config::{GameConfig, Scheduling};
use crate::derange::{derange_owners, DerangeError, DerangePolicy};
use crate::participant::{Participant, ParticipantError, ParticipantKind, Phase};
use crate::record::{RoundRecord, NO_DRAWING, NO_GUESS, NO_PROMPT, NO_TEXT};
use crate::roster::Roster;
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Where a round currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    TextPhase,
    Assign,
    DrawPhase,
    Record,
}

/// Content substituted when a participant fails to produce for `phase`.
pub fn sentinel_for(phase: Phase) -> &'static str {
    match phase {
        Phase::CreateText => NO_TEXT,
        Phase::GuessText => NO_GUESS,
        Phase::Draw => NO_DRAWING,
    }
}

/// Runs single rounds for a fixed roster.
pub struct RoundEngine {
    roster: Roster,
    policy: DerangePolicy,
    scheduling: Scheduling,
    rng: Mutex<StdRng>,
}

impl RoundEngine {
    pub fn new(roster: Roster, config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            roster,
            policy: config.derange_policy,
            scheduling: config.scheduling,
            rng: Mutex::new(rng),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Play one round.
    ///
    /// `previous` is the record of the round before, whose drawings are
    /// handed out for guessing. Round 1 has none.
    pub async fn run(&self, round: u32, previous: Option<&RoundRecord>) -> RoundRecord {
        let names = self.roster.names();
        let mut record = RoundRecord::new(round);
        info!(round, players = names.len(), "round started");

        self.enter(round, RoundState::TextPhase);
        let (text_phase, texts) = match previous {
            None => {
                let inputs = vec![None; names.len()];
                let texts = self.text_phase(round, Phase::CreateText, inputs).await;
                (Phase::CreateText, texts)
            }
            Some(previous) => {
                let drawings: Vec<String> = names
                    .iter()
                    .map(|name| {
                        previous
                            .drawings
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| NO_DRAWING.to_string())
                    })
                    .collect();
                let assigned = self.distribute(round, "drawings", &drawings, NO_DRAWING);
                record.guess_assignments = keyed(&names, &assigned);
                let inputs = assigned.into_iter().map(Some).collect();
                let texts = self.text_phase(round, Phase::GuessText, inputs).await;
                (Phase::GuessText, texts)
            }
        };
        record.texts = keyed(&names, &texts);

        self.enter(round, RoundState::Assign);
        let to_draw = self.distribute(round, "texts", &texts, NO_PROMPT);
        record.draw_assignments = keyed(&names, &to_draw);

        self.enter(round, RoundState::DrawPhase);
        let drawings = match self.scheduling {
            Scheduling::Sequential => self.draw_sequential(round, &to_draw).await,
            Scheduling::Concurrent { max_workers } => {
                self.draw_concurrent(round, &to_draw, max_workers).await
            }
        };
        record.drawings = keyed(&names, &drawings);

        for (index, participant) in self.roster.iter().enumerate() {
            participant.receive(&texts[index], text_phase);
            participant.receive(&drawings[index], Phase::Draw);
        }

        self.enter(round, RoundState::Record);
        info!(round, "round complete");
        record
    }

    fn enter(&self, round: u32, state: RoundState) {
        debug!(round, ?state, "round state");
    }

    /// Hand each participant an item owned by someone else.
    ///
    /// `items[i]` belongs to roster member `i`.
    fn distribute(&self, round: u32, what: &str, items: &[String], sentinel: &str) -> Vec<String> {
        let source = {
            let mut rng = self
                .rng
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            derange_owners(items.len(), self.policy, &mut *rng)
        };

        match &source {
            Ok(source) => {
                for (receiver, &owner) in source.iter().enumerate() {
                    debug!(
                        round,
                        what,
                        receiver = self.roster.get(receiver).map(|p| p.name()),
                        owner = self.roster.get(owner).map(|p| p.name()),
                        item = %items[owner],
                        "assigned"
                    );
                }
            }
            Err(e) => warn!(
                round,
                what,
                error = %e,
                "unable to distribute, assigning sentinel to everyone"
            ),
        }
        assign_or_sentinel(source, items, sentinel)
    }

    async fn text_phase(
        &self,
        round: u32,
        phase: Phase,
        inputs: Vec<Option<String>>,
    ) -> Vec<String> {
        let mut texts = Vec::with_capacity(inputs.len());
        for (participant, input) in self.roster.iter().zip(inputs) {
            texts.push(produce_or_sentinel(participant.clone(), input, phase, round).await);
        }
        texts
    }

    async fn draw_sequential(&self, round: u32, to_draw: &[String]) -> Vec<String> {
        let mut drawings = Vec::with_capacity(to_draw.len());
        for (participant, prompt) in self.roster.iter().zip(to_draw) {
            drawings.push(
                produce_or_sentinel(participant.clone(), Some(prompt.clone()), Phase::Draw, round)
                    .await,
            );
        }
        drawings
    }

    /// Automated participants draw as bounded concurrent tasks. Human
    /// participants draw after every task has been joined, one at a time,
    /// so nothing else writes to the terminal while a person is drawing.
    async fn draw_concurrent(
        &self,
        round: u32,
        to_draw: &[String],
        max_workers: usize,
    ) -> Vec<String> {
        let permits = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut tasks = JoinSet::new();

        for (index, participant) in self.roster.iter().enumerate() {
            if participant.kind() != ParticipantKind::Automated {
                continue;
            }
            let participant = participant.clone();
            let prompt = to_draw[index].clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let drawing =
                    produce_or_sentinel(participant, Some(prompt), Phase::Draw, round).await;
                (index, drawing)
            });
        }

        // Each task writes only its own slot.
        let mut slots: Vec<Option<String>> = vec![None; to_draw.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, drawing)) => slots[index] = Some(drawing),
                Err(e) => warn!(round, error = %e, "drawing task did not finish"),
            }
        }

        for (index, participant) in self.roster.iter().enumerate() {
            if participant.kind() == ParticipantKind::Automated {
                continue;
            }
            let prompt = Some(to_draw[index].clone());
            slots[index] =
                Some(produce_or_sentinel(participant.clone(), prompt, Phase::Draw, round).await);
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    let name = self.roster.get(index).map(|p| p.name()).unwrap_or_default();
                    warn!(round, participant = name, "no drawing collected");
                    NO_DRAWING.to_string()
                })
            })
            .collect()
    }
}

/// The items each receiver gets under the owner permutation `source`.
///
/// Without a permutation every receiver gets `sentinel`.
pub fn assign_or_sentinel(
    source: Result<Vec<usize>, DerangeError>,
    items: &[String],
    sentinel: &str,
) -> Vec<String> {
    match source {
        Ok(source) => source.iter().map(|&owner| items[owner].clone()).collect(),
        Err(_) => vec![sentinel.to_string(); items.len()],
    }
}

/// Ask a participant for content, degrading every failure to a sentinel.
///
/// Errors, empty output, timeouts and panics all count as failures.
pub async fn produce_or_sentinel(
    participant: Arc<dyn Participant>,
    previous: Option<String>,
    phase: Phase,
    round: u32,
) -> String {
    let produce = AssertUnwindSafe(participant.produce(previous.as_deref(), phase, round))
        .catch_unwind()
        .map(|caught| {
            caught.unwrap_or_else(|_| {
                Err(ParticipantError::Task("participant panicked".to_string()))
            })
        });

    let result = match participant.time_limit() {
        Some(limit) => tokio::time::timeout(limit, produce)
            .await
            .unwrap_or(Err(ParticipantError::Timeout(limit))),
        None => produce.await,
    };

    match result {
        Ok(output) if !output.trim().is_empty() => output,
        Ok(_) => {
            warn!(participant = participant.name(), %phase, round, "empty output, using sentinel");
            sentinel_for(phase).to_string()
        }
        Err(e) => {
            warn!(
                participant = participant.name(),
                %phase,
                round,
                error = %e,
                "production failed, using sentinel"
            );
            sentinel_for(phase).to_string()
        }
    }
}

fn keyed(names: &[String], values: &[String]) -> BTreeMap<String, String> {
    names.iter().cloned().zip(values.iter().cloned()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedParticipant;
    use std::time::Duration;

    fn roster(participants: Vec<ScriptedParticipant>) -> Roster {
        Roster::new(
            participants
                .into_iter()
                .map(|p| Arc::new(p) as Arc<dyn Participant>)
                .collect(),
        )
        .unwrap()
    }

    fn abc() -> Roster {
        roster(vec![
            ScriptedParticipant::new("Alice").with_text("A"),
            ScriptedParticipant::new("Bob").with_text("B"),
            ScriptedParticipant::new("Carol").with_text("C"),
        ])
    }

    #[tokio::test]
    async fn test_round_one_draw_assignments_are_deranged() {
        for seed in 0..20 {
            let engine = RoundEngine::new(abc(), &GameConfig::default().with_seed(seed));
            let record = engine.run(1, None).await;

            assert_eq!(record.round_number, 1);
            assert!(record.guess_assignments.is_empty());
            for (name, own) in [("Alice", "A"), ("Bob", "B"), ("Carol", "C")] {
                assert_eq!(record.texts[name], own);
                assert_ne!(record.draw_assignments[name], own);
            }
            let mut assigned: Vec<_> = record.draw_assignments.values().cloned().collect();
            assigned.sort();
            assert_eq!(assigned, vec!["A", "B", "C"]);
        }
    }

    #[tokio::test]
    async fn test_drawings_follow_assignments() {
        let engine = RoundEngine::new(abc(), &GameConfig::default().with_seed(1));
        let record = engine.run(1, None).await;
        for (name, prompt) in &record.draw_assignments {
            assert_eq!(record.drawings[name], format!("{name} drew {prompt}"));
        }
    }

    #[tokio::test]
    async fn test_rotate_policy_is_predictable() {
        let config = GameConfig::default().with_derange_policy(DerangePolicy::Rotate);
        let record = RoundEngine::new(abc(), &config).run(1, None).await;
        assert_eq!(record.draw_assignments["Alice"], "B");
        assert_eq!(record.draw_assignments["Bob"], "C");
        assert_eq!(record.draw_assignments["Carol"], "A");
    }

    #[tokio::test]
    async fn test_guess_round_hands_out_previous_drawings() {
        let engine = RoundEngine::new(abc(), &GameConfig::default().with_seed(5));
        let first = engine.run(1, None).await;
        let second = engine.run(2, Some(&first)).await;

        assert_eq!(second.guess_assignments.len(), 3);
        for (name, drawing) in &second.guess_assignments {
            assert_ne!(&first.drawings[name], drawing, "{name} got their own drawing");
            assert_eq!(second.texts[name], format!("{name} guessed {drawing}"));
        }
    }

    #[tokio::test]
    async fn test_identical_texts_still_deranged_by_owner() {
        let engine = RoundEngine::new(
            roster(vec![
                ScriptedParticipant::new("Alice").with_text("same"),
                ScriptedParticipant::new("Bob").with_text("same"),
                ScriptedParticipant::new("Carol").with_text("same"),
            ]),
            &GameConfig::default().with_seed(3),
        );
        let record = engine.run(1, None).await;
        assert!(record.draw_assignments.values().all(|t| t == "same"));
    }

    #[tokio::test]
    async fn test_failed_drawing_isolated_sequential() {
        let engine = RoundEngine::new(
            roster(vec![
                ScriptedParticipant::new("Alice").with_text("A"),
                ScriptedParticipant::new("Bob").with_text("B").failing_on(Phase::Draw),
                ScriptedParticipant::new("Carol").with_text("C"),
            ]),
            &GameConfig::default()
                .with_scheduling(Scheduling::Sequential)
                .with_seed(2),
        );
        let record = engine.run(1, None).await;
        assert_eq!(record.drawings.len(), 3);
        assert_eq!(record.drawings["Bob"], NO_DRAWING);
        assert!(record.drawings["Alice"].starts_with("Alice drew"));
        assert!(record.drawings["Carol"].starts_with("Carol drew"));
    }

    #[tokio::test]
    async fn test_panicking_drawing_isolated_concurrent() {
        let engine = RoundEngine::new(
            roster(vec![
                ScriptedParticipant::new("Alice").with_text("A"),
                ScriptedParticipant::new("Bob").with_text("B").panicking_on(Phase::Draw),
                ScriptedParticipant::new("Carol").with_text("C"),
            ]),
            &GameConfig::default()
                .with_scheduling(Scheduling::Concurrent { max_workers: 2 })
                .with_seed(4),
        );
        let record = engine.run(1, None).await;
        assert_eq!(record.drawings["Bob"], NO_DRAWING);
        assert!(record.drawings["Alice"].starts_with("Alice drew"));
        assert!(record.drawings["Carol"].starts_with("Carol drew"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_sentinel() {
        let slow = ScriptedParticipant::new("Slow")
            .with_text("S")
            .with_delay(Duration::from_secs(10))
            .with_time_limit(Duration::from_secs(1));
        let engine = RoundEngine::new(
            roster(vec![
                ScriptedParticipant::new("Alice").with_text("A"),
                ScriptedParticipant::new("Bob").with_text("B"),
                slow,
            ]),
            &GameConfig::default().with_seed(8),
        );
        let record = engine.run(1, None).await;
        assert_eq!(record.texts["Slow"], NO_TEXT);
        assert_eq!(record.drawings["Slow"], NO_DRAWING);
        assert_eq!(record.texts["Alice"], "A");
    }

    #[tokio::test]
    async fn test_failed_guess_becomes_no_guess() {
        let engine = RoundEngine::new(
            roster(vec![
                ScriptedParticipant::new("Alice").with_text("A"),
                ScriptedParticipant::new("Bob").with_text("B").failing_on(Phase::GuessText),
                ScriptedParticipant::new("Carol").with_text("C"),
            ]),
            &GameConfig::default().with_seed(6),
        );
        let first = engine.run(1, None).await;
        let second = engine.run(2, Some(&first)).await;
        assert_eq!(second.texts["Bob"], NO_GUESS);
        assert_eq!(second.texts.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_previous_drawing_uses_sentinel() {
        let engine = RoundEngine::new(abc(), &GameConfig::default().with_seed(11));
        let mut first = engine.run(1, None).await;
        first.drawings.remove("Alice");
        let second = engine.run(2, Some(&first)).await;

        let receiver = second
            .guess_assignments
            .iter()
            .find(|(_, d)| d.as_str() == NO_DRAWING)
            .map(|(name, _)| name.clone())
            .unwrap();
        assert_eq!(second.texts[&receiver], format!("{receiver} guessed {NO_DRAWING}"));
    }

    #[test]
    fn test_no_derangement_gives_everyone_the_sentinel() {
        let one = vec!["A".to_string()];
        assert_eq!(
            assign_or_sentinel(Err(DerangeError::TooFew(1)), &one, NO_PROMPT),
            vec![NO_PROMPT]
        );

        let three: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            assign_or_sentinel(Err(DerangeError::Exhausted(64)), &three, NO_DRAWING),
            vec![NO_DRAWING; 3]
        );
        assert_eq!(
            assign_or_sentinel(Ok(vec![1, 2, 0]), &three, NO_PROMPT),
            vec!["B", "C", "A"]
        );
    }

    /// Logs when each draw starts and ends.
    struct DrawLog {
        name: String,
        kind: ParticipantKind,
        events: Arc<Mutex<Vec<(ParticipantKind, bool)>>>,
    }

    #[async_trait::async_trait]
    impl Participant for DrawLog {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> ParticipantKind {
            self.kind
        }

        async fn produce(
            &self,
            _previous: Option<&str>,
            phase: Phase,
            _round: u32,
        ) -> Result<String, ParticipantError> {
            if phase == Phase::Draw {
                self.events.lock().unwrap().push((self.kind, true));
                tokio::time::sleep(Duration::from_millis(50)).await;
                self.events.lock().unwrap().push((self.kind, false));
            }
            Ok(format!("{} {phase}", self.name))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_human_never_draws_alongside_bots() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let player = |name: &str, kind| {
            Arc::new(DrawLog {
                name: name.to_string(),
                kind,
                events: events.clone(),
            }) as Arc<dyn Participant>
        };
        let participants = vec![
            player("Bot A", ParticipantKind::Automated),
            player("Alice", ParticipantKind::Human),
            player("Bot B", ParticipantKind::Automated),
            player("Bot C", ParticipantKind::Automated),
        ];
        let config = GameConfig::default()
            .with_scheduling(Scheduling::Concurrent { max_workers: 4 })
            .with_seed(12);
        let record = RoundEngine::new(Roster::new(participants).unwrap(), &config)
            .run(1, None)
            .await;
        assert_eq!(record.drawings["Alice"], "Alice draw");

        let events = events.lock().unwrap().clone();
        assert_eq!(events.len(), 8);
        let (mut bots_drawing, mut human_drawing) = (0usize, false);
        let mut max_bots = 0;
        for (kind, started) in events {
            match (kind, started) {
                (ParticipantKind::Human, true) => {
                    assert_eq!(bots_drawing, 0, "human started while bots were drawing");
                    human_drawing = true;
                }
                (ParticipantKind::Human, false) => human_drawing = false,
                (ParticipantKind::Automated, true) => {
                    assert!(!human_drawing, "bot started while the human was drawing");
                    bots_drawing += 1;
                    max_bots = max_bots.max(bots_drawing);
                }
                (ParticipantKind::Automated, false) => bots_drawing -= 1,
            }
        }
        assert_eq!(max_bots, 3);
    }

    #[tokio::test]
    async fn test_feedback_delivered() {
        let alice = Arc::new(ScriptedParticipant::new("Alice").with_text("A"));
        let participants: Vec<Arc<dyn Participant>> = vec![
            alice.clone(),
            Arc::new(ScriptedParticipant::new("Bob").with_text("B")),
            Arc::new(ScriptedParticipant::new("Carol").with_text("C")),
        ];
        let engine = RoundEngine::new(Roster::new(participants).unwrap(), &GameConfig::default());
        engine.run(1, None).await;

        let received = alice.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0], ("A".to_string(), Phase::CreateText));
        assert_eq!(received[1].1, Phase::Draw);
    }
}
