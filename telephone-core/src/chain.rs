//! Chain reconstruction.
//!
//! A chain follows one original prompt through the game: who drew it, who
//! guessed that drawing, who drew the guess, and so on. It is derived from
//! a finished [`History`] by matching content values against the
//! assignment maps of each round.
//!
//! Matching is by value. If two participants hand in identical content in
//! the same round the lookup cannot tell them apart; the first match in
//! name order is taken and the chain is marked [`Chain::ambiguous`].

use crate::record::{is_sentinel, History, RoundRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Errors from chain reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("History is empty")]
    EmptyHistory,

    #[error("{0} wrote nothing in round 1")]
    UnknownParticipant(String),
}

/// What a step in a chain did to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// The original prompt.
    Text,
    Drawing,
    Guess,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Text => write!(f, "Text"),
            Action::Drawing => write!(f, "Drawing"),
            Action::Guess => write!(f, "Guess"),
        }
    }
}

/// One transformation in a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    pub participant: String,
    pub action: Action,
    pub content: String,
    /// Round the step happened in.
    pub round: u32,
}

/// The lineage of one original prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Author of the original prompt.
    pub origin: String,
    pub steps: Vec<ChainStep>,
    /// Some step matched more than one participant.
    pub ambiguous: bool,
}

impl Chain {
    /// Steps as `(participant, action, content)` triples.
    pub fn triples(&self) -> Vec<(&str, Action, &str)> {
        self.steps
            .iter()
            .map(|s| (s.participant.as_str(), s.action, s.content.as_str()))
            .collect()
    }

    /// Content the chain ended on.
    pub fn last_content(&self) -> Option<&str> {
        self.steps.last().map(|s| s.content.as_str())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chain started by {}:", self.origin)?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(
                f,
                "  {}. {} ({}): {}",
                i + 1,
                step.participant,
                step.action,
                step.content
            )?;
        }
        if self.ambiguous {
            writeln!(f, "  (identical content made this chain ambiguous)")?;
        }
        Ok(())
    }
}

/// Rebuild the chain that started with `origin`'s round-1 text.
pub fn reconstruct(history: &History, origin: &str) -> Result<Chain, ChainError> {
    let first = history.round(1).ok_or(ChainError::EmptyHistory)?;
    let text = first
        .texts
        .get(origin)
        .ok_or_else(|| ChainError::UnknownParticipant(origin.to_string()))?;

    let mut chain = Chain {
        origin: origin.to_string(),
        steps: vec![ChainStep {
            participant: origin.to_string(),
            action: Action::Text,
            content: text.clone(),
            round: 1,
        }],
        ambiguous: false,
    };

    let mut current = text.clone();
    let mut rounds = history.iter().peekable();

    while let Some(record) = rounds.next() {
        if is_sentinel(&current) {
            break;
        }

        // Who drew the current text this round?
        let Some(drawer) =
            find_holder(&record.draw_assignments, &current, &mut chain, record)
        else {
            break;
        };
        let drawing = record.drawings.get(&drawer).cloned().unwrap_or_default();
        chain.steps.push(ChainStep {
            participant: drawer,
            action: Action::Drawing,
            content: drawing.clone(),
            round: record.round_number,
        });

        if is_sentinel(&drawing) {
            break;
        }

        // Who guessed that drawing next round?
        let Some(next) = rounds.peek() else {
            break;
        };
        let Some(guesser) = find_holder(&next.guess_assignments, &drawing, &mut chain, next) else {
            break;
        };
        let guess = next.texts.get(&guesser).cloned().unwrap_or_default();
        chain.steps.push(ChainStep {
            participant: guesser,
            action: Action::Guess,
            content: guess.clone(),
            round: next.round_number,
        });
        current = guess;
    }

    Ok(chain)
}

/// One chain per round-1 author, in name order.
pub fn reconstruct_all(history: &History) -> Result<Vec<Chain>, ChainError> {
    let first = history.round(1).ok_or(ChainError::EmptyHistory)?;
    first
        .texts
        .keys()
        .map(|origin| reconstruct(history, origin))
        .collect()
}

/// Participant whose assignment equals `content`, first in name order.
fn find_holder(
    assignments: &BTreeMap<String, String>,
    content: &str,
    chain: &mut Chain,
    record: &RoundRecord,
) -> Option<String> {
    let mut holders = assignments
        .iter()
        .filter(|(_, assigned)| assigned.as_str() == content)
        .map(|(name, _)| name);

    let first = holders.next()?.clone();
    let others = holders.count();
    if others > 0 {
        warn!(
            round = record.round_number,
            origin = %chain.origin,
            content,
            matches = others + 1,
            "ambiguous chain step, taking first match"
        );
        chain.ambiguous = true;
    }
    Some(first)
}
