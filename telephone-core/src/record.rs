//! Round records and the append-only game history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Placeholder drawn when text distribution failed.
pub const NO_PROMPT: &str = "No prompt";
/// Placeholder for a drawing that was never produced or could not be handed out.
pub const NO_DRAWING: &str = "No drawing";
/// Placeholder for a guess that was never produced.
pub const NO_GUESS: &str = "No guess";
/// Placeholder for a round-one text that was never produced.
pub const NO_TEXT: &str = "No text";

/// Whether a content value is one of the well-known placeholders.
pub fn is_sentinel(content: &str) -> bool {
    matches!(content, NO_PROMPT | NO_DRAWING | NO_GUESS | NO_TEXT)
}

/// Everything that happened in one round, keyed by participant name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number.
    #[serde(rename = "round")]
    pub round_number: u32,

    /// Text each participant wrote (an original prompt in round 1, a guess afterwards).
    pub texts: BTreeMap<String, String>,

    /// Text each participant was handed to draw.
    pub draw_assignments: BTreeMap<String, String>,

    /// Drawing each participant was handed to guess. Empty in round 1.
    #[serde(default)]
    pub guess_assignments: BTreeMap<String, String>,

    /// Drawing reference each participant produced.
    pub drawings: BTreeMap<String, String>,
}

impl RoundRecord {
    /// An empty record for the given round.
    pub fn new(round_number: u32) -> Self {
        Self {
            round_number,
            ..Default::default()
        }
    }
}

impl fmt::Display for RoundRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Round {}:", self.round_number)?;
        write_section(f, "Texts", &self.texts)?;
        if !self.guess_assignments.is_empty() {
            write_section(f, "Guess Assignments", &self.guess_assignments)?;
        }
        write_section(f, "Draw Assignments", &self.draw_assignments)?;
        write_section(f, "Drawings", &self.drawings)
    }
}

fn write_section(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    entries: &BTreeMap<String, String>,
) -> fmt::Result {
    writeln!(f, "{title}:")?;
    for (name, value) in entries {
        writeln!(f, "  {name}: {value}")?;
    }
    Ok(())
}

/// Errors from appending to a [`History`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("Expected round {expected}, got round {found}")]
    OutOfOrder { expected: u32, found: u32 },
}

/// Append-only sequence of completed rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    rounds: Vec<RoundRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finished round. Rounds must arrive in order starting at 1.
    pub fn push(&mut self, record: RoundRecord) -> Result<(), HistoryError> {
        let expected = self.next_round();
        if record.round_number != expected {
            return Err(HistoryError::OutOfOrder {
                expected,
                found: record.round_number,
            });
        }
        self.rounds.push(record);
        Ok(())
    }

    /// Rebuild a history from records, checking their order.
    pub fn from_records(records: Vec<RoundRecord>) -> Result<Self, HistoryError> {
        let mut history = Self::new();
        for record in records {
            history.push(record)?;
        }
        Ok(history)
    }

    /// Number of the round that would be appended next.
    pub fn next_round(&self) -> u32 {
        self.rounds.len() as u32 + 1
    }

    /// Record for a 1-based round number.
    pub fn round(&self, round_number: u32) -> Option<&RoundRecord> {
        let index = (round_number as usize).checked_sub(1)?;
        self.rounds.get(index)
    }

    pub fn last(&self) -> Option<&RoundRecord> {
        self.rounds.last()
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoundRecord> {
        self.rounds.iter()
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a RoundRecord;
    type IntoIter = std::slice::Iter<'a, RoundRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rounds.iter()
    }
}
