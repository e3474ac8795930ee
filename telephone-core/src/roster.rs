//! The fixed set of participants in a game.

use crate::backend::file_stem;
use crate::participant::{Participant, ParticipantKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Fewest participants for which nobody has to receive their own work.
pub const MIN_PARTICIPANTS: usize = 3;

/// Errors from building a roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("The game requires at least 3 players to avoid self-assignment, got {0}")]
    TooFew(usize),

    #[error("Duplicate player name: {0}")]
    DuplicateName(String),

    #[error("Player names must not be empty")]
    EmptyName,

    #[error("Player names {first:?} and {second:?} would share drawing files")]
    FileNameClash { first: String, second: String },
}

/// Ordered, validated list of participants.
#[derive(Clone)]
pub struct Roster {
    participants: Vec<Arc<dyn Participant>>,
}

impl Roster {
    /// Validate and build a roster.
    pub fn new(participants: Vec<Arc<dyn Participant>>) -> Result<Self, RosterError> {
        if participants.len() < MIN_PARTICIPANTS {
            return Err(RosterError::TooFew(participants.len()));
        }

        // Keyed by file stem, so exact duplicates show up here too.
        let mut stems: HashMap<String, &str> = HashMap::new();
        for participant in &participants {
            let name = participant.name();
            if name.trim().is_empty() {
                return Err(RosterError::EmptyName);
            }
            if let Some(first) = stems.insert(file_stem(name), name) {
                if first == name {
                    return Err(RosterError::DuplicateName(name.to_string()));
                }
                return Err(RosterError::FileNameClash {
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
        }

        Ok(Self { participants })
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn Participant>> {
        self.participants.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn Participant>> {
        self.participants.iter()
    }

    /// Participant names in roster order.
    pub fn names(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name().to_string()).collect()
    }

    /// Names paired with their kind, in roster order.
    pub fn summary(&self) -> Vec<(String, ParticipantKind)> {
        self.participants
            .iter()
            .map(|p| (p.name().to_string(), p.kind()))
            .collect()
    }
}

impl fmt::Debug for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl fmt::Display for Roster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for participant in &self.participants {
            writeln!(f, "- {} ({})", participant.name(), participant.kind())?;
        }
        Ok(())
    }
}

/// Name for the `n`th automated player (1-based).
pub fn bot_name(n: usize) -> String {
    format!("AI Bot {n}")
}

/// Incrementally assembles a roster, topping it up with automated players.
pub struct RosterBuilder<F> {
    participants: Vec<Arc<dyn Participant>>,
    make_bot: F,
    bots: usize,
}

impl<F> RosterBuilder<F>
where
    F: FnMut(String) -> Arc<dyn Participant>,
{
    /// `make_bot` builds an automated participant from its name.
    pub fn new(make_bot: F) -> Self {
        Self {
            participants: Vec::new(),
            make_bot,
            bots: 0,
        }
    }

    pub fn with_participant(mut self, participant: Arc<dyn Participant>) -> Self {
        self.participants.push(participant);
        self
    }

    /// Add `count` automated players named `AI Bot 1`, `AI Bot 2`, ...
    pub fn with_bots(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.push_bot();
        }
        self
    }

    /// Add automated players until the minimum size is reached.
    ///
    /// Returns the names of the players that were added.
    pub fn fill_to_minimum(&mut self) -> Vec<String> {
        let mut added = Vec::new();
        while self.participants.len() < MIN_PARTICIPANTS {
            added.push(self.push_bot());
        }
        added
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn build(self) -> Result<Roster, RosterError> {
        Roster::new(self.participants)
    }

    fn push_bot(&mut self) -> String {
        // Skip numbers whose file stem someone already took.
        let name = loop {
            self.bots += 1;
            let candidate = bot_name(self.bots);
            let stem = file_stem(&candidate);
            if !self.participants.iter().any(|p| file_stem(p.name()) == stem) {
                break candidate;
            }
        };
        self.participants.push((self.make_bot)(name.clone()));
        name
    }
}
