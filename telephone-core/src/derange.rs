//! Derangement generation.
//!
//! Every distribution point in a round hands each participant something
//! another participant made. That is a permutation with no fixed point.
//! Owners are tracked by position: [`derange_owners`] works on indices so
//! two participants writing the same text never look like self-assignment.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on shuffle attempts before a derangement is declared impossible.
pub const MAX_ATTEMPTS: usize = 64;

/// Errors from derangement generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerangeError {
    #[error("Cannot derange {0} item(s): at least 2 are required")]
    TooFew(usize),

    #[error("No derangement found after {0} attempts")]
    Exhausted(usize),
}

/// How a derangement is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DerangePolicy {
    /// Uniform shuffles, retried until no element stays in place.
    #[default]
    Random,
    /// Shift every element one position to the left.
    ///
    /// Deterministic and O(n), but everyone can predict who gets what.
    Rotate,
}

/// Pick, for each owner `i`, the owner whose contribution `i` receives.
///
/// The result `source` satisfies `source[i] != i` for every `i` and is a
/// permutation of `0..n`.
pub fn derange_owners<R: Rng + ?Sized>(
    n: usize,
    policy: DerangePolicy,
    rng: &mut R,
) -> Result<Vec<usize>, DerangeError> {
    if n < 2 {
        return Err(DerangeError::TooFew(n));
    }

    match policy {
        DerangePolicy::Rotate => Ok((0..n).map(|i| (i + 1) % n).collect()),
        DerangePolicy::Random => {
            let mut source: Vec<usize> = (0..n).collect();
            for _ in 0..MAX_ATTEMPTS {
                source.shuffle(rng);
                if source.iter().enumerate().all(|(i, &s)| s != i) {
                    return Ok(source);
                }
            }
            Err(DerangeError::Exhausted(MAX_ATTEMPTS))
        }
    }
}

/// Derange a sequence by value using the thread-local RNG.
pub fn derange<T: Clone + PartialEq>(items: &[T]) -> Result<Vec<T>, DerangeError> {
    derange_with_rng(items, DerangePolicy::Random, &mut rand::thread_rng())
}

/// Derange a sequence by value with a specific policy and RNG.
///
/// Unlike [`derange_owners`], the no-fixed-point check compares values, so
/// a sequence whose elements are all equal can never be deranged and fails
/// with [`DerangeError::Exhausted`].
pub fn derange_with_rng<T, R>(
    items: &[T],
    policy: DerangePolicy,
    rng: &mut R,
) -> Result<Vec<T>, DerangeError>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    if items.len() < 2 {
        return Err(DerangeError::TooFew(items.len()));
    }

    // Equal values count as a fixed point, which also rules out equal indices.
    let accepted = |source: &[usize]| {
        source
            .iter()
            .enumerate()
            .all(|(i, &s)| items[s] != items[i])
    };
    let take = |source: &[usize]| -> Vec<T> { source.iter().map(|&s| items[s].clone()).collect() };

    match policy {
        DerangePolicy::Rotate => {
            let source = derange_owners(items.len(), policy, rng)?;
            if accepted(&source) {
                Ok(take(&source))
            } else {
                Err(DerangeError::Exhausted(1))
            }
        }
        DerangePolicy::Random => {
            let mut source: Vec<usize> = (0..items.len()).collect();
            for _ in 0..MAX_ATTEMPTS {
                source.shuffle(rng);
                if accepted(&source) {
                    return Ok(take(&source));
                }
            }
            Err(DerangeError::Exhausted(MAX_ATTEMPTS))
        }
    }
}
