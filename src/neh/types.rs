//! NEH result and progress event types.

use crate::schedule::Schedule;

/// Progress event emitted after each insertion round.
///
/// Borrows the partial sequence, so observers that need it past the
/// callback must copy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NehEvent<'a> {
    /// Number of jobs placed so far (1-based).
    pub step: usize,
    /// Job inserted in this round.
    pub job: usize,
    /// Position it was inserted at.
    pub position: usize,
    /// Makespan of the partial sequence after insertion.
    pub makespan: u64,
    /// Previous round's makespan minus this one; 0 on the first round.
    /// Usually negative, since every insertion adds work.
    pub delta: i64,
    /// The partial sequence after insertion.
    pub sequence: &'a [usize],
}

/// Result of an NEH construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NehResult {
    /// The constructed permutation.
    pub schedule: Schedule,
    /// Its makespan.
    pub makespan: u64,
}
