//! Job permutation value type.

use crate::error::{FlowShopError, Result};
use crate::instance::ProblemInstance;

use super::trace::SlotTrace;

/// An ordering of job indices.
///
/// Constructing, cloning and comparing schedules never touches a
/// [`ProblemInstance`]; validation happens when a schedule is evaluated,
/// replayed, or used as a warm start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    sequence: Vec<usize>,
}

impl Schedule {
    /// Wraps an ordering of job indices.
    pub fn new(sequence: Vec<usize>) -> Self {
        Self { sequence }
    }

    /// The identity order `0, 1, ..., jobs - 1`.
    pub fn identity(jobs: usize) -> Self {
        Self::new((0..jobs).collect())
    }

    /// The job indices in processing order.
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    /// Number of jobs in the schedule.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns `true` if the schedule holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Consumes the schedule, returning the sequence.
    pub fn into_sequence(self) -> Vec<usize> {
        self.sequence
    }

    /// Returns `true` if this is a permutation of `0..jobs`.
    pub fn is_permutation_of(&self, jobs: usize) -> bool {
        self.sequence.len() == jobs && check_sequence(jobs, &self.sequence).is_ok()
    }

    /// Makespan of this schedule on `instance`.
    ///
    /// # Errors
    ///
    /// [`FlowShopError::InvalidSchedule`] on an out-of-range or repeated index.
    pub fn makespan(&self, instance: &ProblemInstance) -> Result<u64> {
        instance.evaluate(&self.sequence)
    }

    /// Replays this schedule into per-machine slots.
    ///
    /// # Errors
    ///
    /// [`FlowShopError::InvalidSchedule`] on an out-of-range or repeated index.
    pub fn replay(&self, instance: &ProblemInstance) -> Result<SlotTrace> {
        SlotTrace::replay(instance, self)
    }
}

impl From<Vec<usize>> for Schedule {
    fn from(sequence: Vec<usize>) -> Self {
        Self::new(sequence)
    }
}

impl AsRef<[usize]> for Schedule {
    fn as_ref(&self) -> &[usize] {
        &self.sequence
    }
}

/// Checks that every index is below `jobs` and appears at most once.
pub(crate) fn check_sequence(jobs: usize, sequence: &[usize]) -> Result<()> {
    let mut seen = vec![false; jobs];
    for (position, &job) in sequence.iter().enumerate() {
        if job >= jobs {
            return Err(FlowShopError::schedule(format!(
                "job {job} at position {position} is out of range (jobs = {jobs})"
            )));
        }
        if std::mem::replace(&mut seen[job], true) {
            return Err(FlowShopError::schedule(format!(
                "job {job} appears more than once (position {position})"
            )));
        }
    }
    Ok(())
}

/// Checks that `sequence` is a complete permutation of `0..jobs`.
pub(crate) fn check_permutation(jobs: usize, sequence: &[usize]) -> Result<()> {
    if sequence.len() != jobs {
        return Err(FlowShopError::schedule(format!(
            "expected a permutation of {jobs} jobs, got {} entries",
            sequence.len()
        )));
    }
    check_sequence(jobs, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let s = Schedule::identity(4);
        assert_eq!(s.sequence(), &[0, 1, 2, 3]);
        assert!(s.is_permutation_of(4));
        assert!(!s.is_permutation_of(5));
    }

    #[test]
    fn test_value_semantics() {
        let a = Schedule::from(vec![2, 0, 1]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Schedule::new(vec![0, 2, 1]));
        assert!(Schedule::default().is_empty());
    }

    #[test]
    fn test_check_sequence() {
        assert!(check_sequence(3, &[2, 0]).is_ok());
        assert!(check_sequence(3, &[]).is_ok());
        assert!(matches!(
            check_sequence(3, &[0, 3]),
            Err(FlowShopError::InvalidSchedule(_))
        ));
        assert!(matches!(
            check_sequence(3, &[1, 1]),
            Err(FlowShopError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_check_permutation_requires_all_jobs() {
        assert!(check_permutation(3, &[2, 0, 1]).is_ok());
        assert!(check_permutation(3, &[2, 0]).is_err());
        assert!(check_permutation(0, &[]).is_ok());
    }

    #[test]
    fn test_makespan_via_instance() {
        let inst = ProblemInstance::without_setup(vec![vec![3], vec![4]]).unwrap();
        assert_eq!(Schedule::new(vec![1, 0]).makespan(&inst).unwrap(), 7);
        assert!(Schedule::new(vec![1, 1]).makespan(&inst).is_err());
    }
}
