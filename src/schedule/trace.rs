//! Slot-trace replay for visualization.
//!
//! A [`SlotTrace`] is a projection of a [`Schedule`] through the makespan
//! recurrence: the start, end and setup of every operation, grouped by
//! machine. It is recomputed on demand and never used inside a search loop.

use crate::error::Result;
use crate::instance::evaluator::sweep;
use crate::instance::ProblemInstance;

use super::types::{check_sequence, Schedule};

/// One operation on a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotOperation {
    /// Job processed in this slot.
    pub job: usize,
    /// Job processed just before on the same machine, if any.
    pub previous_job: Option<usize>,
    /// Changeover applied before this operation.
    pub setup: u64,
    /// Processing start.
    pub start: u64,
    /// Processing end.
    pub end: u64,
}

/// Flat visualizer record: a [`SlotOperation`] tagged with its machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotRecord {
    /// Machine index.
    pub machine: usize,
    /// Job processed just before on the same machine, if any.
    pub previous_job: Option<usize>,
    /// Job processed in this slot.
    pub job: usize,
    /// Changeover applied before this operation.
    pub setup: u64,
    /// Processing start.
    pub start: u64,
    /// Processing end.
    pub end: u64,
}

/// Per-machine operation lists for a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotTrace {
    machines: Vec<Vec<SlotOperation>>,
    makespan: u64,
}

impl SlotTrace {
    /// Replays `schedule` on `instance`.
    ///
    /// # Errors
    ///
    /// [`crate::FlowShopError::InvalidSchedule`] on an out-of-range or
    /// repeated index.
    pub fn replay(instance: &ProblemInstance, schedule: &Schedule) -> Result<Self> {
        Self::replay_sequence(instance, schedule.sequence())
    }

    /// Replays a raw, possibly partial, job sequence.
    ///
    /// # Errors
    ///
    /// Same as [`replay`](Self::replay).
    pub fn replay_sequence(instance: &ProblemInstance, sequence: &[usize]) -> Result<Self> {
        check_sequence(instance.job_count(), sequence)?;

        let machine_count = instance.machine_count();
        let mut machines: Vec<Vec<SlotOperation>> = (0..machine_count)
            .map(|_| Vec::with_capacity(sequence.len()))
            .collect();
        let mut row = vec![0; machine_count];

        let makespan = sweep(instance, sequence, &mut row, |op| {
            machines[op.machine].push(SlotOperation {
                job: op.job,
                previous_job: op.previous,
                setup: op.setup,
                start: op.start,
                end: op.end,
            });
        });

        Ok(Self { machines, makespan })
    }

    /// Number of machines covered.
    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }

    /// Operations on `machine` in sequence order.
    ///
    /// # Panics
    ///
    /// Panics if `machine` is out of range.
    pub fn machine(&self, machine: usize) -> &[SlotOperation] {
        &self.machines[machine]
    }

    /// Operation lists for all machines.
    pub fn machines(&self) -> &[Vec<SlotOperation>] {
        &self.machines
    }

    /// Makespan of the replayed schedule.
    pub fn makespan(&self) -> u64 {
        self.makespan
    }

    /// Flat records in machine-major order.
    pub fn records(&self) -> impl Iterator<Item = SlotRecord> + '_ {
        self.machines
            .iter()
            .enumerate()
            .flat_map(|(machine, ops)| {
                ops.iter().map(move |op| SlotRecord {
                    machine,
                    previous_job: op.previous_job,
                    job: op.job,
                    setup: op.setup,
                    start: op.start,
                    end: op.end,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> ProblemInstance {
        ProblemInstance::new(
            2,
            2,
            vec![vec![3, 2], vec![1, 4]],
            vec![
                vec![vec![0, 2], vec![5, 0]],
                vec![vec![0, 1], vec![1, 0]],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_replay_slots() {
        let inst = instance();
        let trace = Schedule::new(vec![0, 1]).replay(&inst).unwrap();

        assert_eq!(trace.machine_count(), 2);
        assert_eq!(
            trace.machine(0),
            &[
                SlotOperation { job: 0, previous_job: None, setup: 0, start: 0, end: 3 },
                SlotOperation { job: 1, previous_job: Some(0), setup: 2, start: 5, end: 6 },
            ]
        );
        // machine 1: job 0 [3,5]; job 1 waits for max(6, 5 + 1) = 6
        assert_eq!(
            trace.machine(1),
            &[
                SlotOperation { job: 0, previous_job: None, setup: 0, start: 3, end: 5 },
                SlotOperation { job: 1, previous_job: Some(0), setup: 1, start: 6, end: 10 },
            ]
        );
        assert_eq!(trace.makespan(), 10);
        assert_eq!(trace.makespan(), inst.evaluate(&[0, 1]).unwrap());
    }

    #[test]
    fn test_records_machine_major() {
        let inst = instance();
        let trace = Schedule::new(vec![1, 0]).replay(&inst).unwrap();
        let records: Vec<_> = trace.records().collect();
        assert_eq!(records.len(), 4);
        assert_eq!(
            records.iter().map(|r| (r.machine, r.job)).collect::<Vec<_>>(),
            vec![(0, 1), (0, 0), (1, 1), (1, 0)]
        );
        assert_eq!(records[1].previous_job, Some(1));
        assert_eq!(records[1].setup, 5);
    }

    #[test]
    fn test_replay_empty() {
        let inst = instance();
        let trace = Schedule::default().replay(&inst).unwrap();
        assert_eq!(trace.makespan(), 0);
        assert!(trace.machines().iter().all(Vec::is_empty));
    }

    #[test]
    fn test_replay_rejects_duplicate() {
        assert!(Schedule::new(vec![0, 0]).replay(&instance()).is_err());
    }
}
