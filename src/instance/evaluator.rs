//! Makespan recurrence.
//!
//! For sequence position `p` and machine `k`:
//!
//! ```text
//! C(p, k) = max(C(p, k-1), C(p-1, k) + s_k(seq[p-1], seq[p])) + t(seq[p], k)
//! ```
//!
//! with `C(-1, *) = C(*, -1) = 0` and no setup at `p = 0`. Only the row
//! `C(p-1, *)` is needed to compute `C(p, *)`, so the sweep keeps a single
//! row of length `M` and overwrites it in place.
//!
//! # Reference
//!
//! Ruiz & Stützle (2008), "An Iterated Greedy heuristic for the
//! sequence dependent setup times flowshop problem with makespan and
//! weighted tardiness objectives", EJOR 187(3).

use super::types::ProblemInstance;

/// One operation visited by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Operation {
    pub machine: usize,
    pub job: usize,
    pub previous: Option<usize>,
    pub setup: u64,
    pub start: u64,
    pub end: u64,
}

/// Runs the recurrence over `sequence`, calling `visit` for every
/// (position, machine) pair in position-major order.
///
/// `row` must have length `instance.machine_count()`; its contents are
/// overwritten. Returns `C(L-1, M-1)`, or 0 for an empty sequence or an
/// instance without machines.
///
/// Indices in `sequence` are assumed valid.
pub(crate) fn sweep<F>(
    instance: &ProblemInstance,
    sequence: &[usize],
    row: &mut [u64],
    mut visit: F,
) -> u64
where
    F: FnMut(Operation),
{
    let machines = instance.machine_count();
    debug_assert_eq!(row.len(), machines);
    if sequence.is_empty() || machines == 0 {
        return 0;
    }

    row.fill(0);
    let mut previous: Option<usize> = None;

    for &job in sequence {
        let processing = instance.processing_row(job);
        // C(p, k-1)
        let mut upstream = 0u64;

        for (machine, slot) in row.iter_mut().enumerate() {
            let setup = match previous {
                Some(prev) => instance.setup_row(machine, prev)[job],
                None => 0,
            };
            let start = upstream.max(*slot + setup);
            let end = start + processing[machine];
            visit(Operation {
                machine,
                job,
                previous,
                setup,
                start,
                end,
            });
            *slot = end;
            upstream = end;
        }

        previous = Some(job);
    }

    row[machines - 1]
}

/// Reusable makespan evaluator.
///
/// Owns the scratch row of the recurrence so repeated evaluations in a
/// search loop do not allocate. Sequences passed to
/// [`makespan`](Self::makespan) are not validated; use
/// [`ProblemInstance::evaluate`] for untrusted input.
#[derive(Debug, Clone)]
pub struct MakespanEvaluator<'a> {
    instance: &'a ProblemInstance,
    row: Vec<u64>,
}

impl<'a> MakespanEvaluator<'a> {
    /// Creates an evaluator bound to `instance`.
    pub fn new(instance: &'a ProblemInstance) -> Self {
        Self {
            instance,
            row: vec![0; instance.machine_count()],
        }
    }

    /// The instance this evaluator reads from.
    pub fn instance(&self) -> &'a ProblemInstance {
        self.instance
    }

    /// Completion time of the last job of `sequence` on the last machine.
    ///
    /// Costs `O(L·M)` with no allocation.
    ///
    /// # Panics
    ///
    /// May panic if `sequence` contains an index `>= job_count()`.
    pub fn makespan(&mut self, sequence: &[usize]) -> u64 {
        sweep(self.instance, sequence, &mut self.row, |_| {})
    }
}
