//! NEH insertion loop.
//!
//! # Algorithm
//!
//! 1. Order jobs by total processing time, descending (ties: lower index first)
//! 2. Start from the first job alone
//! 3. For each remaining job, try every insertion position of the partial
//!    sequence and keep the one with the smallest makespan (ties: the
//!    earliest position)
//!
//! Every candidate is evaluated with the full recurrence, so a run costs
//! `O(N³·M)`: `N` rounds, up to `N` positions each, `O(N·M)` per
//! evaluation. The candidate buffer is reused across evaluations.
//!
//! # Reference
//!
//! Nawaz, Enscore & Ham (1983), "A heuristic algorithm for the m-machine,
//! n-job flow-shop sequencing problem", *Omega* 11(1), 91-95.

use tracing::{debug, trace};

use super::types::{NehEvent, NehResult};
use crate::instance::{MakespanEvaluator, ProblemInstance};
use crate::schedule::Schedule;

/// Executes the NEH constructive heuristic.
pub struct NehRunner;

impl NehRunner {
    /// Builds a permutation for `instance`.
    ///
    /// Deterministic: the same instance always yields the same schedule.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_flowshop::{NehRunner, ProblemInstance};
    ///
    /// let instance = ProblemInstance::without_setup(vec![vec![4, 3], vec![2, 5], vec![6, 1]]).unwrap();
    /// let result = NehRunner::run(&instance);
    /// assert_eq!(result.makespan, 13);
    /// ```
    pub fn run(instance: &ProblemInstance) -> NehResult {
        Self::run_with_observer(instance, |_| {})
    }

    /// Builds a permutation, reporting every insertion round to `observer`.
    pub fn run_with_observer<F>(instance: &ProblemInstance, mut observer: F) -> NehResult
    where
        F: FnMut(&NehEvent<'_>),
    {
        let jobs = instance.job_count();
        debug!(jobs, machines = instance.machine_count(), "NEH started");

        let order = priority_order(instance);
        let mut evaluator = MakespanEvaluator::new(instance);
        let mut sequence: Vec<usize> = Vec::with_capacity(jobs);
        let mut candidate: Vec<usize> = Vec::with_capacity(jobs);
        let mut makespan = 0;

        for (round, &job) in order.iter().enumerate() {
            let mut best_position = 0;
            let mut best_makespan = u64::MAX;

            for position in 0..=sequence.len() {
                candidate.clear();
                candidate.extend_from_slice(&sequence[..position]);
                candidate.push(job);
                candidate.extend_from_slice(&sequence[position..]);

                let cost = evaluator.makespan(&candidate);
                if cost < best_makespan {
                    best_makespan = cost;
                    best_position = position;
                }
            }

            sequence.insert(best_position, job);
            let delta = if round == 0 {
                0
            } else {
                signed_gap(makespan, best_makespan)
            };
            makespan = best_makespan;

            trace!(job, position = best_position, makespan, delta, "NEH insertion");
            observer(&NehEvent {
                step: round + 1,
                job,
                position: best_position,
                makespan,
                delta,
                sequence: &sequence,
            });
        }

        debug!(makespan, "NEH finished");
        NehResult {
            schedule: Schedule::new(sequence),
            makespan,
        }
    }
}

/// `from - to`, saturated to the `i64` range.
fn signed_gap(from: u64, to: u64) -> i64 {
    let gap = i128::from(from) - i128::from(to);
    i64::try_from(gap).unwrap_or(if gap < 0 { i64::MIN } else { i64::MAX })
}

/// Jobs sorted by total processing time, descending; ties by ascending index.
pub fn priority_order(instance: &ProblemInstance) -> Vec<usize> {
    let totals: Vec<u64> = (0..instance.job_count())
        .map(|job| instance.total_processing_time(job))
        .collect();
    let mut order: Vec<usize> = (0..instance.job_count()).collect();
    order.sort_by(|&a, &b| totals[b].cmp(&totals[a]).then(a.cmp(&b)));
    order
}
