//! Annealing execution loop.
//!
//! Both variants share one primitive: swap two uniformly drawn positions,
//! re-evaluate, apply the Metropolis criterion, and undo the swap on
//! rejection. The temperature is multiplied by the cooling factor after
//! every iteration, accepted or not.
//!
//! The adaptive variant first runs a calibration walk (every move
//! accepted) to measure the typical makespan change, then derives the
//! starting temperature and cooling factor from it and anneals from the
//! original starting sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, trace};

use super::config::{require_seed, AdaptiveConfig, AdaptiveConstants, AnnealConfig};
use super::types::{AnnealEvent, AnnealResult, Calibration};
use crate::error::Result;
use crate::instance::{MakespanEvaluator, ProblemInstance};
use crate::random::{create_rng, random_permutation};
use crate::schedule::{check_permutation, Schedule};

/// Best makespan is sampled into the history every this many iterations.
const HISTORY_INTERVAL: usize = 100;

/// Executes simulated annealing on a flow-shop instance.
pub struct AnnealRunner;

impl AnnealRunner {
    /// Runs the standard variant.
    ///
    /// `warm_start` must be a complete permutation; `None` or an empty
    /// schedule starts from a seeded random permutation.
    ///
    /// # Errors
    ///
    /// - [`crate::FlowShopError::InvalidConfig`] if the config is invalid
    ///   (including a missing seed)
    /// - [`crate::FlowShopError::InvalidSchedule`] if the warm start is not a
    ///   permutation of the instance's jobs
    ///
    /// # Examples
    ///
    /// ```
    /// use u_flowshop::{AnnealConfig, AnnealRunner, NehRunner, ProblemInstance};
    ///
    /// let instance = ProblemInstance::without_setup(vec![vec![4, 3], vec![2, 5], vec![6, 1]]).unwrap();
    /// let neh = NehRunner::run(&instance);
    /// let config = AnnealConfig::default().with_iterations(1_000).with_seed(1);
    /// let result = AnnealRunner::run(&instance, Some(&neh.schedule), &config).unwrap();
    /// assert!(result.makespan <= neh.makespan);
    /// ```
    pub fn run(
        instance: &ProblemInstance,
        warm_start: Option<&Schedule>,
        config: &AnnealConfig,
    ) -> Result<AnnealResult> {
        Self::run_with_observer(instance, warm_start, config, None, |_| {})
    }

    /// Runs the standard variant with an optional cancellation flag.
    pub fn run_with_cancel(
        instance: &ProblemInstance,
        warm_start: Option<&Schedule>,
        config: &AnnealConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult> {
        Self::run_with_observer(instance, warm_start, config, cancel, |_| {})
    }

    /// Runs the standard variant, reporting progress to `observer`.
    pub fn run_with_observer<F>(
        instance: &ProblemInstance,
        warm_start: Option<&Schedule>,
        config: &AnnealConfig,
        cancel: Option<Arc<AtomicBool>>,
        mut observer: F,
    ) -> Result<AnnealResult>
    where
        F: FnMut(&AnnealEvent),
    {
        config.validate()?;
        let mut rng = create_rng(require_seed(config.seed)?);
        let initial = initial_sequence(instance, warm_start, &mut rng)?;

        let mut walk = Walk::new(instance, initial);
        debug!(
            jobs = instance.job_count(),
            machines = instance.machine_count(),
            initial_makespan = walk.current_makespan,
            temperature = config.initial_temperature,
            "annealing started"
        );

        let cooling = Cooling {
            temperature: config.initial_temperature,
            factor: config.cooling_factor,
            late: None,
        };
        let outcome = anneal(
            &mut walk,
            &mut rng,
            cooling,
            config.iterations,
            cancel.as_deref(),
            &mut observer,
        );

        debug!(makespan = walk.best_makespan, cancelled = outcome.cancelled, "annealing finished");
        Ok(walk.finish(outcome, None))
    }

    /// Runs the adaptive-temperature variant.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_adaptive(
        instance: &ProblemInstance,
        warm_start: Option<&Schedule>,
        config: &AdaptiveConfig,
    ) -> Result<AnnealResult> {
        Self::run_adaptive_with_observer(instance, warm_start, config, None, |_| {})
    }

    /// Runs the adaptive variant, reporting progress to `observer`.
    ///
    /// The observer receives one [`AnnealEvent::Calibrated`] before the
    /// optimization phase starts (unless the instance has no jobs).
    pub fn run_adaptive_with_observer<F>(
        instance: &ProblemInstance,
        warm_start: Option<&Schedule>,
        config: &AdaptiveConfig,
        cancel: Option<Arc<AtomicBool>>,
        mut observer: F,
    ) -> Result<AnnealResult>
    where
        F: FnMut(&AnnealEvent),
    {
        config.validate()?;
        let mut rng = create_rng(require_seed(config.seed)?);
        let initial = initial_sequence(instance, warm_start, &mut rng)?;

        let mut walk = Walk::new(instance, initial);
        if walk.current.is_empty() {
            let outcome = LoopOutcome::idle(0.0, walk.best_makespan);
            return Ok(walk.finish(outcome, None));
        }

        let calibration = calibrate(
            instance,
            &walk.current,
            walk.current_makespan,
            config.iterations,
            &config.constants,
            &mut rng,
        );
        debug!(
            jobs = instance.job_count(),
            initial_makespan = walk.current_makespan,
            average_step = calibration.average_step,
            temperature = calibration.initial_temperature,
            cooling = calibration.cooling_factor,
            "adaptive annealing calibrated"
        );
        observer(&AnnealEvent::Calibrated(calibration));

        let cooling = Cooling {
            temperature: calibration.initial_temperature,
            factor: calibration.cooling_factor,
            late: config.constants.late_decay.map(|decay| LateDecay {
                after: config.iterations as f64 * config.constants.cooling_span,
                decay,
            }),
        };
        let outcome = anneal(
            &mut walk,
            &mut rng,
            cooling,
            config.iterations,
            cancel.as_deref(),
            &mut observer,
        );

        debug!(makespan = walk.best_makespan, cancelled = outcome.cancelled, "adaptive annealing finished");
        Ok(walk.finish(outcome, Some(calibration)))
    }
}

/// Resolves the starting sequence: the warm start if given, otherwise a
/// seeded random permutation.
fn initial_sequence<R: Rng>(
    instance: &ProblemInstance,
    warm_start: Option<&Schedule>,
    rng: &mut R,
) -> Result<Vec<usize>> {
    match warm_start {
        Some(schedule) if !schedule.is_empty() => {
            check_permutation(instance.job_count(), schedule.sequence())?;
            Ok(schedule.sequence().to_vec())
        }
        _ => Ok(random_permutation(instance.job_count(), rng)),
    }
}

/// Estimates the starting temperature and cooling factor from a random walk
/// that accepts every move.
fn calibrate<R: Rng>(
    instance: &ProblemInstance,
    initial: &[usize],
    initial_makespan: u64,
    iterations: usize,
    constants: &AdaptiveConstants,
    rng: &mut R,
) -> Calibration {
    let stats_iterations = (iterations / constants.stats_divisor).max(1);
    let mut probe = Walk::new(instance, initial.to_vec());
    debug_assert_eq!(probe.current_makespan, initial_makespan);

    let mut total_change = 0u64;
    for _ in 0..stats_iterations {
        let previous = probe.current_makespan;
        let candidate = probe.propose(rng);
        total_change = total_change.saturating_add(candidate.makespan.abs_diff(previous));
        probe.current_makespan = candidate.makespan;
    }

    let average_step = (total_change / stats_iterations as u64 / constants.step_damping).max(1);
    let log_initial = constants.initial_acceptance.ln();
    let initial_temperature = -(average_step as f64) / log_initial;
    let cooling_factor = (log_initial / constants.final_acceptance.ln())
        .powf(1.0 / (iterations as f64 * constants.cooling_span));

    Calibration {
        stats_iterations,
        average_step,
        initial_temperature,
        cooling_factor,
    }
}

/// Metropolis criterion. Always draws for non-improving moves so the
/// random stream does not depend on the temperature.
fn metropolis<R: Rng>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    if delta < 0.0 {
        return true;
    }
    let probability = if temperature > 0.0 {
        (-delta / temperature).exp()
    } else if delta == 0.0 {
        1.0
    } else {
        0.0
    };
    rng.random_range(0.0..1.0) < probability
}

#[derive(Debug, Clone, Copy)]
struct LateDecay {
    /// Iteration index past which the decay applies.
    after: f64,
    decay: f64,
}

#[derive(Debug, Clone, Copy)]
struct Cooling {
    temperature: f64,
    factor: f64,
    late: Option<LateDecay>,
}

impl Cooling {
    fn step(&mut self, iteration: usize) {
        self.temperature *= self.factor;
        if let Some(late) = self.late {
            if iteration as f64 > late.after {
                self.factor *= late.decay;
            }
        }
    }
}

/// A swap applied to the current sequence, pending acceptance.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    first: usize,
    second: usize,
    makespan: u64,
}

/// Mutable search state: one sequence buffer plus the best seen so far.
struct Walk<'a> {
    evaluator: MakespanEvaluator<'a>,
    current: Vec<usize>,
    current_makespan: u64,
    best: Vec<usize>,
    best_makespan: u64,
    initial_makespan: u64,
}

impl<'a> Walk<'a> {
    fn new(instance: &'a ProblemInstance, sequence: Vec<usize>) -> Self {
        let mut evaluator = MakespanEvaluator::new(instance);
        let makespan = evaluator.makespan(&sequence);
        Self {
            evaluator,
            best: sequence.clone(),
            current: sequence,
            current_makespan: makespan,
            best_makespan: makespan,
            initial_makespan: makespan,
        }
    }

    /// Swaps two random positions in place and evaluates the result.
    fn propose<R: Rng>(&mut self, rng: &mut R) -> Candidate {
        let n = self.current.len();
        let first = rng.random_range(0..n);
        let second = rng.random_range(0..n);
        self.current.swap(first, second);
        Candidate {
            first,
            second,
            makespan: self.evaluator.makespan(&self.current),
        }
    }

    /// Keeps the swap. Returns `true` if it set a new best.
    fn accept(&mut self, candidate: Candidate) -> bool {
        self.current_makespan = candidate.makespan;
        if candidate.makespan < self.best_makespan {
            self.best.clone_from(&self.current);
            self.best_makespan = candidate.makespan;
            true
        } else {
            false
        }
    }

    fn reject(&mut self, candidate: Candidate) {
        self.current.swap(candidate.first, candidate.second);
    }

    fn finish(self, outcome: LoopOutcome, calibration: Option<Calibration>) -> AnnealResult {
        AnnealResult {
            schedule: Schedule::new(self.best),
            makespan: self.best_makespan,
            initial_makespan: self.initial_makespan,
            iterations: outcome.iterations,
            accepted_moves: outcome.accepted_moves,
            improving_moves: outcome.improving_moves,
            final_temperature: outcome.final_temperature,
            cancelled: outcome.cancelled,
            best_history: outcome.best_history,
            calibration,
        }
    }
}

struct LoopOutcome {
    iterations: usize,
    accepted_moves: usize,
    improving_moves: usize,
    final_temperature: f64,
    cancelled: bool,
    best_history: Vec<u64>,
}

impl LoopOutcome {
    fn idle(temperature: f64, best_makespan: u64) -> Self {
        Self {
            iterations: 0,
            accepted_moves: 0,
            improving_moves: 0,
            final_temperature: temperature,
            cancelled: false,
            best_history: vec![best_makespan],
        }
    }
}

fn anneal<R, F>(
    walk: &mut Walk<'_>,
    rng: &mut R,
    mut cooling: Cooling,
    iterations: usize,
    cancel: Option<&AtomicBool>,
    observer: &mut F,
) -> LoopOutcome
where
    R: Rng,
    F: FnMut(&AnnealEvent),
{
    let mut outcome = LoopOutcome::idle(cooling.temperature, walk.best_makespan);
    if walk.current.is_empty() {
        return outcome;
    }

    for iteration in 0..iterations {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            outcome.cancelled = true;
            break;
        }

        let candidate = walk.propose(rng);
        let delta = candidate.makespan as f64 - walk.current_makespan as f64;

        if metropolis(delta, cooling.temperature, rng) {
            outcome.accepted_moves += 1;
            if delta < 0.0 {
                outcome.improving_moves += 1;
            }
            if walk.accept(candidate) {
                trace!(iteration, makespan = walk.best_makespan, "new best");
                observer(&AnnealEvent::NewBest {
                    iteration,
                    makespan: walk.best_makespan,
                    temperature: cooling.temperature,
                });
            }
        } else {
            walk.reject(candidate);
        }

        cooling.step(iteration);
        outcome.iterations += 1;

        if outcome.iterations % HISTORY_INTERVAL == 0 {
            outcome.best_history.push(walk.best_makespan);
        }
    }

    if outcome.best_history.last() != Some(&walk.best_makespan) {
        outcome.best_history.push(walk.best_makespan);
    }
    outcome.final_temperature = cooling.temperature;
    outcome
}
