//! Stage chaining: NEH followed by one or more annealing passes.
//!
//! Each stage consumes the previous stage's schedule as its warm start.
//! NEH always builds from scratch.

use std::time::{Duration, Instant};

use tracing::info;

use crate::error::{FlowShopError, Result};
use crate::instance::ProblemInstance;
use crate::neh::{NehEvent, NehRunner};
use crate::sa::{AdaptiveConfig, AnnealConfig, AnnealEvent, AnnealRunner};
use crate::schedule::Schedule;

/// One solver stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    /// NEH construction.
    Neh,
    /// Standard annealing.
    Anneal(AnnealConfig),
    /// Adaptive-temperature annealing.
    AdaptiveAnneal(AdaptiveConfig),
}

impl Stage {
    /// Short machine-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Neh => "neh",
            Stage::Anneal(_) => "simulated_annealing",
            Stage::AdaptiveAnneal(_) => "adaptive_sa",
        }
    }

    /// Prefix used on result lines (`NEH_RESULT`, `SA_RESULT`, ...).
    pub fn result_prefix(&self) -> &'static str {
        match self {
            Stage::Neh => "NEH",
            Stage::Anneal(_) => "SA",
            Stage::AdaptiveAnneal(_) => "ASA",
        }
    }
}

/// Summary of one finished stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    /// Stage name, see [`Stage::name`].
    pub stage: &'static str,
    /// Makespan of the stage's output.
    pub makespan: u64,
    /// Wall-clock time spent in the stage.
    pub elapsed: Duration,
}

/// Progress reported while a pipeline runs.
#[derive(Debug)]
pub enum PipelineEvent<'a> {
    /// NEH insertion round.
    Neh(&'a NehEvent<'a>),
    /// Annealing progress of the stage at `index`.
    Anneal {
        index: usize,
        event: &'a AnnealEvent,
    },
    /// A stage finished with `schedule`.
    StageFinished {
        index: usize,
        stage: &'a Stage,
        report: &'a StageReport,
        schedule: &'a Schedule,
    },
}

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Output of the last stage.
    pub schedule: Schedule,
    /// Its makespan.
    pub makespan: u64,
    /// One report per stage, in execution order.
    pub stages: Vec<StageReport>,
}

/// An ordered list of stages.
///
/// # Examples
///
/// ```
/// use u_flowshop::{AdaptiveConfig, Pipeline, ProblemInstance, Stage};
///
/// let instance = ProblemInstance::without_setup(vec![vec![4, 3], vec![2, 5], vec![6, 1]]).unwrap();
/// let result = Pipeline::new()
///     .with_stage(Stage::Neh)
///     .with_stage(Stage::AdaptiveAnneal(AdaptiveConfig::default().with_iterations(500).with_seed(1)))
///     .run(&instance)
///     .unwrap();
/// assert_eq!(result.makespan, 13);
/// assert_eq!(result.stages.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Runs every stage in order.
    ///
    /// # Errors
    ///
    /// [`FlowShopError::InvalidConfig`] for an empty pipeline, otherwise the
    /// first error raised by a stage.
    pub fn run(&self, instance: &ProblemInstance) -> Result<PipelineResult> {
        self.run_with_observer(instance, |_| {})
    }

    /// Runs every stage in order, reporting progress to `observer`.
    pub fn run_with_observer<F>(
        &self,
        instance: &ProblemInstance,
        mut observer: F,
    ) -> Result<PipelineResult>
    where
        F: FnMut(PipelineEvent<'_>),
    {
        if self.stages.is_empty() {
            return Err(FlowShopError::config("pipeline has no stages"));
        }

        let mut current: Option<(Schedule, u64)> = None;
        let mut reports = Vec::with_capacity(self.stages.len());

        for (index, stage) in self.stages.iter().enumerate() {
            let warm_start = current.as_ref().map(|(schedule, _)| schedule);
            match warm_start {
                Some(_) => info!(stage = stage.name(), "stage started from previous schedule"),
                None => info!(stage = stage.name(), "stage started"),
            }

            let started = Instant::now();
            let (schedule, makespan) = match stage {
                Stage::Neh => {
                    let result =
                        NehRunner::run_with_observer(instance, |e| observer(PipelineEvent::Neh(e)));
                    (result.schedule, result.makespan)
                }
                Stage::Anneal(config) => {
                    let result = AnnealRunner::run_with_observer(
                        instance,
                        warm_start,
                        config,
                        None,
                        |event| observer(PipelineEvent::Anneal { index, event }),
                    )?;
                    (result.schedule, result.makespan)
                }
                Stage::AdaptiveAnneal(config) => {
                    let result = AnnealRunner::run_adaptive_with_observer(
                        instance,
                        warm_start,
                        config,
                        None,
                        |event| observer(PipelineEvent::Anneal { index, event }),
                    )?;
                    (result.schedule, result.makespan)
                }
            };

            let report = StageReport {
                stage: stage.name(),
                makespan,
                elapsed: started.elapsed(),
            };
            info!(
                stage = report.stage,
                makespan,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "stage finished"
            );
            observer(PipelineEvent::StageFinished {
                index,
                stage,
                report: &report,
                schedule: &schedule,
            });

            reports.push(report);
            current = Some((schedule, makespan));
        }

        let (schedule, makespan) = current.unwrap_or_default();
        Ok(PipelineResult {
            schedule,
            makespan,
            stages: reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> ProblemInstance {
        ProblemInstance::without_setup(vec![
            vec![3, 8, 1],
            vec![6, 2, 4],
            vec![5, 5, 5],
            vec![1, 9, 2],
            vec![7, 3, 6],
            vec![2, 2, 8],
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        let err = Pipeline::new().run(&instance()).unwrap_err();
        assert!(matches!(err, FlowShopError::InvalidConfig(_)));
    }

    #[test]
    fn test_neh_only_matches_runner() {
        let inst = instance();
        let result = Pipeline::new().with_stage(Stage::Neh).run(&inst).unwrap();
        assert_eq!(result.schedule, NehRunner::run(&inst).schedule);
        assert_eq!(result.stages[0].stage, "neh");
    }

    #[test]
    fn test_chained_stages_never_worsen() {
        let inst = instance();
        let result = Pipeline::new()
            .with_stage(Stage::Neh)
            .with_stage(Stage::Anneal(AnnealConfig::default().with_iterations(2_000).with_seed(1)))
            .with_stage(Stage::AdaptiveAnneal(
                AdaptiveConfig::default().with_iterations(2_000).with_seed(1),
            ))
            .run(&inst)
            .unwrap();

        let spans: Vec<u64> = result.stages.iter().map(|r| r.makespan).collect();
        assert_eq!(spans.len(), 3);
        assert!(spans.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(result.makespan, spans[2]);
        assert_eq!(inst.evaluate(result.schedule.sequence()).unwrap(), result.makespan);
    }

    #[test]
    fn test_stage_errors_propagate() {
        let inst = instance();
        let err = Pipeline::new()
            .with_stage(Stage::Anneal(AnnealConfig::default()))
            .run(&inst)
            .unwrap_err();
        assert!(matches!(err, FlowShopError::InvalidConfig(_)));
    }

    #[test]
    fn test_observer_sees_stage_boundaries() {
        let inst = instance();
        let mut finished = Vec::new();
        let mut neh_rounds = 0;
        Pipeline::new()
            .with_stage(Stage::Neh)
            .with_stage(Stage::Anneal(AnnealConfig::default().with_iterations(100).with_seed(2)))
            .run_with_observer(&inst, |event| match event {
                PipelineEvent::Neh(_) => neh_rounds += 1,
                PipelineEvent::StageFinished { stage, .. } => finished.push(stage.result_prefix()),
                PipelineEvent::Anneal { .. } => {}
            })
            .unwrap();

        assert_eq!(neh_rounds, 6);
        assert_eq!(finished, vec!["NEH", "SA"]);
    }
}
