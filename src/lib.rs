//! Permutation flow-shop solver with sequence-dependent setup times.
//!
//! Given `N` jobs that visit `M` machines in the same order, and a
//! changeover time on each machine that depends on which job ran just
//! before, finds a job permutation with a small makespan.
//!
//! - **Instance**: immutable processing-time matrix and setup-time tensor,
//!   with the makespan recurrence shared by every algorithm.
//! - **Schedule**: a job permutation, replayable into per-machine slots.
//! - **NEH**: deterministic greedy insertion (Nawaz, Enscore & Ham).
//! - **Simulated Annealing (SA)**: swap-move annealing with a fixed
//!   geometric schedule or an adaptively calibrated one.
//! - **Pipeline**: chains the above, each stage warm-starting the next.
//!
//! All computation is synchronous; each annealing run owns an explicitly
//! seeded generator, so results are reproducible.
//!
//! # Examples
//!
//! ```
//! use u_flowshop::{AnnealConfig, AnnealRunner, NehRunner, ProblemInstance};
//!
//! let instance = ProblemInstance::new(
//!     2,
//!     1,
//!     vec![vec![5], vec![5]],
//!     vec![vec![vec![0, 10], vec![1, 0]]],
//! )
//! .unwrap();
//!
//! let neh = NehRunner::run(&instance);
//! assert_eq!(neh.schedule.sequence(), &[1, 0]);
//!
//! let config = AnnealConfig::default().with_iterations(100).with_seed(7);
//! let sa = AnnealRunner::run(&instance, Some(&neh.schedule), &config).unwrap();
//! assert_eq!(sa.makespan, 11);
//!
//! let trace = sa.schedule.replay(&instance).unwrap();
//! assert_eq!(trace.makespan(), 11);
//! ```

pub mod error;
pub mod instance;
pub mod io;
pub mod neh;
pub mod pipeline;
pub mod random;
pub mod sa;
pub mod schedule;

pub use error::{FlowShopError, Result};
pub use instance::{InstanceTables, MakespanEvaluator, ProblemInstance};
pub use neh::{NehEvent, NehResult, NehRunner};
pub use pipeline::{Pipeline, PipelineEvent, PipelineResult, Stage, StageReport};
pub use sa::{
    AdaptiveConfig, AdaptiveConstants, AnnealConfig, AnnealEvent, AnnealResult, AnnealRunner,
    Calibration,
};
pub use schedule::{Schedule, SlotOperation, SlotRecord, SlotTrace};
