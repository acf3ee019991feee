//! Problem instance and makespan evaluation.
//!
//! A [`ProblemInstance`] is immutable once built; every search component
//! shares its single time recurrence through [`MakespanEvaluator`].

pub(crate) mod evaluator;
mod types;

pub use evaluator::MakespanEvaluator;
pub use types::{InstanceTables, ProblemInstance};
