//! NEH constructive heuristic.
//!
//! Builds a permutation by inserting jobs, longest total processing time
//! first, at whichever position of the partial sequence gives the smallest
//! makespan. Deterministic; setup times are accounted for through the
//! shared recurrence.

mod runner;
mod types;

pub use runner::{priority_order, NehRunner};
pub use types::{NehEvent, NehResult};
