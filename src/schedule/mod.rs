//! Schedules (job permutations) and their slot-trace replay.

mod trace;
mod types;

pub use trace::{SlotOperation, SlotRecord, SlotTrace};
pub use types::Schedule;
pub(crate) use types::{check_permutation, check_sequence};
