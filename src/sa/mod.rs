//! Simulated Annealing (SA) for permutation flow shops.
//!
//! A single-solution trajectory search over job permutations. The
//! neighborhood is a swap of two uniformly drawn positions; worsening
//! moves are accepted with the Metropolis probability `exp(-Δ / T)` and the
//! temperature cools geometrically every iteration.
//!
//! Two variants share the same move/accept/cool loop:
//!
//! - **Standard**: caller-chosen starting temperature and cooling factor
//!   ([`AnnealConfig`]).
//! - **Adaptive**: both are estimated from a short calibration walk
//!   ([`AdaptiveConfig`], [`AdaptiveConstants`]).
//!
//! Every run owns a generator seeded from the config, so results are
//! reproducible and independent runs can proceed on separate threads.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Osman & Potts (1989), "Simulated annealing for permutation flow-shop
//!   scheduling", *Omega* 17(6)

mod config;
mod runner;
mod types;

pub use config::{AdaptiveConfig, AdaptiveConstants, AnnealConfig};
pub use runner::AnnealRunner;
pub use types::{AnnealEvent, AnnealResult, Calibration};
