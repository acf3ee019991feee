//! Annealing configuration.

use crate::error::{FlowShopError, Result};

/// Configuration for the standard (fixed-schedule) annealing search.
///
/// The temperature starts at `initial_temperature` and is multiplied by
/// `cooling_factor` after every iteration, accepted or not.
///
/// # Examples
///
/// ```
/// use u_flowshop::sa::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_iterations(20_000)
///     .with_initial_temperature(50.0)
///     .with_cooling_factor(0.999)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Number of swap moves to attempt.
    pub iterations: usize,

    /// Starting temperature. Must be positive.
    pub initial_temperature: f64,

    /// Geometric cooling factor in `(0, 1]`.
    pub cooling_factor: f64,

    /// Random seed. Required: a run without a seed is rejected.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            iterations: 50_000,
            initial_temperature: 100.0,
            cooling_factor: 0.9975,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_cooling_factor(mut self, alpha: f64) -> Self {
        self.cooling_factor = alpha;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        require_seed(self.seed)?;
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(FlowShopError::config(format!(
                "initial_temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        if !(self.cooling_factor > 0.0 && self.cooling_factor <= 1.0) {
            return Err(FlowShopError::config(format!(
                "cooling_factor must be in (0, 1], got {}",
                self.cooling_factor
            )));
        }
        Ok(())
    }
}

/// Empirical constants of the adaptive temperature calibration.
///
/// The defaults reproduce the calibration heuristic the solver was tuned
/// with; they are exposed so experiments can override them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveConstants {
    /// Calibration walk length is `iterations / stats_divisor` (at least 1).
    pub stats_divisor: usize,

    /// Damping applied to the mean absolute makespan change.
    pub step_damping: u64,

    /// Target acceptance probability of a typical move at the start.
    pub initial_acceptance: f64,

    /// Target acceptance probability of a typical move at the end of the
    /// cooling span.
    pub final_acceptance: f64,

    /// Fraction of the run over which the temperature moves between the two
    /// acceptance targets.
    pub cooling_span: f64,

    /// Extra multiplicative decay of the cooling factor applied on every
    /// iteration past the cooling span. `None` disables it.
    pub late_decay: Option<f64>,
}

impl Default for AdaptiveConstants {
    fn default() -> Self {
        Self {
            stats_divisor: 10,
            step_damping: 15,
            initial_acceptance: 0.8,
            final_acceptance: 0.001,
            cooling_span: 0.95,
            late_decay: Some(0.999),
        }
    }
}

impl AdaptiveConstants {
    /// Validates the constants.
    pub fn validate(&self) -> Result<()> {
        if self.stats_divisor == 0 {
            return Err(FlowShopError::config("stats_divisor must be positive"));
        }
        if self.step_damping == 0 {
            return Err(FlowShopError::config("step_damping must be positive"));
        }
        let (p0, p1) = (self.initial_acceptance, self.final_acceptance);
        if !(p1 > 0.0 && p1 < p0 && p0 < 1.0) {
            return Err(FlowShopError::config(format!(
                "acceptance targets must satisfy 0 < final < initial < 1, got initial={p0}, final={p1}"
            )));
        }
        if !(self.cooling_span > 0.0 && self.cooling_span <= 1.0) {
            return Err(FlowShopError::config(format!(
                "cooling_span must be in (0, 1], got {}",
                self.cooling_span
            )));
        }
        if let Some(decay) = self.late_decay {
            if !(decay > 0.0 && decay <= 1.0) {
                return Err(FlowShopError::config(format!(
                    "late_decay must be in (0, 1], got {decay}"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for the adaptive-temperature annealing search.
///
/// The initial temperature and cooling factor are estimated from a short
/// random walk; only the iteration budget and seed are chosen by the caller.
///
/// # Examples
///
/// ```
/// use u_flowshop::sa::AdaptiveConfig;
///
/// let config = AdaptiveConfig::default()
///     .with_iterations(10_000)
///     .with_late_decay(None)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveConfig {
    /// Number of swap moves in the optimization phase.
    pub iterations: usize,

    /// Random seed. Required: a run without a seed is rejected.
    pub seed: Option<u64>,

    /// Calibration constants.
    pub constants: AdaptiveConstants,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            iterations: 50_000,
            seed: None,
            constants: AdaptiveConstants::default(),
        }
    }
}

impl AdaptiveConfig {
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_constants(mut self, constants: AdaptiveConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_late_decay(mut self, decay: Option<f64>) -> Self {
        self.constants.late_decay = decay;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        require_seed(self.seed)?;
        self.constants.validate()
    }
}

/// Returns the seed or the error raised for a seedless run.
pub(super) fn require_seed(seed: Option<u64>) -> Result<u64> {
    match seed {
        Some(seed) => Ok(seed),
        None => Err(FlowShopError::config(
            "seed is required for reproducible annealing",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnnealConfig::default();
        assert_eq!(config.iterations, 50_000);
        assert!((config.initial_temperature - 100.0).abs() < 1e-10);
        assert!((config.cooling_factor - 0.9975).abs() < 1e-12);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_missing_seed_rejected() {
        assert!(matches!(
            AnnealConfig::default().validate(),
            Err(FlowShopError::InvalidConfig(_))
        ));
        assert!(AdaptiveConfig::default().validate().is_err());
        assert!(AdaptiveConfig::default().with_seed(1).validate().is_ok());
    }

    #[test]
    fn test_validate_bad_temperature() {
        let config = AnnealConfig::default()
            .with_seed(1)
            .with_initial_temperature(0.0);
        assert!(config.validate().is_err());
        let config = AnnealConfig::default()
            .with_seed(1)
            .with_initial_temperature(f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_cooling_factor() {
        let base = AnnealConfig::default().with_seed(1);
        assert!(base.clone().with_cooling_factor(1.0).validate().is_ok());
        assert!(base.clone().with_cooling_factor(0.0).validate().is_err());
        assert!(base.with_cooling_factor(1.01).validate().is_err());
    }

    #[test]
    fn test_adaptive_defaults() {
        let config = AdaptiveConfig::default();
        assert_eq!(config.iterations, 50_000);
        assert_eq!(config.constants.stats_divisor, 10);
        assert_eq!(config.constants.step_damping, 15);
        assert_eq!(config.constants.late_decay, Some(0.999));
    }

    #[test]
    fn test_adaptive_constants_validation() {
        let mut c = AdaptiveConstants::default();
        assert!(c.validate().is_ok());
        c.final_acceptance = 0.9;
        assert!(c.validate().is_err());

        let c = AdaptiveConstants {
            stats_divisor: 0,
            ..AdaptiveConstants::default()
        };
        assert!(c.validate().is_err());

        let c = AdaptiveConstants {
            late_decay: Some(1.5),
            ..AdaptiveConstants::default()
        };
        assert!(c.validate().is_err());
    }
}
