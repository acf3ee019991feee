//! Error type shared by every component.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FlowShopError>;

/// Errors raised by the solver.
///
/// Every variant is a precondition violation: the core performs no I/O
/// (except [`FlowShopError::Io`] at the loader boundary) and never retries.
#[derive(Debug, Error)]
pub enum FlowShopError {
    /// Instance tables are missing, inconsistently shaped, or hold
    /// values that cannot be durations.
    #[error("invalid instance: {0}")]
    InvalidInstance(String),

    /// A sequence holds an out-of-range or duplicate job index, or a
    /// warm start is not a complete permutation.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Search parameters are out of range (including a missing seed).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The instance file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlowShopError {
    pub(crate) fn instance(message: impl Into<String>) -> Self {
        Self::InvalidInstance(message.into())
    }

    pub(crate) fn schedule(message: impl Into<String>) -> Self {
        Self::InvalidSchedule(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            FlowShopError::instance("jobs = 3 but 2 rows").to_string(),
            "invalid instance: jobs = 3 but 2 rows"
        );
        assert!(FlowShopError::config("seed is required")
            .to_string()
            .starts_with("invalid configuration"));
    }

    #[test]
    fn test_io_source() {
        use std::error::Error;
        let err: FlowShopError = std::io::Error::other("boom").into();
        assert!(err.source().is_some());
        assert!(FlowShopError::schedule("dup").source().is_none());
    }
}
