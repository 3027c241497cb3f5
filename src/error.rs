//! Error types for route discovery.

use thiserror::Error;

/// Errors surfaced by the colony engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcoError {
    /// The task set is empty or otherwise unusable.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A priority map was requested before any iteration completed.
    #[error("no completed iteration yet; call optimize first")]
    NotReady,

    /// Roulette selection walked every city without picking one.
    ///
    /// Only reachable through a broken probability distribution (NaN
    /// weights). Indicates a bug, never retried.
    #[error("next-city selection exhausted from city {current_city}")]
    ExhaustedSearch {
        /// City the ant was standing on.
        current_city: usize,
    },
}
