//! Error types for the convergence detection core.

use thiserror::Error;

/// Result type alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Domain errors: caller mistakes rejected at the `update` boundary.
///
/// None of these are recovered internally; they are never folded into a
/// detector's history. Numerical degeneracies (zero baselines, empty
/// windows) are handled separately and do not appear here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("{field} is not finite: {value}")]
    NonFiniteValue { field: &'static str, value: f64 },

    #[error("hypervolume cannot be negative: {0}")]
    NegativeHypervolume(f64),

    #[error("generation went backwards: previous {previous}, received {received}")]
    GenerationRegressed { previous: u64, received: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
