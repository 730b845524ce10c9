//! Office hours error types.
//!
//! Every error here is fatal to a simulation run: it indicates either bad
//! input or a defect in the admission protocol. Nothing is retried.

use crate::arrivals::ArrivalError;
use crate::config::ConfigError;
use thiserror::Error;

/// Office hours error type.
///
/// Maps to process exit status in the binary:
/// - `Config`, `Arrivals`, `NoStudents`, `TooManyStudents`: configuration
///   and resource-exhaustion errors, reported before any actor starts
/// - `InvariantViolation`: internal-consistency fault detected by the gate
/// - `Internal`: an actor mailbox went away mid-run
#[derive(Debug, Error)]
pub enum OfficeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The arrival input could not be read or parsed.
    #[error("Arrival input error: {0}")]
    Arrivals(#[from] ArrivalError),

    /// The arrival input held no records.
    #[error("Bad number of students: input contained no arrival records")]
    NoStudents,

    /// The arrival input held more records than the actor limit.
    #[error("Bad number of students: {count} exceeds the limit of {limit}")]
    TooManyStudents { count: usize, limit: usize },

    /// A post-mutation invariant check failed.
    #[error("Office invariant violated: {0}")]
    InvariantViolation(String),

    /// The gate refused an operation that is not valid in its current state.
    #[error("Invalid office transition: {0}")]
    InvalidTransition(String),

    /// Internal error (mailbox closed, task failed).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OfficeError {
    /// Whether the error was detected before any actor was started.
    #[must_use]
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            OfficeError::Config(_)
                | OfficeError::Arrivals(_)
                | OfficeError::NoStudents
                | OfficeError::TooManyStudents { .. }
        )
    }
}
