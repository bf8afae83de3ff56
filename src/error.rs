//! Error types for schedule construction and job management.
//!
//! Infeasibility is deliberately *not* an error: a schedule whose hard
//! score is negative is a valid terminal state, explained by the
//! [`analysis`](crate::analysis) module. Errors here cover problems that
//! must stop a build or a job operation before any solving happens.

use uuid::Uuid;

use crate::validation::ValidationError;

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("job error: {0}")]
    Job(#[from] JobError),
}

/// Errors raised while assembling a schedule from its inputs.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Pinned tasks extend past the configured horizon. Detected before
    /// solving starts, never mid-search.
    #[error("pinned tasks need {needed_slots} slots but the horizon has {total_slots}; increase days_in_schedule")]
    HorizonTooSmall { needed_slots: i64, total_slots: i64 },

    /// Single-employee construction was requested with a pool size
    /// other than one.
    #[error("single-employee construction requires employee_count == 1, got {employee_count}")]
    SoloPoolMismatch { employee_count: usize },

    /// A calendar timestamp could not be parsed.
    #[error("cannot parse timestamp '{value}'")]
    InvalidTimestamp { value: String },

    /// The configured skill set has no required skills to draw from.
    #[error("skill set has no required skills; employee generation needs at least one")]
    EmptySkillPool,

    /// Zero employees were requested.
    #[error("employee_count must be at least one")]
    EmptyEmployeePool,

    /// A weighted count distribution was empty or had invalid weights.
    #[error("invalid count distribution: {0}")]
    InvalidDistribution(String),

    /// The assembled schedule failed structural validation.
    #[error("schedule failed validation: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),
}

/// Errors raised by explicit job-registry operations.
///
/// Routine polling never produces these: a poll on an unknown job id
/// simply reports no result.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job {id} not found")]
    NotFound { id: Uuid },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
