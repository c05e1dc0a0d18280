//! Error types for the calgrid binary.
//!
//! The library layers each own a focused `thiserror` enum:
//!
//! - [`IntervalError`](super::IntervalError) - inverted or empty intervals
//! - [`RRuleParseError`](crate::recurrence::RRuleParseError) - malformed RRULE text
//! - [`RuleProblem`](crate::recurrence::RuleProblem) - one validation finding per problem
//! - [`TaskFailure`](crate::processor::TaskFailure) - worker timeout or fault, request echoed back
//! - [`ConfigError`], [`LoggingError`], [`SourceError`] - shell concerns
//!
//! [`AppError`] composes the shell-level ones so `main` can use `?` throughout.
//! Validation problems and task failures are recoverable by the caller and are
//! only promoted to `AppError` at the very top.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::model::IntervalError;
use crate::processor::TaskFailure;
use crate::source::SourceError;
use thiserror::Error;

/// Top-level error for the `calgrid` binary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tracing could not be initialised.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Master events could not be loaded.
    #[error("Failed to load events: {0}")]
    Source(#[from] SourceError),

    /// The requested query window is empty or inverted.
    #[error("Invalid query window: {0}")]
    Window(#[from] IntervalError),

    /// `--from` or `--to` was not given.
    #[error("A query window needs both --from and --to")]
    MissingWindow,

    /// The processing task failed (timeout or execution fault).
    #[error("Processing failed: {0}")]
    Task(#[from] Box<TaskFailure>),

    /// One or more recurrence rules failed validation.
    #[error("{count} event(s) have invalid recurrence rules")]
    InvalidRules {
        /// Number of master events with at least one problem.
        count: usize,
    },

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Serializing output failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn source_error_converts_via_question_mark() {
        fn load() -> Result<(), AppError> {
            Err(SourceError::FileNotFound {
                path: PathBuf::from("/tmp/missing-events.json"),
            })?;
            Ok(())
        }
        let err = load().unwrap_err();
        assert!(matches!(err, AppError::Source(_)));
        assert!(err.to_string().contains("/tmp/missing-events.json"));
    }

    #[test]
    fn invalid_rules_reports_count() {
        let err = AppError::InvalidRules { count: 3 };
        assert_eq!(err.to_string(), "3 event(s) have invalid recurrence rules");
    }
}
