//! Error types for Conduit.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ConduitError`] - Top-level error type for all Conduit operations
//! - [`PipelineError`] - Faults raised while running a pipeline
//! - [`ConfigError`] - Invalid pipeline configuration
//! - [`ChannelError`] - Invalid channel names or patterns
//! - [`ContextError`] - Missing request context entries
//!
//! Policy rejections are *not* errors in this sense: they travel in-band on
//! the message as a [`MessageError`](crate::MessageError).

use crate::extension::Direction;
use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Conduit operations.
#[derive(Error, Debug)]
pub enum ConduitError {
    /// A pipeline run failed.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A channel name or pattern was rejected.
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    /// A required request context entry was missing.
    #[error("context error: {0}")]
    Context(#[from] ContextError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Faults that terminate a single pipeline run.
///
/// These are reported to the host and never sent to the remote client.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The hook finished and dropped its continuation without resuming it.
    #[error("{direction} hook of `{extension}` dropped its continuation without resuming")]
    ContinuationDropped {
        /// Name of the offending extension.
        extension: String,
        /// Direction of the run.
        direction: Direction,
    },

    /// The continuation was resumed more than once.
    #[error("{direction} hook of `{extension}` resumed its continuation {calls} times")]
    ContinuationReused {
        /// Name of the offending extension.
        extension: String,
        /// Direction of the run.
        direction: Direction,
        /// Total number of resume calls observed.
        calls: usize,
    },

    /// The hook resumed with a message other than the one it was given.
    #[error("{direction} hook of `{extension}` resumed with a different message (channel `{expected}` became `{found}`)")]
    MessageSwapped {
        /// Name of the offending extension.
        extension: String,
        /// Direction of the run.
        direction: Direction,
        /// Channel of the message handed to the hook.
        expected: String,
        /// Channel of the message the hook resumed with.
        found: String,
    },

    /// The hook panicked.
    #[error("{direction} hook of `{extension}` panicked: {message}")]
    HookPanicked {
        /// Name of the offending extension.
        extension: String,
        /// Direction of the run.
        direction: Direction,
        /// Panic payload, if it was a string.
        message: String,
    },

    /// The run did not complete in time.
    #[error("{direction} pipeline run timed out after {limit:?}")]
    Timeout {
        /// Direction of the run.
        direction: Direction,
        /// Configured limit.
        limit: Duration,
    },
}

impl PipelineError {
    /// Name of the extension responsible for the fault, if any.
    pub fn extension(&self) -> Option<&str> {
        match self {
            PipelineError::ContinuationDropped { extension, .. }
            | PipelineError::ContinuationReused { extension, .. }
            | PipelineError::MessageSwapped { extension, .. }
            | PipelineError::HookPanicked { extension, .. } => Some(extension),
            PipelineError::Timeout { .. } => None,
        }
    }
}

/// Errors from loading a pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value was out of range.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors from channel names and patterns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The pattern is not a valid channel glob.
    #[error("invalid channel pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Errors from request context lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// No value of the requested type was stored.
    #[error("request context has no `{0}`")]
    Missing(&'static str),
}

/// The wire string is not of the form `<code>::<description>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed message error `{0}`, expected `<code>::<description>`")]
pub struct MessageErrorParse(pub String);

impl From<BoxError> for ConduitError {
    fn from(err: BoxError) -> Self {
        ConduitError::Custom(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_names_extension() {
        let err = PipelineError::ContinuationReused {
            extension: "csrf".into(),
            direction: Direction::Incoming,
            calls: 2,
        };
        assert_eq!(err.extension(), Some("csrf"));
        assert_eq!(
            err.to_string(),
            "incoming hook of `csrf` resumed its continuation 2 times"
        );

        let timeout = PipelineError::Timeout {
            direction: Direction::Outgoing,
            limit: Duration::from_millis(10),
        };
        assert_eq!(timeout.extension(), None);
        assert!(timeout.to_string().contains("10ms"));
    }

    #[test]
    fn test_conduit_error_wraps() {
        let err: ConduitError = ContextError::Missing("SessionToken").into();
        assert_eq!(
            err.to_string(),
            "context error: request context has no `SessionToken`"
        );
    }
}
