//! Error types for the metrics core.
//!
//! The aggregation itself cannot fail; these errors come from the
//! precondition checks run at the boundary before computing.

use thiserror::Error;

/// Validation failure surfaced to the caller instead of corrupting metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    /// An input event violates a precondition.
    #[error("invalid event at index {index}: {reason}")]
    InvalidEvent {
        /// Position of the offending event in the input.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A computation parameter is out of range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParams {
        name: &'static str,
        reason: String,
    },
}

impl MetricsError {
    pub(crate) fn invalid_event(index: usize, reason: impl Into<String>) -> Self {
        MetricsError::InvalidEvent {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_param(name: &'static str, reason: impl Into<String>) -> Self {
        MetricsError::InvalidParams {
            name,
            reason: reason.into(),
        }
    }
}
