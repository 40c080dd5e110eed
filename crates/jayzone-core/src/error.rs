//! Error types for jayzone-core.
//!
//! Aggregation, period resolution and goal computation never fail; they
//! degrade to empty or zero results. Errors only come from two places:
//!
//! | Error | Raised by | Handling |
//! |-------|-----------|----------|
//! | [`Error::SourceFailed`] | a [`crate::SampleSource`] | Treated as zero samples by the coordinator |
//! | [`Error::SourceUnavailable`] | a [`crate::SampleSource`] | Treated as zero samples by the coordinator |
//! | [`Error::Validation`] | zone and goal edits | Rejected write, state unchanged; retry with corrected input |

use thiserror::Error;

use jayzone_types::ValidationError;

/// Errors that can occur in the zone tracking engine.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The sample source returned an error.
    #[error("Sample source failed: {reason}")]
    SourceFailed {
        /// Description of the failure.
        reason: String,
    },

    /// The sample source cannot be used (not authorized, not configured).
    #[error("Sample source unavailable: {0}")]
    SourceUnavailable(String),

    /// A zone or goal edit was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Create a source failure with a reason.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        Self::SourceFailed {
            reason: reason.into(),
        }
    }

    /// Create a source-unavailable error.
    pub fn source_unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable(reason.into())
    }
}

/// Result type alias using jayzone-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::source_failed("query timed out");
        assert_eq!(err.to_string(), "Sample source failed: query timed out");

        let err = Error::source_unavailable("not authorized");
        assert_eq!(err.to_string(), "Sample source unavailable: not authorized");
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: Error = ValidationError::UnknownZone(7).into();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(err.to_string(), "Unknown zone: 7");
    }
}
