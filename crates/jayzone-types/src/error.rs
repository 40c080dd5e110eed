//! Validation errors for zone and goal edits.

use thiserror::Error;

/// Errors raised when a write to a zone table or goal registry is rejected.
///
/// A rejected write never leaves partial state behind: the value being
/// edited is unchanged when one of these is returned.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Minimum BPM of a zone was zero.
    #[error("Zone {zone_id}: minimum BPM must be greater than zero")]
    MinNotPositive {
        /// Zone being edited.
        zone_id: u32,
    },

    /// Minimum BPM was not strictly below the maximum.
    #[error("Zone {zone_id}: minimum BPM {min} must be below maximum BPM {max}")]
    EmptyRange {
        /// Zone being edited.
        zone_id: u32,
        /// Requested minimum.
        min: u16,
        /// Requested maximum.
        max: u16,
    },

    /// No zone with this id exists in the table.
    #[error("Unknown zone: {0}")]
    UnknownZone(u32),

    /// Two definitions in a table share the same id.
    #[error("Duplicate zone id: {0}")]
    DuplicateZone(u32),

    /// A goal target of zero minutes was requested.
    #[error("Goal for zone {zone_id} must target at least one minute")]
    InvalidTarget {
        /// Zone the goal belongs to.
        zone_id: u32,
    },

    /// A period name could not be parsed.
    #[error("Unknown period: {0} (expected daily, weekly or monthly)")]
    UnknownPeriod(String),
}

/// Result type alias using jayzone-types' ValidationError type.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
