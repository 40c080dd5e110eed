//! Platform-agnostic types for heart-rate zone tracking.
//!
//! This crate provides the shared data shapes used by the aggregation
//! engine (jayzone-core), the local store (jayzone-store) and the CLI.
//!
//! # Features
//!
//! - Zone definitions and the ordered [`ZoneTable`]
//! - Heart-rate [`Sample`]s and per-zone [`ZoneTimeRecord`]s
//! - Period kinds and goal entries
//! - Validation errors for zone and goal edits
//!
//! # Example
//!
//! ```
//! use jayzone_types::{ZoneTable, DisplayHint};
//!
//! let zones = ZoneTable::defaults();
//! let zone = zones.classify(130).unwrap();
//! assert_eq!(zone.id, 3);
//! assert_eq!(zone.display_hint, DisplayHint::Yellow);
//! ```

pub mod error;
pub mod types;

pub use error::{ValidationError, ValidationResult};
pub use types::{
    DisplayHint, GoalEntry, PeriodKind, Sample, ZoneDefinition, ZoneTable, ZoneTimeRecord,
    validate_range,
};
