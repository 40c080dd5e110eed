//! Local persistence for heart-rate samples, zones and goals.
//!
//! This crate provides SQLite-based storage for the zone engine:
//!
//! - A key-value `preferences` table behind the [`PreferenceStore`] trait,
//!   with helpers that persist the zone table and goals
//! - A sample cache that serves as a [`jayzone_core::SampleSource`]
//! - CSV import of `timestamp,bpm` rows
//!
//! # Example
//!
//! ```
//! use jayzone_store::{Store, load_zones, save_zones};
//!
//! let store = Store::open_in_memory()?;
//! let mut zones = load_zones(&store);
//! zones.update_range(2, 100, 125).expect("valid range");
//! save_zones(&store, &zones)?;
//!
//! assert_eq!(load_zones(&store), zones);
//! # Ok::<(), jayzone_store::Error>(())
//! ```

mod error;
mod prefs;
mod schema;
mod source;
mod store;

pub use error::{Error, Result};
pub use prefs::{
    GOALS_KEY, MemoryPreferences, PreferenceStore, ZONES_KEY, load_goals, load_zones, save_goals,
    save_zones,
};
pub use source::StoredSamples;
pub use store::{ImportResult, SampleStats, Store, parse_timestamp};

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/jayzone/data.db`
/// - macOS: `~/Library/Application Support/jayzone/data.db`
/// - Windows: `C:\Users\<user>\AppData\Local\jayzone\data.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("jayzone")
        .join("data.db")
}
