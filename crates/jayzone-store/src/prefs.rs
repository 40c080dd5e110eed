//! Zone and goal persistence over a key-value preference store.
//!
//! Values are JSON-encoded sequences. Loading never fails: a missing or
//! undecodable zone table yields the default table, and missing or
//! undecodable goals yield an empty registry.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use jayzone_core::GoalRegistry;
use jayzone_types::{GoalEntry, ZoneTable};

use crate::error::Result;
use crate::store::Store;

/// Key of the persisted zone table.
pub const ZONES_KEY: &str = "zones";

/// Key of the persisted goal entries.
pub const GOALS_KEY: &str = "goals";

/// Durable key-value storage for opaque byte values.
pub trait PreferenceStore {
    /// Value stored under `key`, or `None` if absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`.
    fn save(&self, key: &str, value: &[u8]) -> Result<()>;
}

impl PreferenceStore for Store {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.get_preference(key)
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        self.put_preference(key, value)
    }
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}

/// Load the zone table, falling back to the defaults when nothing is
/// stored or the stored value cannot be decoded. A stored empty table is
/// kept as is.
pub fn load_zones<P: PreferenceStore + ?Sized>(prefs: &P) -> ZoneTable {
    let bytes = match prefs.load(ZONES_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return ZoneTable::defaults(),
        Err(e) => {
            warn!("Failed to read stored zones, using defaults: {}", e);
            return ZoneTable::defaults();
        }
    };

    match serde_json::from_slice::<ZoneTable>(&bytes) {
        Ok(table) => table,
        Err(e) => {
            warn!("Stored zone table is invalid, using defaults: {}", e);
            ZoneTable::defaults()
        }
    }
}

/// Persist the zone table.
pub fn save_zones<P: PreferenceStore + ?Sized>(prefs: &P, zones: &ZoneTable) -> Result<()> {
    let bytes = serde_json::to_vec(zones)?;
    prefs.save(ZONES_KEY, &bytes)
}

/// Load the goal registry, falling back to an empty one.
pub fn load_goals<P: PreferenceStore + ?Sized>(prefs: &P) -> GoalRegistry {
    let bytes = match prefs.load(GOALS_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return GoalRegistry::new(),
        Err(e) => {
            warn!("Failed to read stored goals, starting empty: {}", e);
            return GoalRegistry::new();
        }
    };

    match serde_json::from_slice::<Vec<GoalEntry>>(&bytes) {
        Ok(entries) => GoalRegistry::from_entries(entries),
        Err(e) => {
            warn!("Stored goals are invalid, starting empty: {}", e);
            GoalRegistry::new()
        }
    }
}

/// Persist the goal registry.
pub fn save_goals<P: PreferenceStore + ?Sized>(prefs: &P, goals: &GoalRegistry) -> Result<()> {
    let bytes = serde_json::to_vec(goals.entries())?;
    prefs.save(GOALS_KEY, &bytes)
}
