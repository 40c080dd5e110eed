//! Zone goals and progress.
//!
//! A [`GoalRegistry`] holds at most one target per `(zone, period)` pair.
//! [`GoalTracker`] compares aggregated zone totals against those targets.
//!
//! # Example
//!
//! ```
//! use jayzone_core::goals::{GoalRegistry, GoalTracker};
//! use jayzone_types::{PeriodKind, ZoneTimeRecord};
//!
//! let mut goals = GoalRegistry::new();
//! goals.upsert(2, PeriodKind::Daily, 60)?;
//!
//! let records = vec![ZoneTimeRecord {
//!     zone_id: 2,
//!     zone_label: "Zone 2".into(),
//!     total_seconds: 45.0 * 60.0,
//! }];
//!
//! let tracker = GoalTracker::new(&goals);
//! assert_eq!(tracker.progress(2, PeriodKind::Daily, &records), Some(0.75));
//! assert_eq!(tracker.progress(3, PeriodKind::Daily, &records), None);
//! assert_eq!(tracker.target_formatted(2, PeriodKind::Daily).as_deref(), Some("1h"));
//! # Ok::<(), jayzone_types::ValidationError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use jayzone_types::{GoalEntry, PeriodKind, ValidationResult, ZoneTimeRecord};

/// Goal targets keyed by `(zone id, period)`.
///
/// Serializes as a plain sequence of [`GoalEntry`] values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<GoalEntry>", into = "Vec<GoalEntry>")]
pub struct GoalRegistry {
    entries: Vec<GoalEntry>,
}

impl GoalRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from stored entries.
    ///
    /// Later entries replace earlier ones with the same key; entries with a
    /// zero target are skipped.
    pub fn from_entries(entries: impl IntoIterator<Item = GoalEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            if registry
                .upsert(entry.zone_id, entry.period, entry.target_minutes)
                .is_err()
            {
                debug!(zone_id = entry.zone_id, "Skipping goal with zero target");
            }
        }
        registry
    }

    /// Look up the goal for a zone and period.
    pub fn get(&self, zone_id: u32, period: PeriodKind) -> Option<&GoalEntry> {
        self.entries
            .iter()
            .find(|g| g.zone_id == zone_id && g.period == period)
    }

    /// Insert or replace the goal for a zone and period.
    ///
    /// # Errors
    ///
    /// Rejects a zero-minute target; the registry is unchanged on error.
    pub fn upsert(
        &mut self,
        zone_id: u32,
        period: PeriodKind,
        target_minutes: u32,
    ) -> ValidationResult<()> {
        let entry = GoalEntry::new(zone_id, period, target_minutes)?;
        match self
            .entries
            .iter_mut()
            .find(|g| g.key() == entry.key())
        {
            Some(existing) => existing.target_minutes = target_minutes,
            None => self.entries.push(entry),
        }
        Ok(())
    }

    /// Remove the goal for a zone and period. Returns whether one existed.
    pub fn remove(&mut self, zone_id: u32, period: PeriodKind) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|g| !(g.zone_id == zone_id && g.period == period));
        self.entries.len() != before
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[GoalEntry] {
        &self.entries
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &GoalEntry> {
        self.entries.iter()
    }

    /// Entries for one period.
    pub fn for_period(&self, period: PeriodKind) -> impl Iterator<Item = &GoalEntry> {
        self.entries.iter().filter(move |g| g.period == period)
    }

    /// Number of goals.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no goals are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<GoalEntry>> for GoalRegistry {
    fn from(entries: Vec<GoalEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<GoalRegistry> for Vec<GoalEntry> {
    fn from(registry: GoalRegistry) -> Self {
        registry.entries
    }
}

/// Render a target as `"1h 30m"`, `"2h"` or `"45m"`.
pub fn format_target_minutes(minutes: u32) -> String {
    if minutes >= 60 {
        let hours = minutes / 60;
        let rest = minutes % 60;
        if rest > 0 {
            format!("{}h {}m", hours, rest)
        } else {
            format!("{}h", hours)
        }
    } else {
        format!("{}m", minutes)
    }
}

/// Progress of one zone against its goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneGoalStatus {
    /// Zone id.
    pub zone_id: u32,
    /// Zone label.
    pub zone_label: String,
    /// Seconds spent in the zone.
    pub actual_seconds: f64,
    /// Goal target, if one is set.
    pub target_minutes: Option<u32>,
    /// Progress in `[0, 1]`, if a goal is set.
    pub progress: Option<f64>,
}

impl ZoneGoalStatus {
    /// Whether the goal has been reached.
    pub fn is_met(&self) -> bool {
        self.progress.is_some_and(|p| p >= 1.0)
    }
}

/// Computes goal progress from aggregated totals.
#[derive(Debug, Clone, Copy)]
pub struct GoalTracker<'a> {
    registry: &'a GoalRegistry,
}

impl<'a> GoalTracker<'a> {
    /// Create a tracker over a registry.
    pub fn new(registry: &'a GoalRegistry) -> Self {
        Self { registry }
    }

    fn active_goal(&self, zone_id: u32, period: PeriodKind) -> Option<&'a GoalEntry> {
        self.registry
            .get(zone_id, period)
            .filter(|g| g.target_minutes > 0)
    }

    /// Fraction of the goal reached, clamped to `[0, 1]`.
    ///
    /// Returns `None` when no goal is set. A zone missing from `records`
    /// counts as zero time.
    pub fn progress(
        &self,
        zone_id: u32,
        period: PeriodKind,
        records: &[ZoneTimeRecord],
    ) -> Option<f64> {
        let goal = self.active_goal(zone_id, period)?;
        let actual = records
            .iter()
            .find(|r| r.zone_id == zone_id)
            .map_or(0.0, |r| r.total_seconds);
        Some((actual / goal.target_seconds()).clamp(0.0, 1.0))
    }

    /// The goal target rendered with [`format_target_minutes`].
    pub fn target_formatted(&self, zone_id: u32, period: PeriodKind) -> Option<String> {
        self.active_goal(zone_id, period)
            .map(|g| format_target_minutes(g.target_minutes))
    }

    /// Goal status for every record.
    pub fn summarize(&self, period: PeriodKind, records: &[ZoneTimeRecord]) -> Vec<ZoneGoalStatus> {
        records
            .iter()
            .map(|record| ZoneGoalStatus {
                zone_id: record.zone_id,
                zone_label: record.zone_label.clone(),
                actual_seconds: record.total_seconds,
                target_minutes: self
                    .active_goal(record.zone_id, period)
                    .map(|g| g.target_minutes),
                progress: self.progress(record.zone_id, period, records),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jayzone_types::ValidationError;

    fn record(zone_id: u32, minutes: f64) -> ZoneTimeRecord {
        ZoneTimeRecord {
            zone_id,
            zone_label: format!("Zone {}", zone_id),
            total_seconds: minutes * 60.0,
        }
    }

    #[test]
    fn test_upsert_and_get() {
        let mut goals = GoalRegistry::new();
        goals.upsert(1, PeriodKind::Daily, 30).unwrap();
        goals.upsert(1, PeriodKind::Weekly, 200).unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals.get(1, PeriodKind::Daily).unwrap().target_minutes, 30);

        goals.upsert(1, PeriodKind::Daily, 45).unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals.get(1, PeriodKind::Daily).unwrap().target_minutes, 45);
        assert!(goals.get(1, PeriodKind::Monthly).is_none());
    }

    #[test]
    fn test_upsert_zero_rejected() {
        let mut goals = GoalRegistry::new();
        goals.upsert(3, PeriodKind::Daily, 20).unwrap();
        let before = goals.clone();
        assert_eq!(
            goals.upsert(3, PeriodKind::Daily, 0),
            Err(ValidationError::InvalidTarget { zone_id: 3 })
        );
        assert_eq!(goals, before);
    }

    #[test]
    fn test_remove() {
        let mut goals = GoalRegistry::new();
        goals.upsert(2, PeriodKind::Monthly, 600).unwrap();
        assert!(goals.remove(2, PeriodKind::Monthly));
        assert!(!goals.remove(2, PeriodKind::Monthly));
        assert!(goals.is_empty());
    }

    #[test]
    fn test_for_period() {
        let mut goals = GoalRegistry::new();
        goals.upsert(1, PeriodKind::Daily, 10).unwrap();
        goals.upsert(2, PeriodKind::Weekly, 10).unwrap();
        goals.upsert(3, PeriodKind::Daily, 10).unwrap();
        let zones: Vec<u32> = goals.for_period(PeriodKind::Daily).map(|g| g.zone_id).collect();
        assert_eq!(zones, vec![1, 3]);
    }

    #[test]
    fn test_from_entries_dedups_and_skips_zero() {
        let entries = vec![
            GoalEntry { zone_id: 1, period: PeriodKind::Daily, target_minutes: 10 },
            GoalEntry { zone_id: 1, period: PeriodKind::Daily, target_minutes: 25 },
            GoalEntry { zone_id: 2, period: PeriodKind::Daily, target_minutes: 0 },
        ];
        let goals = GoalRegistry::from_entries(entries);
        assert_eq!(goals.len(), 1);
        assert_eq!(goals.get(1, PeriodKind::Daily).unwrap().target_minutes, 25);
    }

    #[test]
    fn test_serializes_as_sequence() {
        let mut goals = GoalRegistry::new();
        goals.upsert(4, PeriodKind::Weekly, 90).unwrap();
        let json = serde_json::to_string(&goals).unwrap();
        assert_eq!(json, r#"[{"zone_id":4,"period":"weekly","target_minutes":90}]"#);
        let back: GoalRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, goals);
    }

    #[test]
    fn test_progress_partial() {
        let mut goals = GoalRegistry::new();
        goals.upsert(2, PeriodKind::Daily, 60).unwrap();
        let tracker = GoalTracker::new(&goals);
        assert_eq!(
            tracker.progress(2, PeriodKind::Daily, &[record(2, 45.0)]),
            Some(0.75)
        );
    }

    #[test]
    fn test_progress_clamped() {
        let mut goals = GoalRegistry::new();
        goals.upsert(2, PeriodKind::Daily, 60).unwrap();
        let tracker = GoalTracker::new(&goals);
        assert_eq!(
            tracker.progress(2, PeriodKind::Daily, &[record(2, 90.0)]),
            Some(1.0)
        );
    }

    #[test]
    fn test_progress_absent_without_goal() {
        let goals = GoalRegistry::new();
        let tracker = GoalTracker::new(&goals);
        assert_eq!(tracker.progress(2, PeriodKind::Daily, &[record(2, 45.0)]), None);
        assert_eq!(tracker.target_formatted(2, PeriodKind::Daily), None);
    }

    #[test]
    fn test_progress_zone_missing_from_records() {
        let mut goals = GoalRegistry::new();
        goals.upsert(5, PeriodKind::Weekly, 30).unwrap();
        let tracker = GoalTracker::new(&goals);
        assert_eq!(tracker.progress(5, PeriodKind::Weekly, &[record(1, 10.0)]), Some(0.0));
    }

    #[test]
    fn test_progress_respects_period() {
        let mut goals = GoalRegistry::new();
        goals.upsert(2, PeriodKind::Weekly, 60).unwrap();
        let tracker = GoalTracker::new(&goals);
        assert_eq!(tracker.progress(2, PeriodKind::Daily, &[record(2, 30.0)]), None);
        assert_eq!(tracker.progress(2, PeriodKind::Weekly, &[record(2, 30.0)]), Some(0.5));
    }

    #[test]
    fn test_format_target_minutes() {
        assert_eq!(format_target_minutes(45), "45m");
        assert_eq!(format_target_minutes(59), "59m");
        assert_eq!(format_target_minutes(60), "1h");
        assert_eq!(format_target_minutes(90), "1h 30m");
        assert_eq!(format_target_minutes(600), "10h");
    }

    #[test]
    fn test_summarize() {
        let mut goals = GoalRegistry::new();
        goals.upsert(1, PeriodKind::Daily, 10).unwrap();
        let records = vec![record(1, 12.0), record(2, 5.0)];

        let status = GoalTracker::new(&goals).summarize(PeriodKind::Daily, &records);
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].target_minutes, Some(10));
        assert_eq!(status[0].progress, Some(1.0));
        assert!(status[0].is_met());
        assert_eq!(status[1].target_minutes, None);
        assert_eq!(status[1].progress, None);
        assert!(!status[1].is_met());
    }
}
