//! Core types for heart-rate zone data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{ValidationError, ValidationResult};

/// Display hint attached to a zone.
///
/// Hints form a closed set resolved once, when a zone definition is built or
/// deserialized. Unknown names resolve to [`DisplayHint::Gray`].
///
/// # Examples
///
/// ```
/// use jayzone_types::DisplayHint;
///
/// assert_eq!(DisplayHint::from_name("Orange"), DisplayHint::Orange);
/// assert_eq!(DisplayHint::from_name("teal"), DisplayHint::Gray);
/// assert_eq!(DisplayHint::default(), DisplayHint::Gray);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String", into = "&'static str"))]
pub enum DisplayHint {
    /// Light effort, recovery.
    Blue,
    /// Aerobic base.
    Green,
    /// Tempo.
    Yellow,
    /// Threshold.
    Orange,
    /// Maximal effort.
    Red,
    /// Fallback for unrecognized hints.
    #[default]
    Gray,
}

impl DisplayHint {
    /// Resolve a hint from its name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "blue" => DisplayHint::Blue,
            "green" => DisplayHint::Green,
            "yellow" => DisplayHint::Yellow,
            "orange" => DisplayHint::Orange,
            "red" => DisplayHint::Red,
            _ => DisplayHint::Gray,
        }
    }

    /// Lowercase name used for storage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayHint::Blue => "blue",
            DisplayHint::Green => "green",
            DisplayHint::Yellow => "yellow",
            DisplayHint::Orange => "orange",
            DisplayHint::Red => "red",
            DisplayHint::Gray => "gray",
        }
    }
}

impl From<String> for DisplayHint {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<DisplayHint> for &'static str {
    fn from(hint: DisplayHint) -> Self {
        hint.as_str()
    }
}

impl fmt::Display for DisplayHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named BPM band.
///
/// Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneDefinition {
    /// Zone number, unique within a table.
    pub id: u32,
    /// Human-readable label, e.g. "Zone 2 – Fat Burn".
    pub label: String,
    /// Lowest BPM in the zone.
    pub min_bpm: u16,
    /// Highest BPM in the zone.
    pub max_bpm: u16,
    /// How the zone should be drawn.
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_hint: DisplayHint,
}

impl ZoneDefinition {
    /// Create a zone definition.
    pub fn new(
        id: u32,
        label: impl Into<String>,
        min_bpm: u16,
        max_bpm: u16,
        display_hint: DisplayHint,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            min_bpm,
            max_bpm,
            display_hint,
        }
    }

    /// Check whether `bpm` falls inside this zone's inclusive range.
    #[must_use]
    pub fn contains(&self, bpm: u16) -> bool {
        bpm >= self.min_bpm && bpm <= self.max_bpm
    }
}

/// Validate a BPM range for an edit to `zone_id`.
///
/// # Errors
///
/// Returns [`ValidationError::MinNotPositive`] when `min` is zero and
/// [`ValidationError::EmptyRange`] when `min >= max`.
pub fn validate_range(zone_id: u32, min: u16, max: u16) -> ValidationResult<()> {
    if min == 0 {
        return Err(ValidationError::MinNotPositive { zone_id });
    }
    if min >= max {
        return Err(ValidationError::EmptyRange { zone_id, min, max });
    }
    Ok(())
}

/// Ordered set of zone definitions.
///
/// Classification uses the first definition in table order whose range
/// contains a BPM, so overlapping ranges resolve deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<ZoneDefinition>", into = "Vec<ZoneDefinition>")
)]
pub struct ZoneTable {
    zones: Vec<ZoneDefinition>,
}

impl ZoneTable {
    /// Build a table from definitions, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateZone`] if two definitions share an id.
    pub fn new(zones: Vec<ZoneDefinition>) -> ValidationResult<Self> {
        for (i, zone) in zones.iter().enumerate() {
            if zones[..i].iter().any(|z| z.id == zone.id) {
                return Err(ValidationError::DuplicateZone(zone.id));
            }
        }
        Ok(Self { zones })
    }

    /// The standard five-zone table.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            zones: vec![
                ZoneDefinition::new(1, "Zone 1 – Recovery", 50, 103, DisplayHint::Blue),
                ZoneDefinition::new(2, "Zone 2 – Fat Burn", 104, 123, DisplayHint::Green),
                ZoneDefinition::new(3, "Zone 3 – Cardio", 124, 143, DisplayHint::Yellow),
                ZoneDefinition::new(4, "Zone 4 – Hard", 144, 162, DisplayHint::Orange),
                ZoneDefinition::new(5, "Zone 5 – Peak", 163, 220, DisplayHint::Red),
            ],
        }
    }

    /// Definitions in table order.
    pub fn zones(&self) -> &[ZoneDefinition] {
        &self.zones
    }

    /// Iterate over definitions in table order.
    pub fn iter(&self) -> impl Iterator<Item = &ZoneDefinition> {
        self.zones.iter()
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the table has no zones.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Look up a zone by id.
    pub fn get(&self, id: u32) -> Option<&ZoneDefinition> {
        self.zones.iter().find(|z| z.id == id)
    }

    /// Return the first zone whose range contains `bpm`.
    pub fn classify(&self, bpm: u16) -> Option<&ZoneDefinition> {
        self.zones.iter().find(|z| z.contains(bpm))
    }

    /// Change the BPM range of an existing zone.
    ///
    /// Id, label, hint and table length are left untouched.
    ///
    /// # Errors
    ///
    /// Rejects unknown ids and invalid ranges (see [`validate_range`]); the
    /// table is unchanged on error.
    pub fn update_range(&mut self, id: u32, min_bpm: u16, max_bpm: u16) -> ValidationResult<()> {
        validate_range(id, min_bpm, max_bpm)?;
        let zone = self
            .zones
            .iter_mut()
            .find(|z| z.id == id)
            .ok_or(ValidationError::UnknownZone(id))?;
        zone.min_bpm = min_bpm;
        zone.max_bpm = max_bpm;
        Ok(())
    }

    /// Replace every definition with the default table.
    pub fn reset_to_defaults(&mut self) {
        *self = Self::defaults();
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl TryFrom<Vec<ZoneDefinition>> for ZoneTable {
    type Error = ValidationError;

    fn try_from(zones: Vec<ZoneDefinition>) -> ValidationResult<Self> {
        Self::new(zones)
    }
}

impl From<ZoneTable> for Vec<ZoneDefinition> {
    fn from(table: ZoneTable) -> Self {
        table.zones
    }
}

impl<'a> IntoIterator for &'a ZoneTable {
    type Item = &'a ZoneDefinition;
    type IntoIter = std::slice::Iter<'a, ZoneDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.zones.iter()
    }
}

/// One heart-rate observation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    /// Beats per minute.
    pub bpm: u16,
}

impl Sample {
    /// Create a sample from a raw timestamp.
    pub fn new(timestamp: f64, bpm: u16) -> Self {
        Self { timestamp, bpm }
    }

    /// Create a sample from a date-time.
    pub fn at(time: OffsetDateTime, bpm: u16) -> Self {
        let nanos = time.unix_timestamp_nanos();
        Self {
            timestamp: nanos as f64 / 1_000_000_000.0,
            bpm,
        }
    }

    /// The sample's timestamp as a UTC date-time, if representable.
    pub fn datetime(&self) -> Option<OffsetDateTime> {
        if !self.timestamp.is_finite() {
            return None;
        }
        let nanos = (self.timestamp * 1_000_000_000.0).round() as i128;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
    }
}

/// Total time spent in one zone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZoneTimeRecord {
    /// Zone id.
    pub zone_id: u32,
    /// Zone label at aggregation time.
    pub zone_label: String,
    /// Accumulated seconds.
    pub total_seconds: f64,
}

impl ZoneTimeRecord {
    /// Render the total as `"1h 05m"`, `"4m 09s"` or `"37s"`.
    ///
    /// ```
    /// use jayzone_types::ZoneTimeRecord;
    ///
    /// let record = ZoneTimeRecord { zone_id: 1, zone_label: "Z1".into(), total_seconds: 3900.0 };
    /// assert_eq!(record.formatted_time(), "1h 05m");
    /// ```
    #[must_use]
    pub fn formatted_time(&self) -> String {
        let total = self.total_seconds.max(0.0) as u64;
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            format!("{}h {:02}m", hours, minutes)
        } else if minutes > 0 {
            format!("{}m {:02}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}

/// Granularity over which zone time and goals are evaluated.
///
/// # Display vs Serialization
///
/// `Display` gives the dashboard label ("Today", "This Week", "This Month"),
/// serde uses lowercase names ("daily", "weekly", "monthly").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PeriodKind {
    /// Since local midnight.
    #[default]
    Daily,
    /// Since the start of the configured week.
    Weekly,
    /// Since the first of the month.
    Monthly,
}

impl PeriodKind {
    /// All period kinds, shortest first.
    pub const ALL: [PeriodKind; 3] = [PeriodKind::Daily, PeriodKind::Weekly, PeriodKind::Monthly];

    /// Lowercase storage name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKind::Daily => "daily",
            PeriodKind::Weekly => "weekly",
            PeriodKind::Monthly => "monthly",
        }
    }

    /// Dashboard label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            PeriodKind::Daily => "Today",
            PeriodKind::Weekly => "This Week",
            PeriodKind::Monthly => "This Month",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PeriodKind {
    type Err = ValidationError;

    /// Parse either the storage name or the dashboard label.
    ///
    /// ```
    /// use jayzone_types::PeriodKind;
    ///
    /// assert_eq!("weekly".parse::<PeriodKind>(), Ok(PeriodKind::Weekly));
    /// assert_eq!("This Month".parse::<PeriodKind>(), Ok(PeriodKind::Monthly));
    /// assert!("yearly".parse::<PeriodKind>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "today" => Ok(PeriodKind::Daily),
            "weekly" | "week" | "this week" => Ok(PeriodKind::Weekly),
            "monthly" | "month" | "this month" => Ok(PeriodKind::Monthly),
            _ => Err(ValidationError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Target time for one zone within one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalEntry {
    /// Zone the goal applies to.
    pub zone_id: u32,
    /// Period the goal applies to.
    pub period: PeriodKind,
    /// Target time in minutes.
    pub target_minutes: u32,
}

impl GoalEntry {
    /// Create a goal entry.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTarget`] for a zero-minute target.
    pub fn new(zone_id: u32, period: PeriodKind, target_minutes: u32) -> ValidationResult<Self> {
        if target_minutes == 0 {
            return Err(ValidationError::InvalidTarget { zone_id });
        }
        Ok(Self {
            zone_id,
            period,
            target_minutes,
        })
    }

    /// Registry key for this entry.
    pub fn key(&self) -> (u32, PeriodKind) {
        (self.zone_id, self.period)
    }

    /// Target expressed in seconds.
    pub fn target_seconds(&self) -> f64 {
        f64::from(self.target_minutes) * 60.0
    }
}
