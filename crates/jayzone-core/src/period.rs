//! Calendar-aligned period boundaries.
//!
//! A period is a half-open range `[start, now)`, where `start` is local
//! midnight of the current day, of the first day of the current week, or of
//! the first day of the current month.
//!
//! All calendar arithmetic goes through the [`Calendar`] trait so that the
//! week start and timezone are explicit inputs rather than ambient state.
//!
//! # Example
//!
//! ```
//! use jayzone_core::period::{resolve, CalendarConfig};
//! use jayzone_types::PeriodKind;
//! use time::macros::datetime;
//! use time::Weekday;
//!
//! let calendar = CalendarConfig::new(Weekday::Sunday, time::UtcOffset::UTC);
//! let now = datetime!(2024-03-06 15:00 UTC); // a Wednesday
//!
//! let range = resolve(PeriodKind::Weekly, now, &calendar);
//! assert_eq!(range.start, datetime!(2024-03-03 00:00 UTC));
//! assert_eq!(range.end, now);
//! ```

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime, Time, UtcOffset, Weekday};
use tracing::warn;

use jayzone_types::PeriodKind;

/// Calendar operations needed to resolve period boundaries.
pub trait Calendar {
    /// First day of the week.
    fn first_weekday(&self) -> Weekday;

    /// Weekday of `instant` in this calendar.
    fn weekday(&self, instant: OffsetDateTime) -> Weekday;

    /// Midnight at the start of the day containing `instant`.
    fn start_of_day(&self, instant: OffsetDateTime) -> OffsetDateTime;

    /// Midnight at the start of the month containing `instant`.
    fn start_of_month(&self, instant: OffsetDateTime) -> OffsetDateTime;

    /// Move `instant` by a whole number of days.
    fn add_days(&self, instant: OffsetDateTime, days: i64) -> OffsetDateTime;
}

/// Fixed-offset calendar with a configurable week start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Day the week begins on.
    pub first_weekday: Weekday,
    /// Offset of local time from UTC.
    pub utc_offset: UtcOffset,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            first_weekday: Weekday::Sunday,
            utc_offset: UtcOffset::UTC,
        }
    }
}

impl CalendarConfig {
    /// Create a calendar configuration.
    pub fn new(first_weekday: Weekday, utc_offset: UtcOffset) -> Self {
        Self {
            first_weekday,
            utc_offset,
        }
    }

    /// Use the system's current UTC offset, falling back to UTC when it
    /// cannot be determined.
    pub fn local(first_weekday: Weekday) -> Self {
        let utc_offset = UtcOffset::current_local_offset().unwrap_or_else(|e| {
            warn!("Could not determine local UTC offset, using UTC: {}", e);
            UtcOffset::UTC
        });
        Self::new(first_weekday, utc_offset)
    }

    /// Set the first weekday.
    pub fn with_first_weekday(mut self, first_weekday: Weekday) -> Self {
        self.first_weekday = first_weekday;
        self
    }

    /// Set the UTC offset.
    pub fn with_utc_offset(mut self, utc_offset: UtcOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    /// Current instant expressed in this calendar's offset.
    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.utc_offset)
    }
}

impl Calendar for CalendarConfig {
    fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    fn weekday(&self, instant: OffsetDateTime) -> Weekday {
        instant.to_offset(self.utc_offset).weekday()
    }

    fn start_of_day(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.utc_offset).replace_time(Time::MIDNIGHT)
    }

    fn start_of_month(&self, instant: OffsetDateTime) -> OffsetDateTime {
        let date = instant.to_offset(self.utc_offset).date();
        let first = date - Duration::days(i64::from(date.day()) - 1);
        first.midnight().assume_offset(self.utc_offset)
    }

    fn add_days(&self, instant: OffsetDateTime, days: i64) -> OffsetDateTime {
        instant + Duration::days(days)
    }
}

/// Half-open range of instants `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Inclusive start.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// Exclusive end.
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl DateRange {
    /// Create a range.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    /// Whether `instant` lies inside the range.
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Whether a Unix timestamp in seconds lies inside the range.
    pub fn contains_timestamp(&self, timestamp: f64) -> bool {
        timestamp >= self.start_timestamp() && timestamp < self.end_timestamp()
    }

    /// Start as Unix seconds.
    pub fn start_timestamp(&self) -> f64 {
        self.start.unix_timestamp_nanos() as f64 / 1_000_000_000.0
    }

    /// End as Unix seconds.
    pub fn end_timestamp(&self) -> f64 {
        self.end.unix_timestamp_nanos() as f64 / 1_000_000_000.0
    }

    /// Length of the range.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Number of days between the week start and `weekday`, in `0..7`.
pub fn days_since_week_start(weekday: Weekday, first_weekday: Weekday) -> i64 {
    let weekday = i64::from(weekday.number_days_from_sunday());
    let first = i64::from(first_weekday.number_days_from_sunday());
    (weekday - first + 7) % 7
}

/// Resolve the range covered by `kind` up to `reference`.
///
/// `end` is always `reference`.
pub fn resolve<C: Calendar + ?Sized>(
    kind: PeriodKind,
    reference: OffsetDateTime,
    calendar: &C,
) -> DateRange {
    let start = match kind {
        PeriodKind::Daily => calendar.start_of_day(reference),
        PeriodKind::Weekly => {
            let delta = days_since_week_start(calendar.weekday(reference), calendar.first_weekday());
            calendar.start_of_day(calendar.add_days(reference, -delta))
        }
        PeriodKind::Monthly => calendar.start_of_month(reference),
    };
    DateRange::new(start, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    fn utc(first: Weekday) -> CalendarConfig {
        CalendarConfig::new(first, UtcOffset::UTC)
    }

    #[test]
    fn test_daily_starts_at_midnight() {
        let now = datetime!(2024-03-06 15:42:10 UTC);
        let range = resolve(PeriodKind::Daily, now, &utc(Weekday::Sunday));
        assert_eq!(range.start, datetime!(2024-03-06 00:00 UTC));
        assert_eq!(range.end, now);
    }

    #[test]
    fn test_daily_at_exact_midnight_is_empty() {
        let now = datetime!(2024-03-06 00:00 UTC);
        let range = resolve(PeriodKind::Daily, now, &utc(Weekday::Sunday));
        assert_eq!(range.start, now);
        assert_eq!(range.duration(), Duration::ZERO);
    }

    #[test]
    fn test_weekly_sunday_start_from_wednesday() {
        let now = datetime!(2024-03-06 15:00 UTC);
        assert_eq!(now.weekday(), Weekday::Wednesday);
        let range = resolve(PeriodKind::Weekly, now, &utc(Weekday::Sunday));
        assert_eq!(range.start, datetime!(2024-03-03 00:00 UTC));
    }

    #[test]
    fn test_weekly_monday_start() {
        let now = datetime!(2024-03-06 15:00 UTC);
        let range = resolve(PeriodKind::Weekly, now, &utc(Weekday::Monday));
        assert_eq!(range.start, datetime!(2024-03-04 00:00 UTC));
    }

    #[test]
    fn test_weekly_on_first_weekday_is_today() {
        let now = datetime!(2024-03-04 09:00 UTC); // Monday
        let range = resolve(PeriodKind::Weekly, now, &utc(Weekday::Monday));
        assert_eq!(range.start, datetime!(2024-03-04 00:00 UTC));
    }

    #[test]
    fn test_weekly_crosses_month_boundary() {
        let now = datetime!(2024-03-01 12:00 UTC); // Friday
        let range = resolve(PeriodKind::Weekly, now, &utc(Weekday::Saturday));
        assert_eq!(range.start, datetime!(2024-02-24 00:00 UTC));
    }

    #[test]
    fn test_monthly_starts_on_first() {
        let now = datetime!(2024-02-29 23:59:59 UTC);
        let range = resolve(PeriodKind::Monthly, now, &utc(Weekday::Sunday));
        assert_eq!(range.start, datetime!(2024-02-01 00:00 UTC));
    }

    #[test]
    fn test_monthly_on_first_day() {
        let now = datetime!(2024-03-01 00:30 UTC);
        let range = resolve(PeriodKind::Monthly, now, &utc(Weekday::Sunday));
        assert_eq!(range.start, datetime!(2024-03-01 00:00 UTC));
    }

    #[test]
    fn test_offset_changes_local_day() {
        // 02:00 UTC on Thursday is still Wednesday evening at UTC-5
        let calendar = CalendarConfig::new(Weekday::Sunday, offset!(-5));
        let now = datetime!(2024-03-07 02:00 UTC);

        let daily = resolve(PeriodKind::Daily, now, &calendar);
        assert_eq!(daily.start, datetime!(2024-03-06 00:00 -5));

        let monthly = resolve(PeriodKind::Monthly, datetime!(2024-04-01 03:00 UTC), &calendar);
        assert_eq!(monthly.start, datetime!(2024-03-01 00:00 -5));
    }

    #[test]
    fn test_days_since_week_start() {
        assert_eq!(days_since_week_start(Weekday::Wednesday, Weekday::Sunday), 3);
        assert_eq!(days_since_week_start(Weekday::Sunday, Weekday::Monday), 6);
        assert_eq!(days_since_week_start(Weekday::Monday, Weekday::Monday), 0);
    }

    #[test]
    fn test_range_contains() {
        let range = DateRange::new(
            datetime!(2024-03-06 00:00 UTC),
            datetime!(2024-03-06 12:00 UTC),
        );
        assert!(range.contains(datetime!(2024-03-06 00:00 UTC)));
        assert!(!range.contains(datetime!(2024-03-06 12:00 UTC)));
        assert!(range.contains_timestamp(range.start_timestamp() + 1.0));
        assert!(!range.contains_timestamp(range.end_timestamp()));
    }

    /// Calendar whose weeks start on Thursday and whose days start at noon.
    struct NoonCalendar;

    impl Calendar for NoonCalendar {
        fn first_weekday(&self) -> Weekday {
            Weekday::Thursday
        }
        fn weekday(&self, instant: OffsetDateTime) -> Weekday {
            (instant - Duration::hours(12)).weekday()
        }
        fn start_of_day(&self, instant: OffsetDateTime) -> OffsetDateTime {
            (instant - Duration::hours(12)).replace_time(Time::MIDNIGHT) + Duration::hours(12)
        }
        fn start_of_month(&self, instant: OffsetDateTime) -> OffsetDateTime {
            self.start_of_day(instant)
        }
        fn add_days(&self, instant: OffsetDateTime, days: i64) -> OffsetDateTime {
            instant + Duration::days(days)
        }
    }

    #[test]
    fn test_resolution_defers_to_calendar() {
        // Wednesday 06:00 belongs to Tuesday's noon-to-noon day
        let now = datetime!(2024-03-06 06:00 UTC);
        let range = resolve(PeriodKind::Daily, now, &NoonCalendar);
        assert_eq!(range.start, datetime!(2024-03-05 12:00 UTC));

        // Tuesday is five days after Thursday
        let weekly = resolve(PeriodKind::Weekly, now, &NoonCalendar);
        assert_eq!(weekly.start, datetime!(2024-02-29 12:00 UTC));
    }
}
