//! Zone time aggregation and goal tracking engine.
//!
//! This crate turns a stream of heart-rate samples into time spent in each
//! configured heart-rate zone over a calendar period, and compares that time
//! against per-zone goals.
//!
//! # Features
//!
//! - **Aggregation**: attribute capped durations to the first matching zone
//! - **Periods**: resolve today / this week / this month against a calendar
//! - **Goals**: per-zone, per-period targets and clamped progress
//! - **Refresh coordination**: latest-request-wins fetching with events
//! - **Mock source**: scripted sample source for tests
//!
//! # Quick Start
//!
//! ```
//! use jayzone_core::aggregate;
//! use jayzone_types::{Sample, ZoneTable};
//!
//! let samples = vec![
//!     Sample::new(0.0, 110),
//!     Sample::new(6.0, 115),
//!     Sample::new(30.0, 160),
//! ];
//! let records = aggregate::aggregate(&samples, &ZoneTable::defaults());
//!
//! // 6s + 10s (capped) in zone 2, 5s trailing in zone 4
//! assert_eq!(records[1].total_seconds, 16.0);
//! assert_eq!(records[3].total_seconds, 5.0);
//! ```

pub mod aggregate;
pub mod error;
pub mod events;
pub mod goals;
pub mod mock;
pub mod period;
pub mod refresh;
pub mod source;

pub use jayzone_types::types;

pub use aggregate::{AggregatorConfig, Coverage, ZoneAggregator, format_total, total_seconds};
pub use error::{Error, Result};
pub use events::{EventDispatcher, EventReceiver, EventSender, RefreshEvent};
pub use goals::{GoalRegistry, GoalTracker, ZoneGoalStatus, format_target_minutes};
pub use mock::{MockSampleSource, MockSampleSourceBuilder};
pub use period::{Calendar, CalendarConfig, DateRange};
pub use refresh::{
    CoordinatorConfig, DashboardSnapshot, RefreshCoordinator, RefreshOutcome, RefreshTicket,
    RequestToken,
};
pub use source::{PeriodSummary, SampleSource, fetch_all_periods, fetch_zone_times};
