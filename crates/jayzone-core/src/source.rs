//! Sample source abstraction.
//!
//! The engine never talks to a health platform directly. Anything that can
//! return heart-rate samples for a date range implements [`SampleSource`]:
//! a platform bridge, the local sample cache, or [`crate::MockSampleSource`]
//! in tests.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use time::OffsetDateTime;
use tracing::warn;

use jayzone_types::{PeriodKind, Sample, ZoneTable, ZoneTimeRecord};

use crate::aggregate::ZoneAggregator;
use crate::error::Result;
use crate::period::{self, Calendar, DateRange};

/// Asynchronous provider of heart-rate samples.
///
/// Implementations must return samples sorted by ascending timestamp. An
/// empty vector means "no data" and is not an error. Timeouts are the
/// implementation's responsibility.
///
/// # Example
///
/// ```ignore
/// use jayzone_core::{SampleSource, DateRange, Result};
///
/// async fn count<S: SampleSource>(source: &S, range: DateRange) -> Result<usize> {
///     Ok(source.fetch_samples(range).await?.len())
/// }
/// ```
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Fetch samples with timestamps in `[range.start, range.end)`.
    async fn fetch_samples(&self, range: DateRange) -> Result<Vec<Sample>>;
}

#[async_trait]
impl<T: SampleSource + ?Sized> SampleSource for Arc<T> {
    async fn fetch_samples(&self, range: DateRange) -> Result<Vec<Sample>> {
        (**self).fetch_samples(range).await
    }
}

/// Fetch samples for `range` and aggregate them over `zones`.
///
/// A failing source is logged and treated as an empty sample set, so this
/// always yields one record per zone.
pub async fn fetch_zone_times<S: SampleSource + ?Sized>(
    source: &S,
    range: DateRange,
    zones: &ZoneTable,
    aggregator: &ZoneAggregator,
) -> Vec<ZoneTimeRecord> {
    let samples = source.fetch_samples(range).await.unwrap_or_else(|e| {
        warn!("Sample fetch failed, using empty sample set: {}", e);
        Vec::new()
    });
    aggregator.aggregate(&samples, zones)
}

/// Records for one period, as returned by [`fetch_all_periods`].
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub period: PeriodKind,
    pub range: DateRange,
    pub records: Vec<ZoneTimeRecord>,
}

/// Fetch and aggregate every period kind as of `now`, concurrently.
///
/// Results are in [`PeriodKind::ALL`] order.
pub async fn fetch_all_periods<S, C>(
    source: &S,
    calendar: &C,
    now: OffsetDateTime,
    zones: &ZoneTable,
    aggregator: &ZoneAggregator,
) -> Vec<PeriodSummary>
where
    S: SampleSource + ?Sized,
    C: Calendar + ?Sized,
{
    let fetches = PeriodKind::ALL.iter().map(|&kind| {
        let range = period::resolve(kind, now, calendar);
        async move {
            PeriodSummary {
                period: kind,
                range,
                records: fetch_zone_times(source, range, zones, aggregator).await,
            }
        }
    });
    join_all(fetches).await
}
