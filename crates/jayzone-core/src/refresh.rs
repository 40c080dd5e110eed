//! Latest-request-wins refresh coordination.
//!
//! Every refresh mints a new [`RequestToken`]. A fetch that completes after a
//! newer token has been minted is stale: its samples are dropped and visible
//! state is left alone. In-flight fetches are never cancelled; the sample
//! source may keep running, its result is simply ignored.
//!
//! ```text
//!          refresh / set_period
//!   Idle ─────────────────────────▶ Fetching ──┐
//!    ▲                                  │      │ newer refresh:
//!    │    completion for latest token   │      │ token superseded
//!    └──────────────────────────────────┘ ◀────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use jayzone_core::{MockSampleSource, RefreshCoordinator};
//! use jayzone_types::{PeriodKind, ZoneTable};
//!
//! #[tokio::main]
//! async fn main() {
//!     let coordinator = RefreshCoordinator::new(MockSampleSource::new());
//!     let zones = Arc::new(ZoneTable::defaults());
//!
//!     let outcome = coordinator.set_period(PeriodKind::Weekly, zones).await;
//!     assert!(outcome.is_applied());
//!
//!     let snapshot = coordinator.snapshot().await;
//!     assert!(!snapshot.is_loading);
//!     assert_eq!(snapshot.records.len(), 5);
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use jayzone_types::{PeriodKind, Sample, ZoneTable, ZoneTimeRecord};

use crate::aggregate::{self, AggregatorConfig, ZoneAggregator};
use crate::error::Result;
use crate::events::{EventDispatcher, RefreshEvent};
use crate::period::{self, CalendarConfig, DateRange};
use crate::source::SampleSource;

/// Identity of one refresh request.
///
/// Tokens are only compared for equality; a larger value is newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Build a token from its raw generation number.
    pub fn from_raw(generation: u64) -> Self {
        Self(generation)
    }

    /// Raw generation number.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Configuration for the refresh coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Calendar used to resolve period ranges.
    pub calendar: CalendarConfig,
    /// Duration attribution settings.
    pub aggregator: AggregatorConfig,
    /// Period selected before the first `set_period`.
    pub initial_period: PeriodKind,
    /// Event channel capacity.
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig::default(),
            aggregator: AggregatorConfig::default(),
            initial_period: PeriodKind::Daily,
            event_capacity: 100,
        }
    }
}

/// Immutable copy of the coordinator's visible state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Currently selected period.
    pub period: PeriodKind,
    /// Range covered by `records`, once a result has been applied.
    pub range: Option<DateRange>,
    /// Records from the most recent applied request.
    pub records: Vec<ZoneTimeRecord>,
    /// Whether the latest request is still in flight.
    pub is_loading: bool,
    /// Most recently minted token.
    pub latest: Option<RequestToken>,
}

impl DashboardSnapshot {
    /// Total seconds across all zones.
    pub fn total_seconds(&self) -> f64 {
        aggregate::total_seconds(&self.records)
    }
}

/// A started request, carried from [`RefreshCoordinator::begin`] to
/// [`RefreshCoordinator::complete`].
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    token: RequestToken,
    period: PeriodKind,
    range: DateRange,
    zones: Arc<ZoneTable>,
}

impl RefreshTicket {
    /// Token minted for this request.
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Period selected when the request started.
    pub fn period(&self) -> PeriodKind {
        self.period
    }

    /// Range to fetch.
    pub fn range(&self) -> DateRange {
        self.range
    }
}

/// Result of completing a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The request was the latest; its records are now visible.
    Applied {
        token: RequestToken,
        records: Vec<ZoneTimeRecord>,
    },
    /// A newer request superseded this one; nothing changed.
    Stale {
        token: RequestToken,
        current: RequestToken,
    },
}

impl RefreshOutcome {
    /// Whether the result was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self, RefreshOutcome::Applied { .. })
    }

    /// Applied records, if any.
    pub fn records(&self) -> Option<&[ZoneTimeRecord]> {
        match self {
            RefreshOutcome::Applied { records, .. } => Some(records),
            RefreshOutcome::Stale { .. } => None,
        }
    }

    /// Token of the completed request.
    pub fn token(&self) -> RequestToken {
        match self {
            RefreshOutcome::Applied { token, .. } | RefreshOutcome::Stale { token, .. } => *token,
        }
    }
}

#[derive(Debug)]
struct CoordinatorState {
    period: PeriodKind,
    generation: u64,
    latest: Option<RequestToken>,
    range: Option<DateRange>,
    records: Vec<ZoneTimeRecord>,
    is_loading: bool,
}

/// Drives fetch-and-aggregate cycles and rejects stale responses.
///
/// The coordinator is `Send + Sync` when its source is; several refreshes may
/// be awaited concurrently and complete in any order.
pub struct RefreshCoordinator<S> {
    source: S,
    config: CoordinatorConfig,
    aggregator: ZoneAggregator,
    state: RwLock<CoordinatorState>,
    events: EventDispatcher,
}

impl<S> fmt::Debug for RefreshCoordinator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: SampleSource> RefreshCoordinator<S> {
    /// Create a coordinator with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, CoordinatorConfig::default())
    }

    /// Create a coordinator with full configuration.
    pub fn with_config(source: S, config: CoordinatorConfig) -> Self {
        Self {
            source,
            aggregator: ZoneAggregator::new(config.aggregator),
            state: RwLock::new(CoordinatorState {
                period: config.initial_period,
                generation: 0,
                latest: None,
                range: None,
                records: Vec::new(),
                is_loading: false,
            }),
            events: EventDispatcher::new(config.event_capacity),
            config,
        }
    }

    /// Get the event dispatcher for subscribing to events.
    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Get the coordinator configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Get the sample source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Copy of the visible state.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let state = self.state.read().await;
        DashboardSnapshot {
            period: state.period,
            range: state.range,
            records: state.records.clone(),
            is_loading: state.is_loading,
            latest: state.latest,
        }
    }

    /// Currently selected period.
    pub async fn period(&self) -> PeriodKind {
        self.state.read().await.period
    }

    /// Whether the latest request is still in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading
    }

    /// Start a request as of the calendar's current time.
    pub async fn begin(&self, zones: Arc<ZoneTable>) -> RefreshTicket {
        self.begin_at(zones, self.config.calendar.now()).await
    }

    /// Start a request as of `now`: mint a token, resolve the range and
    /// enter the loading state.
    pub async fn begin_at(&self, zones: Arc<ZoneTable>, now: OffsetDateTime) -> RefreshTicket {
        let ticket = {
            let mut state = self.state.write().await;
            state.generation += 1;
            let token = RequestToken(state.generation);
            let range = period::resolve(state.period, now, &self.config.calendar);
            state.latest = Some(token);
            state.is_loading = true;
            RefreshTicket {
                token,
                period: state.period,
                range,
                zones,
            }
        };

        debug!(
            token = %ticket.token,
            period = ticket.period.as_str(),
            "Refresh started"
        );
        self.events.send(RefreshEvent::Started {
            token: ticket.token,
            period: ticket.period,
            range: ticket.range,
        });
        ticket
    }

    /// Finish a request with the fetch result.
    ///
    /// A stale ticket is dropped without touching state. A failed fetch is
    /// treated as zero samples.
    pub async fn complete(
        &self,
        ticket: RefreshTicket,
        fetched: Result<Vec<Sample>>,
    ) -> RefreshOutcome {
        let mut state = self.state.write().await;

        let current = state.latest.unwrap_or(ticket.token);
        if current != ticket.token {
            drop(state);
            debug!(token = %ticket.token, current = %current, "Discarding stale refresh");
            self.events.send(RefreshEvent::Discarded {
                token: ticket.token,
                current,
            });
            return RefreshOutcome::Stale {
                token: ticket.token,
                current,
            };
        }

        let samples = match fetched {
            Ok(samples) => samples,
            Err(e) => {
                warn!(token = %ticket.token, "Sample fetch failed, applying empty result: {}", e);
                self.events.send(RefreshEvent::FetchFailed {
                    token: ticket.token,
                    error: e.to_string(),
                });
                Vec::new()
            }
        };

        let records = self.aggregator.aggregate(&samples, &ticket.zones);
        state.records = records.clone();
        state.range = Some(ticket.range);
        state.is_loading = false;
        drop(state);

        let total_seconds = aggregate::total_seconds(&records);
        info!(
            token = %ticket.token,
            period = ticket.period.as_str(),
            samples = samples.len(),
            total_seconds,
            "Refresh applied"
        );
        self.events.send(RefreshEvent::Applied {
            token: ticket.token,
            period: ticket.period,
            sample_count: samples.len(),
            total_seconds,
        });

        RefreshOutcome::Applied {
            token: ticket.token,
            records,
        }
    }

    /// Fetch and aggregate the selected period as of now.
    pub async fn refresh(&self, zones: Arc<ZoneTable>) -> RefreshOutcome {
        self.refresh_at(zones, self.config.calendar.now()).await
    }

    /// Fetch and aggregate the selected period as of `now`.
    #[tracing::instrument(level = "debug", skip(self, zones))]
    pub async fn refresh_at(&self, zones: Arc<ZoneTable>, now: OffsetDateTime) -> RefreshOutcome {
        let ticket = self.begin_at(zones, now).await;
        let fetched = self.source.fetch_samples(ticket.range).await;
        self.complete(ticket, fetched).await
    }

    /// Select a period and refresh it as of now.
    pub async fn set_period(&self, period: PeriodKind, zones: Arc<ZoneTable>) -> RefreshOutcome {
        self.set_period_at(period, zones, self.config.calendar.now())
            .await
    }

    /// Select a period and refresh it as of `now`.
    ///
    /// Always starts a new request, even when the period is unchanged, so any
    /// request in flight becomes stale.
    pub async fn set_period_at(
        &self,
        period: PeriodKind,
        zones: Arc<ZoneTable>,
        now: OffsetDateTime,
    ) -> RefreshOutcome {
        let previous = {
            let mut state = self.state.write().await;
            std::mem::replace(&mut state.period, period)
        };
        if previous != period {
            debug!(from = previous.as_str(), to = period.as_str(), "Period changed");
            self.events.send(RefreshEvent::PeriodChanged {
                from: previous,
                to: period,
            });
        }
        self.refresh_at(zones, now).await
    }
}
