//! The sample cache as a [`SampleSource`].

use async_trait::async_trait;
use tokio::sync::Mutex;

use jayzone_core::{DateRange, Error as CoreError, SampleSource};
use jayzone_types::Sample;

use crate::store::Store;

/// Serves samples from a [`Store`].
///
/// The connection is held behind a mutex for the duration of each query.
#[derive(Debug)]
pub struct StoredSamples {
    store: Mutex<Store>,
}

impl StoredSamples {
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Give the store back.
    pub fn into_inner(self) -> Store {
        self.store.into_inner()
    }
}

#[async_trait]
impl SampleSource for StoredSamples {
    async fn fetch_samples(&self, range: DateRange) -> jayzone_core::Result<Vec<Sample>> {
        let store = self.store.lock().await;
        store
            .query_samples(&range)
            .map_err(|e| CoreError::source_failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use jayzone_core::RefreshCoordinator;
    use jayzone_types::{PeriodKind, ZoneTable};
    use time::macros::datetime;

    #[tokio::test]
    async fn test_coordinator_over_stored_samples() {
        let store = Store::open_in_memory().unwrap();
        let morning = datetime!(2024-03-06 08:00 UTC).unix_timestamp() as f64;
        store
            .insert_samples(&[
                Sample::new(morning, 150),
                Sample::new(morning + 4.0, 152),
                // Previous day
                Sample::new(morning - 86_400.0, 150),
            ])
            .unwrap();

        let coordinator = RefreshCoordinator::new(StoredSamples::new(store));
        let outcome = coordinator
            .set_period_at(
                PeriodKind::Daily,
                Arc::new(ZoneTable::defaults()),
                datetime!(2024-03-06 12:00 UTC),
            )
            .await;

        let records = outcome.records().unwrap();
        let hard = records.iter().find(|r| r.zone_id == 4).unwrap();
        assert_eq!(hard.total_seconds, 9.0);
    }
}
