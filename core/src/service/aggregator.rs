use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::error::StoreError;
use crate::model::summary::CityForecastSummary;
use crate::repository::SummaryStore;
use crate::retry::{with_retry, RetryConfig};

/// Merges summaries into a store from a bounded pool of workers.
///
/// The store's own lock serializes the merges; the pool only bounds how many
/// wait on it.
pub struct Aggregator<R: SummaryStore + 'static> {
    store: Arc<R>,
    workers: usize,
    retry: RetryConfig,
}

impl<R: SummaryStore + 'static> Aggregator<R> {
    pub fn new(store: Arc<R>, workers: usize, retry: RetryConfig) -> Self {
        Self {
            store,
            workers: workers.max(1),
            retry,
        }
    }

    /// Returns the number of merged summaries. The first merge that still
    /// fails after its retries fails the whole batch.
    pub async fn merge_all(&self, summaries: Vec<CityForecastSummary>) -> Result<usize, StoreError> {
        let merged: Vec<()> = stream::iter(summaries.into_iter().map(|summary| {
            let store = Arc::clone(&self.store);
            let retry = self.retry.clone();
            async move {
                let summary = Arc::new(summary);
                with_retry(
                    || merge_blocking(Arc::clone(&store), Arc::clone(&summary)),
                    &retry,
                    StoreError::is_retryable,
                )
                .await
                .map_err(|e| {
                    tracing::error!("Could not merge {}: {}", summary.city, e);
                    e
                })
            }
        }))
        .buffer_unordered(self.workers)
        .try_collect()
        .await?;

        tracing::info!("Merged {} summaries into the store", merged.len());
        Ok(merged.len())
    }
}

async fn merge_blocking<R: SummaryStore + 'static>(
    store: Arc<R>,
    summary: Arc<CityForecastSummary>,
) -> Result<(), StoreError> {
    tokio::task::spawn_blocking(move || store.merge(&summary))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::standings::Standings;
    use crate::repository::InMemorySummaryStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn summary(city: &str, temp: f64, hours: u32) -> CityForecastSummary {
        CityForecastSummary {
            city: city.to_string(),
            temp_avg: temp,
            relevant_cond_hours: hours,
            days: vec![],
        }
    }

    fn quick_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            jitter_factor: 0.0,
        }
    }

    /// Fails the first `failures` merges with an I/O error.
    struct FlakyStore {
        inner: InMemorySummaryStore,
        failures: AtomicU32,
    }

    impl SummaryStore for FlakyStore {
        fn initialize(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn merge(&self, summary: &CityForecastSummary) -> Result<(), StoreError> {
            let left = self.failures.load(Ordering::SeqCst);
            if left > 0 {
                self.failures.store(left - 1, Ordering::SeqCst);
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk hiccup",
                )));
            }
            self.inner.merge(summary)
        }

        fn get_all(&self) -> Result<Standings, StoreError> {
            self.inner.get_all()
        }

        fn reset(&self) -> Result<(), StoreError> {
            self.inner.reset()
        }
    }

    #[tokio::test]
    async fn test_merge_all() {
        let store = Arc::new(InMemorySummaryStore::new());
        let aggregator = Aggregator::new(Arc::clone(&store), 4, quick_retry());

        let merged = aggregator
            .merge_all(vec![
                summary("MOSCOW", 12.0, 4),
                summary("CAIRO", 30.0, 40),
                summary("PARIS", 15.0, 9),
                summary("MOSCOW", 12.0, 4),
            ])
            .await
            .unwrap();

        assert_eq!(merged, 4);
        let standings = store.get_all().unwrap();
        assert_eq!(standings.cities(), vec!["CAIRO", "PARIS", "MOSCOW"]);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let store = Arc::new(FlakyStore {
            inner: InMemorySummaryStore::new(),
            failures: AtomicU32::new(2),
        });
        let aggregator = Aggregator::new(Arc::clone(&store), 1, quick_retry());

        let merged = aggregator.merge_all(vec![summary("ROMA", 21.0, 11)]).await.unwrap();

        assert_eq!(merged, 1);
        assert_eq!(store.get_all().unwrap().cities(), vec!["ROMA"]);
    }

    #[tokio::test]
    async fn test_persistent_failure_is_fatal() {
        let store = Arc::new(FlakyStore {
            inner: InMemorySummaryStore::new(),
            failures: AtomicU32::new(100),
        });
        let aggregator = Aggregator::new(Arc::clone(&store), 1, quick_retry());

        let err = aggregator.merge_all(vec![summary("ROMA", 21.0, 11)]).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.failures.load(Ordering::SeqCst), 97);
    }
}
