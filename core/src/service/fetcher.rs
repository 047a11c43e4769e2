use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::model::catalog::{CityCatalog, CityQuery};
use crate::service::dto::{Stage, StageOutcome};
use crate::source::ForecastSource;

/// A city together with its validated raw forecast.
#[derive(Debug, Clone)]
pub struct CityForecast {
    pub city: String,
    pub raw: Value,
}

/// Fetches every catalog city through a bounded pool of workers.
pub struct Fetcher {
    source: Arc<dyn ForecastSource>,
    workers: usize,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(source: Arc<dyn ForecastSource>, workers: usize, timeout: Duration) -> Self {
        Self {
            source,
            workers: workers.max(1),
            timeout,
        }
    }

    /// Cities whose fetch fails in any way are logged and dropped; the rest of
    /// the batch carries on. Output order is unspecified.
    pub async fn fetch_all(
        &self,
        catalog: &CityCatalog,
        cancel: &CancellationToken,
    ) -> StageOutcome<CityForecast> {
        let results: Vec<(String, Result<Value, FetchError>)> =
            stream::iter(catalog.iter().map(|(city, query)| {
                let source = Arc::clone(&self.source);
                let city = city.to_string();
                let query = query.clone();
                let timeout = self.timeout;
                let cancel = cancel.clone();
                async move {
                    // Own task so a panicking source only takes down this city.
                    let handle = tokio::spawn(fetch_one(source, query, timeout, cancel));
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(e) => Err(FetchError::Panicked(e.to_string())),
                    };
                    (city, result)
                }
            }))
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut outcome = StageOutcome::new();
        for (city, result) in results {
            match result {
                Ok(raw) => {
                    tracing::info!("Data for {} fetched", city);
                    outcome.items.push(CityForecast { city, raw });
                }
                Err(e) => {
                    tracing::error!("Invalid fetching data for {}: {}", city, e);
                    outcome.drop_city(city, Stage::Fetch, e);
                }
            }
        }
        outcome
    }
}

async fn fetch_one(
    source: Arc<dyn ForecastSource>,
    query: CityQuery,
    timeout: Duration,
    cancel: CancellationToken,
) -> Result<Value, FetchError> {
    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(FetchError::Cancelled),
        response = tokio::time::timeout(timeout, source.fetch(&query)) => response,
    };
    let data = response.map_err(|_| FetchError::TimedOut(timeout))??;
    validate(data)
}

/// The document must exist and carry a top-level `forecasts` field.
fn validate(data: Option<Value>) -> Result<Value, FetchError> {
    let data = data.ok_or(FetchError::EmptyResponse)?;
    if data.get("forecasts").is_none() {
        return Err(FetchError::InvalidResponse);
    }
    Ok(data)
}
