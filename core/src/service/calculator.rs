use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::analyzer::DayAnalyzer;
use crate::error::CalculationError;
use crate::model::summary::CityForecastSummary;
use crate::service::dto::{Stage, StageOutcome};
use crate::service::fetcher::CityForecast;

/// Analyzes one city's raw forecast and summarizes the resulting days.
pub fn summarize(
    analyzer: &dyn DayAnalyzer,
    city: &str,
    raw: &Value,
) -> Result<CityForecastSummary, CalculationError> {
    let days = analyzer.analyze(raw)?;
    CityForecastSummary::from_days(city, days).ok_or(CalculationError::NoUsableDays)
}

/// Runs `summarize` for many cities on the blocking thread pool.
///
/// At most `workers` analyses run at once. A panicking or stuck analysis only
/// costs its own city.
pub struct Calculator {
    analyzer: Arc<dyn DayAnalyzer>,
    workers: usize,
    timeout: Duration,
}

type CalcResult = (String, Result<CityForecastSummary, CalculationError>);

impl Calculator {
    pub fn new(analyzer: Arc<dyn DayAnalyzer>, workers: usize, timeout: Duration) -> Self {
        Self {
            analyzer,
            workers: workers.max(1),
            timeout,
        }
    }

    /// Returns once every dispatched city has finished, failed or timed out.
    pub async fn calculate_all(
        &self,
        forecasts: Vec<CityForecast>,
        cancel: &CancellationToken,
    ) -> StageOutcome<CityForecastSummary> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<CalcResult>();
        let mut units = JoinSet::new();

        for forecast in forecasts {
            let analyzer = Arc::clone(&self.analyzer);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            let timeout = self.timeout;
            let cancel = cancel.clone();

            units.spawn(async move {
                let CityForecast { city, raw } = forecast;
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return,
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                };

                let task_city = city.clone();
                // The permit lives as long as the analysis itself, even past a timeout.
                let work = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    panic::catch_unwind(AssertUnwindSafe(|| {
                        summarize(analyzer.as_ref(), &task_city, &raw)
                    }))
                    .unwrap_or_else(|payload| Err(CalculationError::Panicked(panic_message(payload))))
                });

                let result = match tokio::time::timeout(timeout, work).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => Err(CalculationError::Panicked(e.to_string())),
                    Err(_) => Err(CalculationError::TimedOut(timeout)),
                };
                // The receiver outlives every unit.
                let _ = tx.send((city, result));
            });
        }
        drop(tx);

        // Barrier: nothing moves on until every unit is done.
        while let Some(joined) = units.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Calculation unit failed: {}", e);
            }
        }

        let mut outcome = StageOutcome::new();
        while let Some((city, result)) = rx.recv().await {
            match result {
                Ok(summary) => {
                    tracing::info!(
                        "Calculated {}: temp_avg {}, relevant_cond_hours {}",
                        city,
                        summary.temp_avg,
                        summary.relevant_cond_hours
                    );
                    outcome.items.push(summary);
                }
                Err(e) => {
                    tracing::warn!("No summary for {}: {}", city, e);
                    outcome.drop_city(city, Stage::Calculation, e);
                }
            }
        }
        outcome
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
