use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::analyzer::DayAnalyzer;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, StoreError};
use crate::model::catalog::CityCatalog;
use crate::repository::SummaryStore;
use crate::service::aggregator::Aggregator;
use crate::service::calculator::Calculator;
use crate::service::dto::{DroppedCity, LeaderEntry};
use crate::service::fetcher::Fetcher;
use crate::service::selector::select_leaders;
use crate::source::ForecastSource;

/// Result of a full run: the leader tie-group plus what was lost on the way.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub leaders: Vec<LeaderEntry>,
    pub dropped: Vec<DroppedCity>,
    pub merged: usize,
}

/// fetch → calculate → aggregate → select, each stage draining fully before
/// the next one starts.
pub struct ForecastPipeline<R: SummaryStore + 'static> {
    source: Arc<dyn ForecastSource>,
    analyzer: Arc<dyn DayAnalyzer>,
    store: Arc<R>,
    config: PipelineConfig,
}

impl<R: SummaryStore + 'static> ForecastPipeline<R> {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        analyzer: Arc<dyn DayAnalyzer>,
        store: Arc<R>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source,
            analyzer,
            store,
            config: config.normalized(),
        }
    }

    pub fn store(&self) -> &Arc<R> {
        &self.store
    }

    /// Runs the pipeline and returns only the leader tie-group.
    pub async fn run_pipeline(&self, catalog: &CityCatalog) -> Result<Vec<LeaderEntry>, PipelineError> {
        let report = self.run(catalog, &CancellationToken::new()).await?;
        Ok(report.leaders)
    }

    pub async fn run(
        &self,
        catalog: &CityCatalog,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline", %run_id);
        self.run_stages(run_id, catalog, cancel).instrument(span).await
    }

    async fn run_stages(
        &self,
        run_id: Uuid,
        catalog: &CityCatalog,
        cancel: &CancellationToken,
    ) -> Result<PipelineReport, PipelineError> {
        tracing::info!("Forecasting {} cities", catalog.len());
        self.blocking_store_call(|store| store.initialize()).await?;

        let fetcher = Fetcher::new(
            Arc::clone(&self.source),
            self.config.fetch_workers,
            self.config.fetch_timeout(),
        );
        let fetched = fetcher.fetch_all(catalog, cancel).await;
        check_cancelled(cancel)?;
        tracing::info!(
            "Fetch stage done: {} fetched, {} dropped",
            fetched.items.len(),
            fetched.dropped.len()
        );
        let mut dropped = fetched.dropped;

        let calculator = Calculator::new(
            Arc::clone(&self.analyzer),
            self.config.calc_workers,
            self.config.analyze_timeout(),
        );
        let calculated = calculator.calculate_all(fetched.items, cancel).await;
        check_cancelled(cancel)?;
        tracing::info!(
            "Calculation stage done: {} summaries, {} dropped",
            calculated.items.len(),
            calculated.dropped.len()
        );
        dropped.extend(calculated.dropped);

        let aggregator = Aggregator::new(
            Arc::clone(&self.store),
            self.config.aggregate_workers,
            self.config.store_retry.clone(),
        );
        let merged = aggregator.merge_all(calculated.items).await?;
        check_cancelled(cancel)?;

        let standings = self.blocking_store_call(|store| store.get_all()).await?;
        let leaders = select_leaders(&standings)?;
        for leader in &leaders {
            tracing::info!(
                "Best city {}: temp_avg {}, relevant_cond_hours {}",
                leader.city,
                leader.summary.temp_avg,
                leader.summary.relevant_cond_hours
            );
        }

        Ok(PipelineReport {
            run_id,
            leaders,
            dropped,
            merged,
        })
    }

    async fn blocking_store_call<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&R) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || call(store.as_ref()))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), PipelineError> {
    if cancel.is_cancelled() {
        tracing::warn!("Pipeline cancelled");
        return Err(PipelineError::Cancelled);
    }
    Ok(())
}
