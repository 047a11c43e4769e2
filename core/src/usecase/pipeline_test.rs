#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    use crate::analyzer::DayAnalyzer;
    use crate::config::PipelineConfig;
    use crate::error::{AnalysisError, FetchError, PipelineError, SelectionError};
    use crate::model::catalog::{CityCatalog, CityQuery};
    use crate::model::day::DayRecord;
    use crate::repository::{FileSummaryStore, InMemorySummaryStore, SummaryStore};
    use crate::service::dto::Stage;
    use crate::source::ForecastSource;
    use crate::usecase::forecast_pipeline::ForecastPipeline;

    /// Serves canned documents keyed by URL; unknown URLs answer with nothing.
    struct MockSource {
        responses: HashMap<String, Value>,
    }

    #[async_trait]
    impl ForecastSource for MockSource {
        async fn fetch(&self, query: &CityQuery) -> Result<Option<Value>, FetchError> {
            Ok(self.responses.get(&query.url).cloned())
        }
    }

    /// `{"forecasts": [[temp, hours], ...]}` → one day per pair.
    struct MockAnalyzer;

    impl DayAnalyzer for MockAnalyzer {
        fn analyze(&self, raw: &Value) -> Result<Vec<DayRecord>, AnalysisError> {
            let rows = raw["forecasts"].as_array().ok_or(AnalysisError::MissingForecasts)?;
            Ok(rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    DayRecord::new(
                        NaiveDate::from_ymd_opt(2022, 5, 26 + i as u32).unwrap(),
                        row[0].as_f64(),
                        row[1].as_u64().map(|h| h as u32),
                    )
                })
                .collect())
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            calc_workers: 2,
            fetch_timeout_secs: 5,
            analyze_timeout_secs: 5,
            ..PipelineConfig::default()
        }
    }

    fn setup(responses: &[(&str, Value)]) -> (CityCatalog, Arc<MockSource>) {
        let mut catalog = CityCatalog::new();
        let mut map = HashMap::new();
        for (city, response) in responses {
            let url = format!("mock://{}", city);
            catalog.insert(*city, CityQuery::new(url.clone()));
            if !response.is_null() {
                map.insert(url, response.clone());
            }
        }
        (catalog, Arc::new(MockSource { responses: map }))
    }

    fn pipeline<R: SummaryStore + 'static>(source: Arc<MockSource>, store: Arc<R>) -> ForecastPipeline<R> {
        ForecastPipeline::new(source, Arc::new(MockAnalyzer), store, config())
    }

    #[tokio::test]
    async fn test_tied_leaders_are_reported_together() {
        let (catalog, source) = setup(&[
            ("A", json!({"forecasts": [[20.0, 5]]})),
            ("B", json!({"forecasts": [[19.0, 2], [21.0, 3]]})),
            ("C", json!({"forecasts": [[18.0, 9]]})),
        ]);
        let store = Arc::new(InMemorySummaryStore::new());

        let leaders = pipeline(source, Arc::clone(&store)).run_pipeline(&catalog).await.unwrap();

        let mut cities: Vec<&str> = leaders.iter().map(|l| l.city.as_str()).collect();
        cities.sort();
        assert_eq!(cities, vec!["A", "B"]);
        assert!(leaders.iter().all(|l| l.summary.temp_avg == 20.0 && l.summary.relevant_cond_hours == 5));
        assert_eq!(store.get_all().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_block_others() {
        let (catalog, source) = setup(&[
            ("MOSCOW", json!({"forecasts": [[13.0, 11]]})),
            ("PARIS", Value::Null),
            ("LONDON", json!({"info": "no forecasts here"})),
            ("CAIRO", json!({"forecasts": [[31.0, 44]]})),
        ]);
        let store = Arc::new(InMemorySummaryStore::new());

        let report = pipeline(source, Arc::clone(&store))
            .run(&catalog, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.merged, 2);
        assert_eq!(report.leaders.len(), 1);
        assert_eq!(report.leaders[0].city, "CAIRO");
        let mut dropped: Vec<&str> = report.dropped.iter().map(|d| d.city.as_str()).collect();
        dropped.sort();
        assert_eq!(dropped, vec!["LONDON", "PARIS"]);
        assert!(report.dropped.iter().all(|d| d.stage == Stage::Fetch));
        assert_eq!(store.get_all().unwrap().cities(), vec!["CAIRO", "MOSCOW"]);
    }

    #[tokio::test]
    async fn test_unusable_days_are_dropped_at_calculation() {
        let (catalog, source) = setup(&[
            ("KAZAN", json!({"forecasts": [[null, 3], [null, null]]})),
            ("ROMA", json!({"forecasts": [[22.0, 10]]})),
        ]);

        let report = pipeline(source, Arc::new(InMemorySummaryStore::new()))
            .run(&catalog, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.leaders[0].city, "ROMA");
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].city, "KAZAN");
        assert_eq!(report.dropped[0].stage, Stage::Calculation);
    }

    #[tokio::test]
    async fn test_every_fetch_failing_means_no_candidates() {
        let (catalog, source) = setup(&[("PARIS", Value::Null), ("LONDON", Value::Null)]);

        let err = pipeline(source, Arc::new(InMemorySummaryStore::new()))
            .run_pipeline(&catalog)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Selection(SelectionError::NoCandidates)));
    }

    #[tokio::test]
    async fn test_file_store_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileSummaryStore::new(dir.path()).unwrap());
        let responses: Vec<(String, Value)> = (0..12)
            .map(|i| (format!("CITY{:02}", i), json!({"forecasts": [[i as f64, i], [null, 1]]})))
            .collect();
        let borrowed: Vec<(&str, Value)> =
            responses.iter().map(|(c, v)| (c.as_str(), v.clone())).collect();
        let (catalog, source) = setup(&borrowed);

        let report = pipeline(source, Arc::clone(&store))
            .run(&catalog, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.merged, 12);
        assert_eq!(report.leaders.len(), 1);
        assert_eq!(report.leaders[0].city, "CITY11");
        assert_eq!(report.leaders[0].summary.relevant_cond_hours, 12);
        assert_eq!(report.leaders[0].summary.days.len(), 2);

        let standings = store.get_all().unwrap();
        assert_eq!(standings.len(), 12);
        assert!(standings.is_sorted());
    }

    #[tokio::test]
    async fn test_store_survives_between_runs() {
        let store = Arc::new(InMemorySummaryStore::new());

        let (first, source) = setup(&[("CAIRO", json!({"forecasts": [[31.0, 44]]}))]);
        pipeline(source, Arc::clone(&store)).run_pipeline(&first).await.unwrap();

        let (second, source) = setup(&[("MOSCOW", json!({"forecasts": [[13.0, 11]]}))]);
        let leaders = pipeline(source, Arc::clone(&store)).run_pipeline(&second).await.unwrap();

        assert_eq!(leaders[0].city, "CAIRO");
        assert_eq!(store.get_all().unwrap().cities(), vec!["CAIRO", "MOSCOW"]);
    }

    #[tokio::test]
    async fn test_cancelled_run() {
        let (catalog, source) = setup(&[("ROMA", json!({"forecasts": [[22.0, 10]]}))]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = pipeline(source, Arc::new(InMemorySummaryStore::new()))
            .run(&catalog, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled));
    }

    #[test]
    fn test_config_timeouts() {
        assert_eq!(config().fetch_timeout(), Duration::from_secs(5));
    }
}
