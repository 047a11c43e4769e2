pub mod analyzer;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod retry;
pub mod service;
pub mod source;
pub mod usecase;

pub use analyzer::{DayAnalyzer, DaytimeAnalyzer};
pub use config::{data_dir, PipelineConfig};
pub use error::{AnalysisError, CalculationError, FetchError, PipelineError, SelectionError, StoreError};
pub use model::catalog::{CityCatalog, CityQuery};
pub use model::day::DayRecord;
pub use model::standings::Standings;
pub use model::summary::{CityForecastSummary, RankingKey, StoredSummary};
pub use repository::{FileSummaryStore, InMemorySummaryStore, SummaryStore};
pub use service::dto::{DroppedCity, LeaderEntry, Stage, StageOutcome};
pub use service::selector::select_leaders;
pub use source::{ForecastSource, HttpForecastSource};
pub use usecase::forecast_pipeline::{ForecastPipeline, PipelineReport};
