//! Error types for each pipeline stage.

use std::time::Duration;

use thiserror::Error;

/// Why a city's forecast could not be fetched.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("empty response")]
    EmptyResponse,
    #[error("response has no `forecasts` field")]
    InvalidResponse,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("forecast source panicked: {0}")]
    Panicked(String),
    #[error("cancelled")]
    Cancelled,
}

/// Why raw forecast data could not be turned into day records.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("no `forecasts` array in forecast data")]
    MissingForecasts,
    #[error("malformed forecast data: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum CalculationError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("no day has an average temperature")]
    NoUsableDays,
    #[error("analysis timed out after {0:?}")]
    TimedOut(Duration),
    #[error("analysis panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt standings document: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("could not serialize standings: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("store task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Only transient I/O failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Io(_))
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no candidate cities: every city failed to fetch or calculate")]
    NoCandidates,
}

/// Failures that abort a whole pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("pipeline cancelled")]
    Cancelled,
}
