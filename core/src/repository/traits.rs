use crate::error::StoreError;
use crate::model::standings::Standings;
use crate::model::summary::CityForecastSummary;

/// Durable city → summary mapping shared by concurrent writers.
pub trait SummaryStore: Send + Sync {
    /// Creates an empty mapping if nothing is persisted yet. Idempotent.
    fn initialize(&self) -> Result<(), StoreError>;
    /// Inserts or replaces one city's entry. The read, update, re-sort and
    /// write happen as one step with respect to other `merge` callers.
    fn merge(&self, summary: &CityForecastSummary) -> Result<(), StoreError>;
    fn get_all(&self) -> Result<Standings, StoreError>;
    /// Drops every entry.
    fn reset(&self) -> Result<(), StoreError>;
}
