use parking_lot::Mutex;

use crate::error::StoreError;
use crate::model::standings::Standings;
use crate::model::summary::CityForecastSummary;
use crate::repository::traits::SummaryStore;

/// Non-durable store for tests and dry runs.
#[derive(Default)]
pub struct InMemorySummaryStore {
    standings: Mutex<Standings>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SummaryStore for InMemorySummaryStore {
    fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn merge(&self, summary: &CityForecastSummary) -> Result<(), StoreError> {
        self.standings.lock().upsert(summary.clone());
        Ok(())
    }

    fn get_all(&self) -> Result<Standings, StoreError> {
        Ok(self.standings.lock().clone())
    }

    fn reset(&self) -> Result<(), StoreError> {
        *self.standings.lock() = Standings::new();
        Ok(())
    }
}
