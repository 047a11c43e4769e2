pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;
use crate::model::catalog::CityQuery;

pub use http::HttpForecastSource;

/// Supplies raw forecast documents for cities.
///
/// `Ok(None)` means the source answered with nothing usable.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, query: &CityQuery) -> Result<Option<Value>, FetchError>;
}
