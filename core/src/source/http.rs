use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;
use crate::model::catalog::CityQuery;
use crate::source::ForecastSource;

/// Fetches forecast JSON over HTTP.
pub struct HttpForecastSource {
    client: reqwest::Client,
}

impl HttpForecastSource {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ForecastSource for HttpForecastSource {
    async fn fetch(&self, query: &CityQuery) -> Result<Option<Value>, FetchError> {
        let response = self.client.get(&query.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(parse_body(&body))
    }
}

/// Empty bodies, `null`, `{}` and non-JSON payloads all count as no data.
fn parse_body(body: &[u8]) -> Option<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => None,
        Ok(Value::Object(map)) if map.is_empty() => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Forecast body is not JSON: {}", e);
            None
        }
    }
}
