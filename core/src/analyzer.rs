use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::AnalysisError;
use crate::model::day::DayRecord;

const DAY_HOURS_START: u32 = 9;
const DAY_HOURS_END: u32 = 19;
const GOOD_CONDITIONS: [&str; 4] = ["clear", "partly-cloudy", "cloudy", "overcast"];

/// Turns a raw forecast document into per-day records, in document order.
pub trait DayAnalyzer: Send + Sync {
    fn analyze(&self, raw: &Value) -> Result<Vec<DayRecord>, AnalysisError>;
}

/// Judges each day by its daytime hours only.
///
/// A day missing any hour of the daytime window gets no values at all.
#[derive(Debug, Clone)]
pub struct DaytimeAnalyzer {
    hours_start: u32,
    hours_end: u32,
    good_conditions: Vec<String>,
}

impl Default for DaytimeAnalyzer {
    fn default() -> Self {
        Self {
            hours_start: DAY_HOURS_START,
            hours_end: DAY_HOURS_END,
            good_conditions: GOOD_CONDITIONS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawForecast {
    forecasts: Vec<RawDay>,
}

#[derive(Deserialize)]
struct RawDay {
    date: NaiveDate,
    #[serde(default)]
    hours: Vec<RawHour>,
}

#[derive(Deserialize)]
struct RawHour {
    #[serde(deserialize_with = "hour_from_str_or_int")]
    hour: u32,
    temp: f64,
    condition: String,
}

fn hour_from_str_or_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Hour {
        Int(u32),
        Text(String),
    }

    match Hour::deserialize(deserializer)? {
        Hour::Int(hour) => Ok(hour),
        Hour::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl DaytimeAnalyzer {
    fn analyze_day(&self, day: RawDay) -> DayRecord {
        let daytime: Vec<&RawHour> = day
            .hours
            .iter()
            .filter(|h| (self.hours_start..=self.hours_end).contains(&h.hour))
            .collect();

        let covered = (self.hours_start..=self.hours_end)
            .all(|hour| daytime.iter().any(|h| h.hour == hour));
        if !covered {
            return DayRecord::new(day.date, None, None);
        }

        let temp_avg = daytime.iter().map(|h| h.temp).sum::<f64>() / daytime.len() as f64;
        let good_hours = daytime
            .iter()
            .filter(|h| self.good_conditions.iter().any(|c| *c == h.condition))
            .count() as u32;

        DayRecord::new(day.date, Some((temp_avg * 1000.0).round() / 1000.0), Some(good_hours))
    }
}

impl DayAnalyzer for DaytimeAnalyzer {
    fn analyze(&self, raw: &Value) -> Result<Vec<DayRecord>, AnalysisError> {
        if raw.get("forecasts").is_none() {
            return Err(AnalysisError::MissingForecasts);
        }
        let forecast = RawForecast::deserialize(raw)?;
        Ok(forecast
            .forecasts
            .into_iter()
            .map(|day| self.analyze_day(day))
            .collect())
    }
}
