use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::day::DayRecord;

/// (average temperature, favorable hours); higher is better for both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingKey {
    pub temp_avg: f64,
    pub relevant_cond_hours: u32,
}

impl RankingKey {
    /// Ordering in which the best key comes first.
    pub fn cmp_desc(&self, other: &Self) -> Ordering {
        // Must agree with `==`, so -0.0 and 0.0 tie.
        other
            .temp_avg
            .partial_cmp(&self.temp_avg)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.relevant_cond_hours.cmp(&self.relevant_cond_hours))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CityForecastSummary {
    pub city: String,
    pub temp_avg: f64,
    pub relevant_cond_hours: u32,
    pub days: Vec<DayRecord>,
}

impl CityForecastSummary {
    /// Summarizes analyzed days.
    ///
    /// Returns `None` when no day carries a temperature, since the average is
    /// undefined then.
    pub fn from_days(city: impl Into<String>, days: Vec<DayRecord>) -> Option<Self> {
        let temps: Vec<f64> = days.iter().filter_map(|d| d.temp_avg).collect();
        if temps.is_empty() {
            return None;
        }
        let mean = temps.iter().sum::<f64>() / temps.len() as f64;
        let relevant_cond_hours = days.iter().filter_map(|d| d.relevant_cond_hours).sum();

        Some(Self {
            city: city.into(),
            temp_avg: round_to_tenth(mean),
            relevant_cond_hours,
            days,
        })
    }

    pub fn ranking_key(&self) -> RankingKey {
        RankingKey {
            temp_avg: self.temp_avg,
            relevant_cond_hours: self.relevant_cond_hours,
        }
    }

    /// Splits off the city name, which becomes the store key.
    pub fn into_entry(self) -> (String, StoredSummary) {
        let entry = StoredSummary {
            temp_avg: self.temp_avg,
            relevant_cond_hours: self.relevant_cond_hours,
            days: self.days,
        };
        (self.city, entry)
    }
}

/// Store value: a summary without the redundant city name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredSummary {
    pub temp_avg: f64,
    pub relevant_cond_hours: u32,
    #[serde(default)]
    pub days: Vec<DayRecord>,
}

impl StoredSummary {
    pub fn ranking_key(&self) -> RankingKey {
        RankingKey {
            temp_avg: self.temp_avg,
            relevant_cond_hours: self.relevant_cond_hours,
        }
    }
}

fn round_to_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // Small negative means round to -0.0.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
