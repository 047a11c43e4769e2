use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day as produced by a `DayAnalyzer`.
///
/// Either value may be missing when the forecast does not cover enough of the
/// day; missing values serialize as `null`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub temp_avg: Option<f64>,
    pub relevant_cond_hours: Option<u32>,
}

impl DayRecord {
    pub fn new(date: NaiveDate, temp_avg: Option<f64>, relevant_cond_hours: Option<u32>) -> Self {
        Self {
            date,
            temp_avg,
            relevant_cond_hours,
        }
    }
}
