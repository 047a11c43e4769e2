use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::summary::StoredSummary;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Calculation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetch => write!(f, "fetch"),
            Stage::Calculation => write!(f, "calculation"),
        }
    }
}

/// A city that fell out of the run, and why.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DroppedCity {
    pub city: String,
    pub stage: Stage,
    pub reason: String,
}

/// What a stage produced, plus the cities it gave up on.
#[derive(Debug, Clone)]
pub struct StageOutcome<T> {
    pub items: Vec<T>,
    pub dropped: Vec<DroppedCity>,
}

impl<T> StageOutcome<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            dropped: Vec::new(),
        }
    }

    pub fn drop_city(&mut self, city: impl Into<String>, stage: Stage, reason: impl ToString) {
        self.dropped.push(DroppedCity {
            city: city.into(),
            stage,
            reason: reason.to_string(),
        });
    }

    pub fn dropped_cities(&self) -> Vec<&str> {
        self.dropped.iter().map(|d| d.city.as_str()).collect()
    }
}

impl<T> Default for StageOutcome<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// One member of the leader tie-group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LeaderEntry {
    pub city: String,
    pub summary: StoredSummary,
}
