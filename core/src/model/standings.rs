use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::summary::{CityForecastSummary, StoredSummary};

/// City name → summary mapping kept in ranking order, best first.
///
/// Serializes as a JSON object whose keys appear in ranking order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Standings {
    entries: Vec<(String, StoredSummary)>,
}

impl Standings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for the summary's city, then restores
    /// ranking order.
    pub fn upsert(&mut self, summary: CityForecastSummary) {
        let (city, entry) = summary.into_entry();
        if let Some(pos) = self.entries.iter().position(|(name, _)| *name == city) {
            self.entries[pos].1 = entry;
        } else {
            self.entries.push((city, entry));
        }
        self.sort();
    }

    /// Stable, so cities with equal keys keep their previous relative order.
    pub fn sort(&mut self) {
        self.entries
            .sort_by(|(_, a), (_, b)| a.ranking_key().cmp_desc(&b.ranking_key()));
    }

    pub fn get(&self, city: &str) -> Option<&StoredSummary> {
        self.entries
            .iter()
            .find(|(name, _)| name == city)
            .map(|(_, entry)| entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StoredSummary)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn cities(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|pair| {
            pair[0].1.ranking_key().cmp_desc(&pair[1].1.ranking_key()) != std::cmp::Ordering::Greater
        })
    }
}

impl Serialize for Standings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (city, entry) in &self.entries {
            map.serialize_entry(city, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Standings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StandingsVisitor;

        impl<'de> Visitor<'de> for StandingsVisitor {
            type Value = Standings;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of city names to forecast summaries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Standings, A::Error> {
                let mut entries: Vec<(String, StoredSummary)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((city, entry)) = access.next_entry::<String, StoredSummary>()? {
                    match entries.iter_mut().find(|(name, _)| *name == city) {
                        Some(existing) => existing.1 = entry,
                        None => entries.push((city, entry)),
                    }
                }
                let mut standings = Standings { entries };
                // Hand-edited files may be out of order.
                standings.sort();
                Ok(standings)
            }
        }

        deserializer.deserialize_map(StandingsVisitor)
    }
}
