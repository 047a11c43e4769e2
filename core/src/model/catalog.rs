use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const FIXTURE_BASE_URL: &str = "https://code.s3.yandex.net/async-module";

const DEFAULT_CITIES: [(&str, &str); 15] = [
    ("MOSCOW", "moscow-response.json"),
    ("PARIS", "paris-response.json"),
    ("LONDON", "london-response.json"),
    ("BERLIN", "berlin-response.json"),
    ("BEIJING", "beijing-response.json"),
    ("KAZAN", "kazan-response.json"),
    ("SPETERSBURG", "spetersburg-response.json"),
    ("VOLGOGRAD", "volgograd-response.json"),
    ("NOVOSIBIRSK", "novosibirsk-response.json"),
    ("KALININGRAD", "kaliningrad-response.json"),
    ("ABUDHABI", "abudhabi-response.json"),
    ("WARSZAWA", "warszawa-response.json"),
    ("BUCHAREST", "bucharest-response.json"),
    ("ROMA", "roma-response.json"),
    ("CAIRO", "cairo-response.json"),
];

/// Where to ask for one city's forecast.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct CityQuery {
    pub url: String,
}

impl CityQuery {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct CityCatalog {
    cities: BTreeMap<String, CityQuery>,
}

impl CityCatalog {
    pub fn new() -> Self {
        Self {
            cities: BTreeMap::new(),
        }
    }

    /// Reads a `{ "CITY": "url", ... }` JSON document.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read catalog {}", path.display()))?;
        let catalog = serde_json::from_str(&content)
            .with_context(|| format!("Invalid catalog {}", path.display()))?;
        Ok(catalog)
    }

    pub fn with_city(mut self, name: impl Into<String>, query: CityQuery) -> Self {
        self.insert(name, query);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, query: CityQuery) {
        self.cities.insert(name.into(), query);
    }

    pub fn get(&self, name: &str) -> Option<&CityQuery> {
        self.cities.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CityQuery)> {
        self.cities.iter().map(|(name, query)| (name.as_str(), query))
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

impl Default for CityCatalog {
    fn default() -> Self {
        let cities = DEFAULT_CITIES
            .iter()
            .map(|(name, file)| {
                (name.to_string(), CityQuery::new(format!("{}/{}", FIXTURE_BASE_URL, file)))
            })
            .collect();
        Self { cities }
    }
}
