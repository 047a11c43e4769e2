use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::retry::RetryConfig;

const DATA_DIR_NAME: &str = ".tripweather";

/// Worker pool sizes, timeouts and store retry policy for a pipeline run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fetch_workers: usize,
    /// Defaults to the number of CPUs.
    pub calc_workers: usize,
    pub aggregate_workers: usize,
    pub fetch_timeout_secs: u64,
    pub analyze_timeout_secs: u64,
    pub store_retry: RetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_workers: 4,
            calc_workers: num_cpus::get(),
            aggregate_workers: 4,
            fetch_timeout_secs: 30,
            analyze_timeout_secs: 10,
            store_retry: RetryConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config.normalized())
    }

    /// A pool of zero workers would never make progress.
    pub fn normalized(mut self) -> Self {
        self.fetch_workers = self.fetch_workers.max(1);
        self.calc_workers = self.calc_workers.max(1);
        self.aggregate_workers = self.aggregate_workers.max(1);
        self
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn analyze_timeout(&self) -> Duration {
        Duration::from_secs(self.analyze_timeout_secs)
    }
}

/// `~/.tripweather`, unless a directory is given.
pub fn data_dir(base_dir: Option<PathBuf>) -> Result<PathBuf> {
    match base_dir {
        Some(dir) => Ok(dir),
        None => {
            let home_dir = dirs::home_dir()
                .ok_or_else(|| anyhow!("Could not determine home directory"))?;
            Ok(home_dir.join(DATA_DIR_NAME))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripweather.toml");
        fs::write(
            &path,
            "fetch_workers = 8\n\n[store_retry]\nmax_attempts = 5\n",
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.fetch_workers, 8);
        assert_eq!(config.aggregate_workers, 4);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(config.store_retry.max_attempts, 5);
        assert_eq!(config.store_retry.base_delay_ms, 50);
    }

    #[test]
    fn test_zero_workers_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripweather.toml");
        fs::write(&path, "calc_workers = 0\n").unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.calc_workers, 1);
    }

    #[test]
    fn test_explicit_data_dir() {
        let dir = PathBuf::from("/tmp/tripweather-test");
        assert_eq!(data_dir(Some(dir.clone())).unwrap(), dir);
    }
}
