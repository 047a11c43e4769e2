use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::error::StoreError;
use crate::model::standings::Standings;
use crate::model::summary::CityForecastSummary;
use crate::repository::traits::SummaryStore;

const DEFAULT_FILE_NAME: &str = "standings.json";

/// One lock per standings document, shared by every store in the process.
static DOCUMENT_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn document_lock(path: &Path) -> Arc<Mutex<()>> {
    let mut locks = DOCUMENT_LOCKS.lock();
    Arc::clone(locks.entry(path.to_path_buf()).or_default())
}

/// Standings kept in a single JSON document.
///
/// Every write goes to a temporary file in the same directory which is then
/// renamed over the document, so readers always see a complete version.
pub struct FileSummaryStore {
    file_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileSummaryStore {
    /// Uses `<data_dir>/standings.json`, creating the directory if needed.
    pub fn new(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir)?;
        let file_path = data_dir.canonicalize()?.join(DEFAULT_FILE_NAME);
        Ok(FileSummaryStore {
            lock: document_lock(&file_path),
            file_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_standings(&self) -> Result<Standings, StoreError> {
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(StoreError::Corrupt)
    }

    fn write_standings(&self, standings: &Standings) -> Result<(), StoreError> {
        let dir = self.file_path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, standings).map_err(StoreError::Serialize)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.file_path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl SummaryStore for FileSummaryStore {
    fn initialize(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        if !self.file_path.exists() {
            self.write_standings(&Standings::new())?;
            tracing::debug!("Created empty standings at {}", self.file_path.display());
        }
        Ok(())
    }

    fn merge(&self, summary: &CityForecastSummary) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut standings = self.read_standings()?;
        standings.upsert(summary.clone());
        self.write_standings(&standings)?;
        tracing::debug!("Merged {} into standings ({} cities)", summary.city, standings.len());
        Ok(())
    }

    fn get_all(&self) -> Result<Standings, StoreError> {
        if !self.file_path.exists() {
            return Ok(Standings::new());
        }
        self.read_standings()
    }

    fn reset(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        self.write_standings(&Standings::new())
    }
}
