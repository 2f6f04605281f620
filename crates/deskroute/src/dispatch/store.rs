use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::domain::OutcomeRecord;
use super::repository::{OutcomeStore, StoreError};

/// Column order of the outcome log. Matches the field order of [`OutcomeRecord`].
const RECORD_HEADERS: [&str; 8] = [
    "requester_name",
    "requester_id",
    "claimed_department",
    "year",
    "body",
    "predicted_department",
    "delivery_status",
    "recorded_at",
];

/// Outcome log kept as an append-only CSV file.
///
/// Appends are serialized through a process-local lock; rows are never rewritten.
#[derive(Debug)]
pub struct CsvOutcomeStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvOutcomeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::Unavailable("outcome log lock poisoned".to_string()))
    }

    fn open_for_append(&self) -> Result<(fs::File, bool), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_empty = file.metadata()?.len() == 0;
        Ok((file, is_empty))
    }
}

impl OutcomeStore for CsvOutcomeStore {
    fn ensure_ready(&self) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let (file, is_empty) = self.open_for_append()?;
        if is_empty {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            writer.write_record(RECORD_HEADERS)?;
            writer.flush()?;
        }
        Ok(())
    }

    fn append(&self, record: OutcomeRecord) -> Result<(), StoreError> {
        let _guard = self.guard()?;
        let (file, is_empty) = self.open_for_append()?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        writer.serialize(&record)?;
        writer.flush()?;
        Ok(())
    }

    fn history(&self, requester_id: &str, limit: usize) -> Result<Vec<OutcomeRecord>, StoreError> {
        let _guard = self.guard()?;
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new().from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.deserialize::<OutcomeRecord>() {
            let record = row?;
            if record.requester_id == requester_id {
                records.push(record);
            }
        }

        // rows are in append order; reversing first keeps later appends ahead on equal timestamps
        records.reverse();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records.truncate(limit);
        Ok(records)
    }
}
