//! Record store: the ordered collection of application records on disk.
//!
//! The pipeline only ever loads the whole collection and writes the whole
//! collection back. Row order is the identity of a record.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::models::application::{ApplicationRecord, RecordRow, RECORD_HEADER};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Load/store seam used by the pipeline. `CsvRecordStore` is the only
/// production implementation.
pub trait RecordStore {
    fn load(&self) -> Result<Vec<ApplicationRecord>, StoreError>;
    fn save(&self, records: &[ApplicationRecord]) -> Result<(), StoreError>;
}

/// CSV-backed record store with a fixed header.
#[derive(Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with only the header row if it does not exist yet.
    fn ensure_exists(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        self.save(&[])?;
        info!("Created empty record store at {}", self.path.display());
        Ok(())
    }

    /// Appends one record and rewrites the file.
    pub fn append(&self, record: ApplicationRecord) -> Result<usize, StoreError> {
        let mut records = self.load()?;
        records.push(record);
        self.save(&records)?;
        Ok(records.len())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore for CsvRecordStore {
    fn load(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
        self.ensure_exists()?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        // Rows are taken as-is; a row without usable course input fails in the
        // prompt pass, not here.
        let mut records = Vec::new();
        for result in reader.deserialize::<RecordRow>() {
            records.push(ApplicationRecord::from(result?));
        }

        debug!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Writes to a temp file next to the target and renames it into place.
    fn save(&self, records: &[ApplicationRecord]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(RECORD_HEADER)?;
            for record in records {
                writer.serialize(RecordRow::from(record))?;
            }
            writer.flush().map_err(|source| self.io_error(source))?;
        }
        tmp.as_file_mut()
            .flush()
            .map_err(|source| self.io_error(source))?;

        tmp.persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        debug!("Saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
