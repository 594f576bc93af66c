use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;
use crate::store::StoreError;

/// Why a single record could not be processed. Caught by the pass that owns
/// the record and never allowed to abort the batch.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Course text unavailable: {0}")]
    CourseTextUnavailable(String),

    #[error("Could not fetch course page: {0}")]
    CourseFetch(#[from] FetchError),

    #[error("Metadata extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("SOP generation failed: {0}")]
    GenerationFailed(String),

    #[error("Prompt file missing or unreadable: {}", .0.display())]
    PromptFileMissing(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RecordError {
    /// Permanent failures are recorded in the store so the record is skipped
    /// on later runs. Everything else is retried.
    pub fn is_permanent(&self) -> bool {
        matches!(self, RecordError::PromptFileMissing(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecordError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that stop a whole pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
}
