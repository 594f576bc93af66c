//! Application records: one row per candidate/course pairing.
//!
//! `RecordRow` is the on-disk shape (one optional string per CSV column).
//! `ApplicationRecord` is the typed shape the pipeline works with: the two status
//! columns become enums so "not attempted", "permanently failed" and "done" are
//! distinct variants instead of magic strings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Written to `promptPath` when the prompt pass gives up on a record.
pub const PROMPT_FAILED_SENTINEL: &str = "FAILED_PROCESSING";

/// Written to `sopPath` when the SOP pass finds no usable prompt file.
pub const SOP_MISSING_PROMPT_SENTINEL: &str = "FAILED_MISSING_PROMPT";

/// Column order of the record store. Changing it is a schema change.
pub const RECORD_HEADER: [&str; 7] = [
    "candidateName",
    "resumeFile",
    "courseInput",
    "courseName",
    "universityName",
    "promptPath",
    "sopPath",
];

/// State of the prompt stage for a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PromptState {
    /// Never attempted (cell absent or blank).
    #[default]
    Pending,
    /// Permanent failure, never retried. Holds the cell text as read so
    /// annotated markers survive a rewrite.
    Failed(String),
    Written(PathBuf),
}

impl PromptState {
    /// A freshly recorded failure.
    pub fn failed() -> Self {
        Self::Failed(PROMPT_FAILED_SENTINEL.to_string())
    }

    fn from_cell(cell: Option<String>) -> Self {
        match cell {
            None => Self::Pending,
            Some(s) if s.trim().is_empty() => Self::Pending,
            Some(s) if s.contains(PROMPT_FAILED_SENTINEL) => Self::Failed(s),
            Some(s) => Self::Written(PathBuf::from(s)),
        }
    }

    fn to_cell(&self) -> Option<String> {
        match self {
            Self::Pending => None,
            Self::Failed(cell) => Some(cell.clone()),
            Self::Written(path) => Some(path.to_string_lossy().into_owned()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Written(path) => Some(path),
            _ => None,
        }
    }
}

/// State of the SOP stage for a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SopState {
    /// Not attempted yet, or every earlier attempt failed transiently.
    #[default]
    Pending,
    /// The referenced prompt file was missing; never retried. Holds the cell
    /// text as read.
    MissingPrompt(String),
    Written(PathBuf),
}

impl SopState {
    /// A freshly recorded missing-prompt outcome.
    pub fn missing_prompt() -> Self {
        Self::MissingPrompt(SOP_MISSING_PROMPT_SENTINEL.to_string())
    }

    fn from_cell(cell: Option<String>) -> Self {
        match cell {
            None => Self::Pending,
            Some(s) if s.trim().is_empty() => Self::Pending,
            Some(s) if s.trim() == SOP_MISSING_PROMPT_SENTINEL => Self::MissingPrompt(s),
            Some(s) => Self::Written(PathBuf::from(s)),
        }
    }

    fn to_cell(&self) -> Option<String> {
        match self {
            Self::Pending => None,
            Self::MissingPrompt(cell) => Some(cell.clone()),
            Self::Written(path) => Some(path.to_string_lossy().into_owned()),
        }
    }
}

/// Raw CSV row. Empty cells deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    pub candidate_name: Option<String>,
    pub resume_file: Option<String>,
    pub course_input: Option<String>,
    pub course_name: Option<String>,
    pub university_name: Option<String>,
    pub prompt_path: Option<String>,
    pub sop_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationRecord {
    /// Display name used in logs. Not a key.
    pub candidate_name: String,
    pub resume_file: Option<String>,
    /// URL or literal course description.
    pub course_input: String,
    pub course_name: Option<String>,
    pub university_name: Option<String>,
    pub prompt: PromptState,
    pub sop: SopState,
}

impl ApplicationRecord {
    pub fn new(candidate_name: impl Into<String>, course_input: impl Into<String>) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            course_input: course_input.into(),
            ..Default::default()
        }
    }

    pub fn with_resume(mut self, resume_file: impl Into<String>) -> Self {
        self.resume_file = Some(resume_file.into());
        self
    }
}

/// Prompt pass eligibility: only records that were never attempted.
pub fn needs_prompt(record: &ApplicationRecord) -> bool {
    record.prompt == PromptState::Pending
}

/// SOP pass eligibility: a written prompt and no SOP outcome yet.
pub fn needs_sop(record: &ApplicationRecord) -> bool {
    matches!(record.prompt, PromptState::Written(_)) && record.sop == SopState::Pending
}

fn non_blank(cell: Option<String>) -> Option<String> {
    cell.filter(|s| !s.trim().is_empty())
}

impl From<RecordRow> for ApplicationRecord {
    fn from(row: RecordRow) -> Self {
        Self {
            candidate_name: row.candidate_name.unwrap_or_default(),
            resume_file: non_blank(row.resume_file),
            course_input: row.course_input.unwrap_or_default(),
            course_name: non_blank(row.course_name),
            university_name: non_blank(row.university_name),
            prompt: PromptState::from_cell(row.prompt_path),
            sop: SopState::from_cell(row.sop_path),
        }
    }
}

impl From<&ApplicationRecord> for RecordRow {
    fn from(record: &ApplicationRecord) -> Self {
        Self {
            candidate_name: Some(record.candidate_name.clone()),
            resume_file: record.resume_file.clone(),
            course_input: Some(record.course_input.clone()),
            course_name: record.course_name.clone(),
            university_name: record.university_name.clone(),
            prompt_path: record.prompt.to_cell(),
            sop_path: record.sop.to_cell(),
        }
    }
}
