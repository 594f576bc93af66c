//! Prompt pass: course text → metadata → prompt file, for every record that
//! has never been attempted.
//!
//! Any failure marks the record `FAILED_PROCESSING` so later runs skip it.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::errors::RecordError;
use crate::fetch::ContentSource;
use crate::models::application::{needs_prompt, ApplicationRecord, PromptState};
use crate::pipeline::extractor::MetadataExtractor;
use crate::pipeline::paths::prompt_file_name;
use crate::pipeline::prompt_builder::build_prompt;
use crate::pipeline::{write_verified, PassOutcome};

pub struct PromptPass<'a> {
    source: &'a dyn ContentSource,
    extractor: &'a dyn MetadataExtractor,
    prompts_dir: &'a Path,
}

/// What a successful record produces.
struct PromptArtifact {
    course: String,
    university: String,
    path: PathBuf,
}

impl<'a> PromptPass<'a> {
    pub fn new(
        source: &'a dyn ContentSource,
        extractor: &'a dyn MetadataExtractor,
        prompts_dir: &'a Path,
    ) -> Self {
        Self {
            source,
            extractor,
            prompts_dir,
        }
    }

    /// Processes eligible records in order, mutating them in place.
    pub async fn run(&self, records: &mut [ApplicationRecord]) -> PassOutcome {
        let mut outcome = PassOutcome::default();

        for (index, record) in records.iter_mut().enumerate() {
            if !needs_prompt(record) {
                continue;
            }
            outcome.eligible += 1;

            match self.process(record).await {
                Ok(artifact) => {
                    info!(
                        candidate = %record.candidate_name,
                        row = index + 1,
                        "Prompt written to {}",
                        artifact.path.display()
                    );
                    record.course_name = Some(artifact.course);
                    record.university_name = Some(artifact.university);
                    record.prompt = PromptState::Written(artifact.path);
                    outcome.processed += 1;
                }
                Err(e) => {
                    error!(
                        candidate = %record.candidate_name,
                        row = index + 1,
                        "Prompt generation failed, marking record as failed: {e}"
                    );
                    record.prompt = PromptState::failed();
                    outcome.permanent_failures += 1;
                }
            }
        }

        outcome
    }

    async fn process(&self, record: &ApplicationRecord) -> Result<PromptArtifact, RecordError> {
        let course_text = self.source.fetch_text(&record.course_input).await?;
        if course_text.trim().is_empty() {
            return Err(RecordError::CourseTextUnavailable(format!(
                "no text could be resolved from '{}'",
                record.course_input.chars().take(80).collect::<String>()
            )));
        }

        let metadata = self.extractor.extract(&course_text).await?;

        let resume_text = match record.resume_file.as_deref() {
            Some(identifier) => {
                let text = self.source.fetch_resume(Some(identifier)).await;
                if text.is_none() {
                    warn!(
                        candidate = %record.candidate_name,
                        "Resume '{identifier}' unavailable, continuing without it"
                    );
                }
                text
            }
            None => None,
        };

        let prompt = build_prompt(&metadata, resume_text.as_deref());
        let path = self
            .prompts_dir
            .join(prompt_file_name(&metadata.course, &metadata.university));
        write_verified(&path, &prompt).await?;

        Ok(PromptArtifact {
            course: metadata.course,
            university: metadata.university,
            path,
        })
    }
}
