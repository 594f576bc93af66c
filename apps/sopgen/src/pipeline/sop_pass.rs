//! SOP pass: prompt file → SOP file, for every record with a written prompt
//! and no SOP outcome.
//!
//! A missing prompt file is permanent (`FAILED_MISSING_PROMPT`). Every other
//! failure leaves the record untouched so the next run retries it.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::errors::RecordError;
use crate::models::application::{needs_sop, ApplicationRecord, SopState};
use crate::pipeline::paths::sop_path_for;
use crate::pipeline::sop_writer::SopGenerator;
use crate::pipeline::{write_verified, PassOutcome};

pub struct SopPass<'a> {
    generator: &'a dyn SopGenerator,
    sops_dir: &'a Path,
}

impl<'a> SopPass<'a> {
    pub fn new(generator: &'a dyn SopGenerator, sops_dir: &'a Path) -> Self {
        Self {
            generator,
            sops_dir,
        }
    }

    pub async fn run(&self, records: &mut [ApplicationRecord]) -> PassOutcome {
        let mut outcome = PassOutcome::default();

        for (index, record) in records.iter_mut().enumerate() {
            if !needs_sop(record) {
                continue;
            }
            let Some(prompt_path) = record.prompt.path().map(Path::to_path_buf) else {
                continue;
            };
            outcome.eligible += 1;

            match self.process(&prompt_path).await {
                Ok(sop_path) => {
                    info!(
                        candidate = %record.candidate_name,
                        row = index + 1,
                        "SOP written to {}",
                        sop_path.display()
                    );
                    record.sop = SopState::Written(sop_path);
                    outcome.processed += 1;
                }
                Err(e) if e.is_permanent() => {
                    error!(
                        candidate = %record.candidate_name,
                        row = index + 1,
                        "{e}; marking record so it is not retried"
                    );
                    record.sop = SopState::missing_prompt();
                    outcome.permanent_failures += 1;
                }
                Err(e) => {
                    warn!(
                        candidate = %record.candidate_name,
                        row = index + 1,
                        "SOP generation failed, will retry on next run: {e}"
                    );
                    outcome.transient_failures += 1;
                }
            }
        }

        outcome
    }

    async fn process(&self, prompt_path: &Path) -> Result<PathBuf, RecordError> {
        let prompt = match tokio::fs::read_to_string(prompt_path).await {
            Ok(text) if !text.trim().is_empty() => text,
            _ => return Err(RecordError::PromptFileMissing(prompt_path.to_path_buf())),
        };

        let sop = self.generator.generate(&prompt).await?;

        let sop_path = sop_path_for(prompt_path, self.sops_dir);
        write_verified(&sop_path, &sop).await?;
        Ok(sop_path)
    }
}
