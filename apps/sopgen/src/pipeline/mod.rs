//! Two-stage SOP pipeline over the record store.
//! Stage 1 (`prompt_pass`): course text → metadata → prompt file.
//! Stage 2 (`sop_pass`): prompt file → SOP file.
//! Each stage loads the whole collection, walks it in order and writes it back
//! only when something changed.

pub mod extractor;
pub mod paths;
pub mod prompt_builder;
pub mod prompt_pass;
pub mod prompts;
pub mod sop_pass;
pub mod sop_writer;
pub mod status;

use std::path::Path;

use tracing::{debug, info};

use crate::errors::{PipelineError, RecordError};
use crate::store::RecordStore;

use prompt_pass::PromptPass;
use sop_pass::SopPass;

/// Counts from one sweep over the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub eligible: usize,
    pub processed: usize,
    /// Recorded in the store with a sentinel.
    pub permanent_failures: usize,
    /// Left untouched for the next run.
    pub transient_failures: usize,
}

impl PassOutcome {
    /// True when at least one record was mutated and the collection must be saved.
    pub fn changed(&self) -> bool {
        self.processed > 0 || self.permanent_failures > 0
    }
}

/// Writes `contents` to `path`, creating parent directories, and checks the
/// file on disk has the expected length.
pub(crate) async fn write_verified(path: &Path, contents: &str) -> Result<(), RecordError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RecordError::io(parent, e))?;
    }

    tokio::fs::write(path, contents)
        .await
        .map_err(|e| RecordError::io(path, e))?;

    let written = tokio::fs::metadata(path)
        .await
        .map_err(|e| RecordError::io(path, e))?;
    if written.len() != contents.len() as u64 {
        return Err(RecordError::io(
            path,
            std::io::Error::other(format!(
                "wrote {} bytes, expected {}",
                written.len(),
                contents.len()
            )),
        ));
    }

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Stage 1: load, run the prompt pass, save if anything changed.
pub async fn run_prompt_stage(
    store: &dyn RecordStore,
    pass: &PromptPass<'_>,
) -> Result<PassOutcome, PipelineError> {
    let mut records = store.load()?;
    if records.is_empty() {
        info!("Record store is empty, nothing to do for the prompt stage");
        return Ok(PassOutcome::default());
    }

    let outcome = pass.run(&mut records).await;
    finish_stage("Prompt", store, &records, outcome)?;
    Ok(outcome)
}

/// Stage 2: load, run the SOP pass, save if anything changed.
pub async fn run_sop_stage(
    store: &dyn RecordStore,
    pass: &SopPass<'_>,
) -> Result<PassOutcome, PipelineError> {
    let mut records = store.load()?;
    if records.is_empty() {
        info!("Record store is empty, nothing to do for the SOP stage");
        return Ok(PassOutcome::default());
    }

    let outcome = pass.run(&mut records).await;
    finish_stage("SOP", store, &records, outcome)?;
    Ok(outcome)
}

fn finish_stage(
    stage: &str,
    store: &dyn RecordStore,
    records: &[crate::models::application::ApplicationRecord],
    outcome: PassOutcome,
) -> Result<(), PipelineError> {
    if outcome.eligible == 0 {
        info!("{stage} stage: no eligible records out of {}", records.len());
        return Ok(());
    }

    info!(
        "{stage} stage: {} eligible, {} newly processed, {} failed permanently, {} left for retry",
        outcome.eligible,
        outcome.processed,
        outcome.permanent_failures,
        outcome.transient_failures
    );

    if outcome.changed() {
        store.save(records)?;
        info!("{stage} stage: record store updated");
    } else {
        info!("{stage} stage: no changes to save");
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Hand-written fakes for the pipeline seams.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::errors::RecordError;
    use crate::fetch::{is_url, ContentSource, FetchError};
    use crate::models::application::ApplicationRecord;
    use crate::pipeline::extractor::{CourseMetadata, MetadataExtractor};
    use crate::pipeline::sop_writer::SopGenerator;
    use crate::store::{RecordStore, StoreError};

    pub fn metadata(course: &str, university: &str) -> CourseMetadata {
        CourseMetadata {
            course: course.to_string(),
            university: university.to_string(),
            country: "Finland".to_string(),
            course_info: "Research-led programme.".to_string(),
        }
    }

    /// Returns literal text unchanged; URLs fail when `fail_urls` is set.
    #[derive(Default)]
    pub struct FakeSource {
        resumes: HashMap<String, String>,
        fail_urls: bool,
    }

    impl FakeSource {
        pub fn with_resume(mut self, identifier: &str, text: &str) -> Self {
            self.resumes.insert(identifier.to_string(), text.to_string());
            self
        }

        pub fn failing_urls(mut self) -> Self {
            self.fail_urls = true;
            self
        }
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn fetch_text(&self, input: &str) -> Result<String, FetchError> {
            if is_url(input) && self.fail_urls {
                return Err(FetchError::Status {
                    url: input.to_string(),
                    status: 503,
                });
            }
            Ok(input.trim().to_string())
        }

        async fn fetch_resume(&self, identifier: Option<&str>) -> Option<String> {
            identifier.and_then(|id| self.resumes.get(id).cloned())
        }
    }

    /// Returns fixed metadata, or fails when the course text contains `fail_marker`.
    pub struct FakeExtractor {
        result: CourseMetadata,
        fail_marker: Option<String>,
        calls: Mutex<usize>,
    }

    impl FakeExtractor {
        pub fn succeeding(result: CourseMetadata) -> Self {
            Self {
                result,
                fail_marker: None,
                calls: Mutex::new(0),
            }
        }

        pub fn failing_on(marker: &str, result: CourseMetadata) -> Self {
            Self {
                result,
                fail_marker: Some(marker.to_string()),
                calls: Mutex::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl MetadataExtractor for FakeExtractor {
        async fn extract(&self, course_text: &str) -> Result<CourseMetadata, RecordError> {
            *self.calls.lock().unwrap() += 1;
            match &self.fail_marker {
                Some(marker) if course_text.contains(marker.as_str()) => Err(
                    RecordError::ExtractionFailed("API error (status 400): bad request".to_string()),
                ),
                _ => Ok(self.result.clone()),
            }
        }
    }

    /// Replays scripted results, then repeats `fallback` once the script runs out.
    pub struct FakeGenerator {
        script: Mutex<VecDeque<Result<String, String>>>,
        fallback: Result<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        pub fn always(text: &str) -> Self {
            Self::scripted_then(Vec::new(), Ok(text.to_string()))
        }

        pub fn scripted(script: Vec<Result<String, String>>) -> Self {
            Self::scripted_then(script, Err("script exhausted".to_string()))
        }

        pub fn scripted_then(
            script: Vec<Result<String, String>>,
            fallback: Result<String, String>,
        ) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts_seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SopGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, RecordError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            next.map_err(RecordError::GenerationFailed)
        }
    }

    /// In-memory store that counts saves.
    #[derive(Default)]
    pub struct MemoryStore {
        records: Mutex<Vec<ApplicationRecord>>,
        saves: Mutex<usize>,
    }

    impl MemoryStore {
        pub fn with(records: Vec<ApplicationRecord>) -> Self {
            Self {
                records: Mutex::new(records),
                saves: Mutex::new(0),
            }
        }

        pub fn saves(&self) -> usize {
            *self.saves.lock().unwrap()
        }

        pub fn snapshot(&self) -> Vec<ApplicationRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    impl RecordStore for MemoryStore {
        fn load(&self) -> Result<Vec<ApplicationRecord>, StoreError> {
            Ok(self.snapshot())
        }

        fn save(&self, records: &[ApplicationRecord]) -> Result<(), StoreError> {
            *self.records.lock().unwrap() = records.to_vec();
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }
}
