//! Per-state counts over the record collection, for the `status` command.

use std::fmt;

use crate::models::application::{needs_sop, ApplicationRecord, PromptState, SopState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub total: usize,
    pub prompts_pending: usize,
    pub prompts_written: usize,
    pub prompts_failed: usize,
    /// Records the next SOP stage would pick up.
    pub sops_pending: usize,
    pub sops_written: usize,
    pub sops_missing_prompt: usize,
}

pub fn summarize(records: &[ApplicationRecord]) -> StatusReport {
    let mut report = StatusReport {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        match record.prompt {
            PromptState::Pending => report.prompts_pending += 1,
            PromptState::Failed(_) => report.prompts_failed += 1,
            PromptState::Written(_) => report.prompts_written += 1,
        }
        match record.sop {
            SopState::Written(_) => report.sops_written += 1,
            SopState::MissingPrompt(_) => report.sops_missing_prompt += 1,
            SopState::Pending if needs_sop(record) => report.sops_pending += 1,
            SopState::Pending => {}
        }
    }

    report
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Records: {}", self.total)?;
        writeln!(
            f,
            "Prompts: {} pending, {} written, {} failed",
            self.prompts_pending, self.prompts_written, self.prompts_failed
        )?;
        write!(
            f,
            "SOPs:    {} pending, {} written, {} missing prompt",
            self.sops_pending, self.sops_written, self.sops_missing_prompt
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_summarize_counts_each_state() {
        let fresh = ApplicationRecord::new("A", "x");
        let mut failed = ApplicationRecord::new("B", "x");
        failed.prompt = PromptState::failed();
        let mut ready = ApplicationRecord::new("C", "x");
        ready.prompt = PromptState::Written(PathBuf::from("p/c_prompt.txt"));
        let mut done = ready.clone();
        done.sop = SopState::Written(PathBuf::from("s/c_sop.txt"));
        let mut missing = ready.clone();
        missing.sop = SopState::missing_prompt();

        let report = summarize(&[fresh, failed, ready, done, missing]);

        assert_eq!(
            report,
            StatusReport {
                total: 5,
                prompts_pending: 1,
                prompts_written: 3,
                prompts_failed: 1,
                sops_pending: 1,
                sops_written: 1,
                sops_missing_prompt: 1,
            }
        );
    }

    #[test]
    fn test_display_lists_all_counts() {
        let text = summarize(&[]).to_string();
        assert!(text.starts_with("Records: 0\n"));
        assert!(text.contains("0 missing prompt"));
    }
}
