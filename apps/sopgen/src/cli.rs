use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Paths;

/// Batch generator for Statement-of-Purpose drafts.
#[derive(Debug, Parser)]
#[command(name = "sopgen", version, about)]
pub struct Cli {
    /// Record store CSV (overrides DATA_FILE)
    #[arg(long, global = true, value_name = "FILE")]
    pub data_file: Option<PathBuf>,

    /// Prompt output directory (overrides PROMPTS_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub prompts_dir: Option<PathBuf>,

    /// Resume PDF directory (overrides RESUMES_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub resumes_dir: Option<PathBuf>,

    /// SOP output directory (overrides SOPS_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub sops_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Extract course metadata and write prompts for new records
    Prompts,
    /// Generate SOPs for records with a written prompt
    Sops,
    /// Run the prompt stage, then the SOP stage (default)
    Run,
    /// Append a new application record
    Add {
        /// Candidate name, used in logs
        #[arg(long)]
        name: String,
        /// Course page URL or literal course description
        #[arg(long)]
        course: String,
        /// Resume file name inside the resumes directory
        #[arg(long)]
        resume: Option<String>,
    },
    /// Show how many records are in each state
    Status,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    /// Replaces configured paths with any given on the command line.
    pub fn apply_overrides(&self, paths: &mut Paths) {
        if let Some(p) = &self.data_file {
            paths.data_file = p.clone();
        }
        if let Some(p) = &self.prompts_dir {
            paths.prompts_dir = p.clone();
        }
        if let Some(p) = &self.resumes_dir {
            paths.resumes_dir = p.clone();
        }
        if let Some(p) = &self.sops_dir {
            paths.sops_dir = p.clone();
        }
    }
}
