mod cli;
mod config;
mod errors;
mod fetch;
mod llm_client;
mod models;
mod pipeline;
mod store;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::{Config, Paths};
use crate::fetch::HttpContentFetcher;
use crate::llm_client::gemini::GeminiClient;
use crate::llm_client::openrouter::OpenRouterClient;
use crate::llm_client::build_http_client;
use crate::models::application::ApplicationRecord;
use crate::pipeline::extractor::LlmMetadataExtractor;
use crate::pipeline::prompt_pass::PromptPass;
use crate::pipeline::sop_pass::SopPass;
use crate::pipeline::sop_writer::LlmSopGenerator;
use crate::store::{CsvRecordStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok(); // load .env if present; ignore if missing

    // Initialize structured logging
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sopgen v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command() {
        Command::Add {
            name,
            course,
            resume,
        } => add_record(&cli, name, course, resume),
        Command::Status => show_status(&cli),
        command => run_stages(&cli, &command).await,
    };

    if let Err(e) = &result {
        error!("{e:#}");
    }
    result
}

fn local_paths(cli: &Cli) -> Paths {
    let mut paths = Paths::from_env();
    cli.apply_overrides(&mut paths);
    paths
}

fn add_record(cli: &Cli, name: String, course: String, resume: Option<String>) -> Result<()> {
    if course.trim().is_empty() {
        anyhow::bail!("--course must not be empty");
    }
    let paths = local_paths(cli);
    let store = CsvRecordStore::new(&paths.data_file);

    let mut record = ApplicationRecord::new(name, course);
    if let Some(resume) = resume.filter(|r| !r.trim().is_empty()) {
        record = record.with_resume(resume);
    }
    let candidate = record.candidate_name.clone();

    let total = store.append(record)?;
    info!(
        candidate = %candidate,
        "Record added to {} ({total} records)",
        store.path().display()
    );
    Ok(())
}

fn show_status(cli: &Cli) -> Result<()> {
    let paths = local_paths(cli);
    let store = CsvRecordStore::new(&paths.data_file);
    let records = store.load()?;
    println!("{}", pipeline::status::summarize(&records));
    Ok(())
}

async fn run_stages(cli: &Cli, command: &Command) -> Result<()> {
    let mut config = Config::from_env()?;
    cli.apply_overrides(&mut config.paths);
    let paths = &config.paths;
    let store = CsvRecordStore::new(&paths.data_file);
    info!("Record store: {}", store.path().display());

    if matches!(command, Command::Prompts | Command::Run) {
        let gemini = GeminiClient::new(config.gemini.clone(), config.retry)
            .context("Failed to initialize the extraction client")?;
        info!("Extraction model: {}", config.gemini.model);
        let extractor = LlmMetadataExtractor::new(gemini);
        let fetcher = HttpContentFetcher::new(
            build_http_client(config.retry.timeout)?,
            &paths.resumes_dir,
        );

        let pass = PromptPass::new(&fetcher, &extractor, &paths.prompts_dir);
        pipeline::run_prompt_stage(&store, &pass).await?;
    }

    if matches!(command, Command::Sops | Command::Run) {
        let openrouter = OpenRouterClient::new(config.openrouter.clone(), config.retry)
            .context("Failed to initialize the SOP writing client")?;
        info!("SOP model: {}", config.openrouter.model);
        let generator = LlmSopGenerator::new(openrouter);

        let pass = SopPass::new(&generator, &paths.sops_dir);
        pipeline::run_sop_stage(&store, &pass).await?;
    }

    Ok(())
}
