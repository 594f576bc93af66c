//! Content fetcher: resolves course text (URL or literal) and resume text (PDF).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

pub mod html;

use html::html_to_text;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Source of the raw text both passes feed to the models.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Plain text for a course: fetched and stripped when `input` is a URL,
    /// returned as-is otherwise.
    async fn fetch_text(&self, input: &str) -> Result<String, FetchError>;

    /// Resume text for `identifier`. `None` when no resume was given or it
    /// could not be read; the latter is logged, never an error.
    async fn fetch_resume(&self, identifier: Option<&str>) -> Option<String>;
}

/// True when the course input should be fetched rather than used literally.
pub fn is_url(input: &str) -> bool {
    let lower = input.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetches course pages over HTTP and reads resumes from a local directory.
#[derive(Clone)]
pub struct HttpContentFetcher {
    client: Client,
    resumes_dir: PathBuf,
}

impl HttpContentFetcher {
    pub fn new(client: Client, resumes_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            resumes_dir: resumes_dir.into(),
        }
    }

    fn resume_path(&self, identifier: &str) -> PathBuf {
        let candidate = Path::new(identifier);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.resumes_dir.join(candidate)
        }
    }
}

#[async_trait]
impl ContentSource for HttpContentFetcher {
    async fn fetch_text(&self, input: &str) -> Result<String, FetchError> {
        if !is_url(input) {
            return Ok(input.trim().to_string());
        }

        let url = input.trim();
        debug!("Fetching course page {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        Ok(html_to_text(&body))
    }

    async fn fetch_resume(&self, identifier: Option<&str>) -> Option<String> {
        let identifier = identifier.map(str::trim).filter(|s| !s.is_empty())?;
        let path = self.resume_path(identifier);

        if !path.is_file() {
            warn!("Resume file not found: {}", path.display());
            return None;
        }

        let extracted = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path)).await
        };

        match extracted {
            Ok(Ok(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(Ok(_)) => {
                warn!("Resume {} contains no extractable text", path.display());
                None
            }
            Ok(Err(e)) => {
                warn!("Could not read resume {}: {e:?}", path.display());
                None
            }
            Err(e) => {
                warn!("Resume extraction task failed for {}: {e}", path.display());
                None
            }
        }
    }
}
