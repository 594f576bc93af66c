//! Metadata extractor: turns free-form course text into course, university,
//! country and a course summary using the generative-language model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::RecordError;
use crate::llm_client::gemini::GeminiClient;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::strip_json_fences;
use crate::pipeline::prompts::METADATA_EXTRACTION_TEMPLATE;

/// Upper bound on course text sent to the model, in characters.
pub const MAX_COURSE_TEXT_CHARS: usize = 30_000;

pub const UNKNOWN_COURSE: &str = "Unknown Course";
pub const UNKNOWN_UNIVERSITY: &str = "Unknown University";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
pub const INFO_NOT_AVAILABLE: &str = "Info not available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMetadata {
    pub course: String,
    pub university: String,
    pub country: String,
    pub course_info: String,
}

#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, course_text: &str) -> Result<CourseMetadata, RecordError>;
}

/// Production extractor backed by `GeminiClient`.
pub struct LlmMetadataExtractor {
    client: GeminiClient,
}

impl LlmMetadataExtractor {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MetadataExtractor for LlmMetadataExtractor {
    async fn extract(&self, course_text: &str) -> Result<CourseMetadata, RecordError> {
        let prompt = build_extraction_prompt(course_text);
        let reply = self
            .client
            .generate(&prompt)
            .await
            .map_err(|e| RecordError::ExtractionFailed(e.to_string()))?;

        debug!("Metadata reply: {} chars", reply.len());
        parse_metadata(&reply)
            .map_err(|e| RecordError::ExtractionFailed(format!("unparsable metadata JSON: {e}")))
    }
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub fn build_extraction_prompt(course_text: &str) -> String {
    // course text goes in last so placeholders inside it are left alone
    METADATA_EXTRACTION_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace(
            "{course_text}",
            truncate_chars(course_text, MAX_COURSE_TEXT_CHARS),
        )
}

/// Parses the model reply. Missing or blank keys fall back to placeholders;
/// only a reply that is not a JSON object is an error.
pub fn parse_metadata(reply: &str) -> Result<CourseMetadata, serde_json::Error> {
    let object: Map<String, Value> = serde_json::from_str(strip_json_fences(reply))?;

    let field = |key: &str, fallback: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    Ok(CourseMetadata {
        course: field("course", UNKNOWN_COURSE),
        university: field("university", UNKNOWN_UNIVERSITY),
        country: field("country", UNKNOWN_COUNTRY),
        course_info: field("course_info", INFO_NOT_AVAILABLE),
    })
}
