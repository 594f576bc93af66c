use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::RetryPolicy;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Settings for the metadata extraction model.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

/// Settings for the SOP writing model.
#[derive(Debug, Clone)]
pub struct OpenRouterSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Sent as `HTTP-Referer` for attribution.
    pub referer: String,
    /// Sent as `X-Title` for attribution.
    pub title: String,
}

/// Filesystem locations used by both passes.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_file: PathBuf,
    pub prompts_dir: PathBuf,
    pub resumes_dir: PathBuf,
    pub sops_dir: PathBuf,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the API keys are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub paths: Paths,
    pub gemini: GeminiSettings,
    pub openrouter: OpenRouterSettings,
    pub retry: RetryPolicy,
}

impl Paths {
    /// Directory settings only; does not require the API keys.
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str, default: &str| {
            PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()))
        };
        Paths {
            data_file: path("DATA_FILE", "data/applications.csv"),
            prompts_dir: path("PROMPTS_DIR", "prompts"),
            resumes_dir: path("RESUMES_DIR", "resumes"),
            sops_dir: path("SOPS_DIR", "sops"),
        }
    }
}

impl Config {
    /// Reads the process environment; `main` loads `.env` into it first.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_secs: u64 = parse_var(lookup, "HTTP_TIMEOUT_SECS", 120)?;

        Ok(Config {
            paths: Paths::from_lookup(lookup),
            gemini: GeminiSettings {
                api_key: require_var(lookup, "GEMINI_API_KEY")?,
                base_url: get("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
                model: get("GEMINI_MODEL", "gemini-1.5-flash"),
                temperature: parse_var(lookup, "GEMINI_TEMPERATURE", 0.2)?,
                top_k: parse_var(lookup, "GEMINI_TOP_K", 40)?,
                top_p: parse_var(lookup, "GEMINI_TOP_P", 0.95)?,
                max_output_tokens: parse_var(lookup, "GEMINI_MAX_OUTPUT_TOKENS", 2048)?,
            },
            openrouter: OpenRouterSettings {
                api_key: require_var(lookup, "OPENROUTER_API_KEY")?,
                base_url: get("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL),
                model: get("OPENROUTER_MODEL", "deepseek/deepseek-chat"),
                referer: get("OPENROUTER_REFERER", "https://github.com/sopgen"),
                title: get("OPENROUTER_TITLE", "SOP Generator"),
            },
            retry: RetryPolicy {
                max_attempts: parse_var(lookup, "LLM_MAX_RETRIES", 3)?,
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn require_var(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_var<T>(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_keys_are_set() {
        let lookup = lookup_from(&[("GEMINI_API_KEY", "g-key"), ("OPENROUTER_API_KEY", "o-key")]);
        let config = Config::from_lookup(&lookup).unwrap();

        assert_eq!(config.gemini.api_key, "g-key");
        assert_eq!(config.gemini.top_k, 40);
        assert_eq!(config.openrouter.base_url, DEFAULT_OPENROUTER_BASE_URL);
        assert_eq!(config.paths.data_file, PathBuf::from("data/applications.csv"));
        assert_eq!(config.paths.sops_dir, PathBuf::from("sops"));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_paths_need_no_api_keys() {
        let paths = Paths::from_lookup(&lookup_from(&[("SOPS_DIR", "out/sops")]));
        assert_eq!(paths.data_file, PathBuf::from("data/applications.csv"));
        assert_eq!(paths.prompts_dir, PathBuf::from("prompts"));
        assert_eq!(paths.sops_dir, PathBuf::from("out/sops"));
    }

    #[test]
    fn test_missing_api_key_is_an_error_naming_the_key() {
        let lookup = lookup_from(&[("GEMINI_API_KEY", "g-key")]);
        let err = Config::from_lookup(&lookup).unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let lookup = lookup_from(&[("GEMINI_API_KEY", "  "), ("OPENROUTER_API_KEY", "o-key")]);
        let err = Config::from_lookup(&lookup).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_overrides_and_numeric_parsing() {
        let lookup = lookup_from(&[
            ("GEMINI_API_KEY", "g"),
            ("OPENROUTER_API_KEY", "o"),
            ("GEMINI_TEMPERATURE", "0.7"),
            ("GEMINI_MAX_OUTPUT_TOKENS", "4096"),
            ("HTTP_TIMEOUT_SECS", "30"),
            ("PROMPTS_DIR", "/tmp/prompts"),
        ]);
        let config = Config::from_lookup(&lookup).unwrap();

        assert!((config.gemini.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.gemini.max_output_tokens, 4096);
        assert_eq!(config.retry.timeout, Duration::from_secs(30));
        assert_eq!(config.paths.prompts_dir, PathBuf::from("/tmp/prompts"));
    }

    #[test]
    fn test_malformed_number_is_rejected() {
        let lookup = lookup_from(&[
            ("GEMINI_API_KEY", "g"),
            ("OPENROUTER_API_KEY", "o"),
            ("GEMINI_TOP_K", "forty"),
        ]);
        let err = Config::from_lookup(&lookup).unwrap_err();
        assert!(err.to_string().contains("GEMINI_TOP_K"));
    }
}
