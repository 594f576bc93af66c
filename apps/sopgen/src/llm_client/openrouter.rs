//! Client for an OpenAI-compatible `chat/completions` endpoint (OpenRouter).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OpenRouterSettings;
use crate::llm_client::{build_http_client, send_with_retry, LlmError, RetryPolicy};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Content of the first choice, if it carries any non-blank text.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    settings: OpenRouterSettings,
    retry: RetryPolicy,
}

impl OpenRouterClient {
    pub fn new(settings: OpenRouterSettings, retry: RetryPolicy) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client(retry.timeout)?,
            settings,
            retry,
        })
    }

    /// Sends `prompt` as a single user message and returns the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };
        let url = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let response = send_with_retry(
            || {
                self.client
                    .post(&url)
                    .bearer_auth(&self.settings.api_key)
                    .header("HTTP-Referer", &self.settings.referer)
                    .header("X-Title", &self.settings.title)
                    .json(&body)
            },
            self.retry,
        )
        .await?;

        let parsed: ChatResponse = response.json().await?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "Chat completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_reads_first_choice() {
        let json = r#"{
            "id": "gen-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Dear Committee,"}}],
            "usage": {"prompt_tokens": 900, "completion_tokens": 700}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), Some("Dear Committee,"));
    }

    #[test]
    fn test_null_or_blank_content_is_absent() {
        let null: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "  \n"}}]}"#).unwrap();
        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(null.text().is_none());
        assert!(blank.text().is_none());
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_request_shape() {
        let body = ChatRequest {
            model: "deepseek/deepseek-chat",
            messages: vec![ChatMessage {
                role: "user",
                content: "Write the SOP",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "deepseek/deepseek-chat");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Write the SOP");
    }
}
