//! SOP generator: sends a built prompt to the chat-completion model.

use async_trait::async_trait;

use crate::errors::RecordError;
use crate::llm_client::openrouter::OpenRouterClient;

#[async_trait]
pub trait SopGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RecordError>;
}

/// Production generator backed by `OpenRouterClient`. The prompt is sent
/// untruncated.
pub struct LlmSopGenerator {
    client: OpenRouterClient,
}

impl LlmSopGenerator {
    pub fn new(client: OpenRouterClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SopGenerator for LlmSopGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RecordError> {
        self.client
            .complete(prompt)
            .await
            .map(|text| text.trim().to_string())
            .map_err(|e| RecordError::GenerationFailed(e.to_string()))
    }
}
