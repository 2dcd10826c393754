//! OpenAI-compatible LLM provider.
//!
//! Works with Groq, OpenAI, OpenRouter, Ollama, and other compatible APIs.

use async_trait::async_trait;
use reqwest::Client;

use super::error::{LLMError, error_for_status};
use super::provider::LLMProvider;
use super::types::{ChatRequest, ChatResponse};

/// OpenAI-compatible provider.
pub struct OpenAICompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAICompatibleProvider {
    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, LLMError> {
        let mut req = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = error_for_status(req.json(&request).send().await?).await?;
        Ok(response.json().await?)
    }
}
