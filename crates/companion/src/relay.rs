//! Chat relay: turns a companion chat request into one upstream completion.
//!
//! The relay is stateless. Each call builds a two-turn prompt (persona, then
//! the user's turn), picks the text or vision model depending on whether an
//! image is attached, makes exactly one upstream call and returns the first
//! choice's text.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::llm::{self, Content, ContentPart, ImageUrl, LLMError, LLMProvider, Message};
use crate::persona::Persona;

// ============================================================================
// Request
// ============================================================================

/// Inbound chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_mood")]
    pub mood: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_mood() -> String {
    "happy".to_string()
}

impl ChatRequest {
    /// The attached image, if any. Empty strings count as no image.
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.is_empty())
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Sampling and model settings applied to every completion.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub text_model: String,
    pub vision_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl From<&LlmConfig> for RelaySettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from(&LlmConfig::default())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a relay call produced no text.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Upstream(#[from] LLMError),

    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    #[error("upstream returned no completion text")]
    EmptyCompletion,
}

// ============================================================================
// Relay
// ============================================================================

#[derive(Clone)]
pub struct ChatRelay {
    provider: Arc<dyn LLMProvider>,
    persona: Persona,
    settings: RelaySettings,
}

impl ChatRelay {
    pub fn new(provider: Arc<dyn LLMProvider>, persona: Persona, settings: RelaySettings) -> Self {
        Self {
            provider,
            persona,
            settings,
        }
    }

    /// Pick the model for a request: vision when an image is attached.
    pub fn select_model(&self, request: &ChatRequest) -> &str {
        if request.image().is_some() {
            &self.settings.vision_model
        } else {
            &self.settings.text_model
        }
    }

    /// Build the upstream completion request.
    pub fn build_completion(&self, request: &ChatRequest) -> llm::ChatRequest {
        let user_content = match request.image() {
            Some(url) => Content::Parts(vec![
                ContentPart::Text {
                    text: format!("[User says:] {}", request.message),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: url.to_string(),
                    },
                },
            ]),
            None => Content::Text(format!(
                "[User is feeling {}] {}",
                request.mood, request.message
            )),
        };

        llm::ChatRequest {
            model: self.select_model(request).to_string(),
            messages: vec![
                Message::system(self.persona.as_str()),
                Message::user(user_content),
            ],
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        }
    }

    /// Relay one chat request upstream and return the generated text.
    pub async fn handle_chat(&self, request: &ChatRequest) -> Result<String, RelayError> {
        info!(message = %request.message, mood = %request.mood, "Received chat request");

        let completion = self.build_completion(request);
        if request.image().is_some() {
            info!(model = %completion.model, "Image attached, using vision model");
        }
        debug!(model = %completion.model, "Sending completion request");

        let result = self.complete(completion).await;

        match &result {
            Ok(text) => info!(response = %text, "Generated response"),
            Err(e) => warn!(error = %e, "Chat relay failed"),
        }

        result
    }

    async fn complete(&self, completion: llm::ChatRequest) -> Result<String, RelayError> {
        let response = tokio::time::timeout(self.settings.timeout, self.provider.chat(completion))
            .await
            .map_err(|_| RelayError::Timeout(self.settings.timeout))??;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(RelayError::EmptyCompletion)
    }
}
