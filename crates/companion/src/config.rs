use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub persona: PersonaConfig,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let config: Self = serde_saphyr::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "llm.max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "llm.timeout_seconds must be greater than 0".to_string(),
            ));
        }
        // Upstream timeout must fire before the router's request timeout.
        if self.llm.timeout_seconds >= self.server.request_timeout_seconds {
            return Err(ConfigError::Invalid(format!(
                "llm.timeout_seconds ({}) must be less than server.request_timeout_seconds ({})",
                self.llm.timeout_seconds, self.server.request_timeout_seconds
            )));
        }
        if self.persona.system_prompt.as_deref().map(str::trim) == Some("") {
            return Err(ConfigError::Invalid(
                "persona.system_prompt must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    60
}

// ============================================================================
// LlmConfig
// ============================================================================

/// Upstream chat-completion settings.
#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            text_model: default_text_model(),
            vision_model: default_vision_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_text_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_vision_model() -> String {
    "llama-3.2-11b-vision-preview".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    300
}

fn default_llm_timeout() -> u64 {
    30
}

// ============================================================================
// PersonaConfig
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct PersonaConfig {
    /// Replaces the built-in persona when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.request_timeout_seconds, 60);
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.llm.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.llm.text_model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.vision_model, "llama-3.2-11b-vision-preview");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.llm.max_tokens, 300);
        assert_eq!(config.llm.timeout_seconds, 30);
        assert!(config.persona.system_prompt.is_none());
    }

    #[tokio::test]
    async fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let missing_path = tmp_dir.path().join("missing-config.yaml");
        let config = Config::load(&missing_path).await.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
    }

    #[tokio::test]
    async fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 3000
  request_timeout_seconds: 10
llm:
  base_url: "http://localhost:11434/v1"
  api_key_env: "OLLAMA_KEY"
  text_model: "llama3"
  vision_model: "llava"
  temperature: 0.8
  max_tokens: 150
  timeout_seconds: 5
persona:
  system_prompt: "You are Red, a grumpy cat."
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_seconds, 10);
        assert_eq!(config.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(config.llm.api_key_env, "OLLAMA_KEY");
        assert_eq!(config.llm.text_model, "llama3");
        assert_eq!(config.llm.vision_model, "llava");
        assert_eq!(config.llm.temperature, 0.8);
        assert_eq!(config.llm.max_tokens, 150);
        assert_eq!(config.llm.timeout_seconds, 5);
        assert_eq!(
            config.persona.system_prompt.as_deref(),
            Some("You are Red, a grumpy cat.")
        );
    }

    #[tokio::test]
    async fn test_load_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
llm:
  max_tokens: 200
"#
        )
        .unwrap();

        let config = Config::load(file.path()).await.unwrap();
        assert_eq!(config.server.port, 8000); // default
        assert_eq!(config.llm.max_tokens, 200);
        assert_eq!(config.llm.text_model, "llama-3.3-70b-versatile"); // default
        assert_eq!(config.llm.temperature, 0.7); // default
    }

    #[tokio::test]
    async fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(file.path()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_out_of_range_temperature() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
llm:
  temperature: 3.5
"#
        )
        .unwrap();

        let err = Config::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("llm.temperature"));
    }

    #[tokio::test]
    async fn test_load_rejects_blank_persona() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
persona:
  system_prompt: "   "
"#
        )
        .unwrap();

        let err = Config::load(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("persona.system_prompt"));
    }

    #[tokio::test]
    async fn test_load_rejects_llm_timeout_exceeding_request_timeout() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  request_timeout_seconds: 1
llm:
  timeout_seconds: 120
"#
        )
        .unwrap();

        let err = Config::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("llm.timeout_seconds"));
    }

    #[tokio::test]
    async fn test_load_rejects_zero_llm_timeout() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
llm:
  timeout_seconds: 0
"#
        )
        .unwrap();

        let err = Config::load(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_api_key_missing_env() {
        let llm = LlmConfig {
            api_key_env: "COMPANION_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(llm.api_key().is_none());
    }

    #[test]
    fn test_config_error_display() {
        let io_error = ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "test",
        ));
        assert!(io_error.to_string().contains("failed to read config file"));
    }
}
