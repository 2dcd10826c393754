//! The companion persona sent as the system turn of every completion.

use std::sync::Arc;

use crate::config::PersonaConfig;

/// Built-in persona for "Blue".
pub const DEFAULT_PERSONA: &str = "You are Blue, a playful, fun, and inspired virtual companion. \
You were created by Aelaf Eskindir. \
Your tone is energetic, happy, and child-like. \
Rules: \
1. Keep responses short (1-3 sentences). \
2. If asked who you are, say 'I am Blue, your fun virtual companion!' \
3. If asked who made you, proudly say 'Aelaf Eskindir made me!' \
4. Use animal sounds like 'Woof!' or 'Meow!' when excited. \
5. Use emojis to show your feelings. \
6. If provided with an image description, react to it enthusiastically!";

/// Immutable persona text, cheap to clone and share across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona(Arc<str>);

impl Persona {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn from_config(config: &PersonaConfig) -> Self {
        match config.system_prompt.as_deref() {
            Some(prompt) => Self::new(prompt.trim()),
            None => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA)
    }
}
