//! Companion - a tiny HTTP relay that gives a hosted LLM a playful persona.

pub mod config;
pub mod handlers;
pub mod llm;
pub mod persona;
pub mod relay;
pub mod response;
pub mod server;
