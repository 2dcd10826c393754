//! HTTP request handlers.

mod chat;
mod health;
mod version;

pub use chat::{ChatResponse, chat};
pub use health::{livez, readyz};
pub use version::version;
