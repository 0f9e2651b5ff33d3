//! Text-generation oracle used for route extraction and documentation synthesis.
//!
//! [`Oracle`] is the raw capability: role-tagged messages in, text out.
//! [`CachedOracle`] wraps any oracle with a [`CacheStore`](crate::cache::CacheStore) and is
//! what every pipeline stage calls.

pub mod cached;
pub mod gemini;
pub mod scripted;

pub use cached::{CachedOracle, InvokeOptions};
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_API_BASE_URL, DEFAULT_MODEL};
pub use scripted::ScriptedOracle;

use crate::error::Result;
use serde::Serialize;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message sent to the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// Shape of the text the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

/// A text-generation backend.
///
/// Implementations are free to be nondeterministic and slow; the pipeline calls them one
/// request at a time.
pub trait Oracle {
    fn complete(&self, messages: &[ChatMessage], format: ResponseFormat) -> Result<String>;
}
