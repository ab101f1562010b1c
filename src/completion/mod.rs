//! Remote chat-completion collaborator.
//!
//! The gateway only depends on [`CompletionBackend`]; [`OpenAIClient`] is the
//! production implementation.

pub mod openai;

pub use openai::OpenAIClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// Conversation role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One message of the conversation sent to the completion API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single-shot completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Anything that can turn a conversation into generated text.
///
/// Every failure (network, auth, rate limit, malformed response) comes back
/// as an `Err`; implementations never panic on remote faults.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
