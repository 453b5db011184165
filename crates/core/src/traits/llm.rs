//! Text-generation traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// Text generator used for planning, elaboration and replies.
///
/// Callers treat an empty `content` as "no answer"; transport failures come
/// back as errors.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One instruction in, one completion out.
    async fn complete(&self, prompt: &str) -> Result<LlmResponse>;

    async fn chat(&self, messages: &[ChatMessage]) -> Result<LlmResponse>;
}

/// One turn of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`.
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

/// Generated text plus accounting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: LlmUsage,
}

impl LlmResponse {
    /// A plain text response with no usage accounting.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: "stop".to_string(),
            usage: LlmUsage::default(),
        }
    }
}

/// Token counts; estimates when the backend reports none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}
