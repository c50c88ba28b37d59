//! Generation backend seam: one chat completion, one image generation.
//!
//! `OpenAiBridge` is the production implementation; tests plug in scripted backends.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Chat message (OpenAI-compatible).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat-completion request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

/// Image-generation request body. Always asks for a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGeneration {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
    pub n: u32,
}

/// External generation API used by the script writer and storyboard artist.
#[async_trait::async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Text of the first returned choice.
    async fn complete_chat(&self, request: &ChatCompletion) -> Result<String, BridgeError>;

    /// URL of the first returned image.
    async fn generate_image(&self, request: &ImageGeneration) -> Result<String, BridgeError>;
}
