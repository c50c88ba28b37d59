//! OpenAI Bridge — chat completions and image generation over reqwest.
//!
//! Both endpoints are OpenAI-compatible: `POST {api_base}/chat/completions` and
//! `POST {api_base}/images/generations`, bearer auth with the configured key.

use serde::Deserialize;
use std::time::Duration;

use crate::backend::{ChatCompletion, GenerationBackend, ImageGeneration};
use crate::config::StoryboardConfig;
use crate::error::BridgeError;

const CHAT_ENDPOINT: &str = "chat/completions";
const IMAGE_ENDPOINT: &str = "images/generations";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Option<Vec<ImageDatum>>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

/// Generation backend talking to an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct OpenAiBridge {
    api_base: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiBridge {
    /// Bridge for the configured API root and key. The key is read once here and never refreshed.
    pub fn from_config(config: &StoryboardConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    timeout_secs = config.request_timeout_secs,
                    "HTTP client build failed, using defaults without timeout: {}",
                    e
                );
                reqwest::Client::new()
            });
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base, endpoint)
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> Result<String, BridgeError> {
        let key = self.api_key.as_deref().ok_or(BridgeError::MissingApiKey)?;

        let res = self
            .client
            .post(self.url(endpoint))
            .bearer_auth(key)
            .json(body)
            .send()
            .await
            .map_err(|source| BridgeError::Request { endpoint, source })?;

        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|source| BridgeError::Request { endpoint, source })?;

        if !status.is_success() {
            return Err(BridgeError::Status {
                endpoint,
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl GenerationBackend for OpenAiBridge {
    async fn complete_chat(&self, request: &ChatCompletion) -> Result<String, BridgeError> {
        let text = self.post_json(CHAT_ENDPOINT, request).await?;
        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| BridgeError::Parse {
            endpoint: CHAT_ENDPOINT,
            message: e.to_string(),
        })?;

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or(BridgeError::Empty {
                endpoint: CHAT_ENDPOINT,
                what: "choices",
            })
    }

    async fn generate_image(&self, request: &ImageGeneration) -> Result<String, BridgeError> {
        let text = self.post_json(IMAGE_ENDPOINT, request).await?;
        let parsed: ImageResponse = serde_json::from_str(&text).map_err(|e| BridgeError::Parse {
            endpoint: IMAGE_ENDPOINT,
            message: e.to_string(),
        })?;

        parsed
            .data
            .and_then(|d| d.into_iter().next())
            .and_then(|d| d.url)
            .ok_or(BridgeError::Empty {
                endpoint: IMAGE_ENDPOINT,
                what: "image url",
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let config = StoryboardConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            api_key: None,
            ..StoryboardConfig::default()
        };
        let bridge = OpenAiBridge::from_config(&config);
        let err = bridge
            .complete_chat(&ChatCompletion {
                model: "gpt-3.5-turbo".to_string(),
                messages: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::MissingApiKey));
    }

    #[test]
    fn trailing_slash_is_dropped() {
        let config = StoryboardConfig {
            api_base: "http://localhost:4010/v1/".to_string(),
            ..StoryboardConfig::default()
        };
        let bridge = OpenAiBridge::from_config(&config);
        assert_eq!(bridge.url(IMAGE_ENDPOINT), "http://localhost:4010/v1/images/generations");
    }
}
