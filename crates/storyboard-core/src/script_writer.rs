//! Script Writer — turns a synopsis into a video script with storyboard lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::backend::{ChatCompletion, ChatMessage, GenerationBackend};

const SCRIPT_SYSTEM_PROMPT: &str = "You are a senior scripts writer and artist.";

/// Text shown (and stored in the session) when script generation fails.
pub const SCRIPT_FAILED_TEXT: &str = "Failed to generate script.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScriptStyle {
    #[default]
    Action,
    Comic,
    Explainer,
    Drama,
}

impl ScriptStyle {
    pub const ALL: [ScriptStyle; 4] = [Self::Action, Self::Comic, Self::Explainer, Self::Drama];

    pub fn label(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::Comic => "Comic",
            Self::Explainer => "Explainer",
            Self::Drama => "Drama",
        }
    }
}

impl fmt::Display for ScriptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target video length. Serialized as the short labels shown in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VideoDuration {
    #[default]
    #[serde(rename = "30s")]
    Seconds30,
    #[serde(rename = "1m")]
    Minutes1,
    #[serde(rename = "2m")]
    Minutes2,
    #[serde(rename = "5m")]
    Minutes5,
    #[serde(rename = "10m")]
    Minutes10,
}

impl VideoDuration {
    pub const ALL: [VideoDuration; 5] = [
        Self::Seconds30,
        Self::Minutes1,
        Self::Minutes2,
        Self::Minutes5,
        Self::Minutes10,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Seconds30 => "30s",
            Self::Minutes1 => "1m",
            Self::Minutes2 => "2m",
            Self::Minutes5 => "5m",
            Self::Minutes10 => "10m",
        }
    }
}

impl fmt::Display for VideoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One script submission. The synopsis may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRequest {
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub style: ScriptStyle,
    #[serde(default)]
    pub duration: VideoDuration,
}

impl ScriptRequest {
    /// Instruction sent as the user message.
    pub fn instruction(&self) -> String {
        format!(
            "Generate a script in the style of {} for a video lasting {}, inspired by the following synopsis: {}. \
After generating the script write the storyboards as image or storyboard descriptions with the following annotation: \
Image (Image Number): Storyboard descriptions. \
Be aware the every image description is in sperated line and without any additional characters ",
            self.style, self.duration, self.synopsis
        )
    }
}

/// Result of one script request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScriptOutcome {
    Generated { script: String },
    Failed { reason: String },
}

impl ScriptOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }

    /// Script text, or [`SCRIPT_FAILED_TEXT`] for a failed request.
    pub fn text(&self) -> &str {
        match self {
            Self::Generated { script } => script,
            Self::Failed { .. } => SCRIPT_FAILED_TEXT,
        }
    }
}

/// Sends exactly one chat completion per script request.
#[derive(Clone)]
pub struct ScriptWriter {
    backend: Arc<dyn GenerationBackend>,
    model: String,
}

impl ScriptWriter {
    pub fn new(backend: Arc<dyn GenerationBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    /// Chat request for `request`: fixed system role plus one user instruction.
    pub fn completion_for(&self, request: &ScriptRequest) -> ChatCompletion {
        ChatCompletion {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SCRIPT_SYSTEM_PROMPT),
                ChatMessage::user(request.instruction()),
            ],
        }
    }

    /// Generate a script. The reply text is returned verbatim; it is not checked for storyboard lines.
    pub async fn generate(&self, request: &ScriptRequest) -> ScriptOutcome {
        tracing::info!(
            style = %request.style,
            duration = %request.duration,
            synopsis_len = request.synopsis.len(),
            "Generating script"
        );
        match self.backend.complete_chat(&self.completion_for(request)).await {
            Ok(script) => {
                tracing::info!(script_len = script.len(), "Script generated");
                ScriptOutcome::Generated { script }
            }
            Err(e) => {
                tracing::error!("Error generating script: {}", e);
                ScriptOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
