//! Storyboard Studio — Core library.
//! Script writer, storyboard artist, prompt extraction and per-user sessions
//! behind the gateway's HTML forms.

pub mod backend;
pub mod config;
pub mod error;
pub mod openai_bridge;
pub mod prompt_extractor;
pub mod script_writer;
pub mod session;
pub mod storyboard_artist;

pub use backend::{ChatCompletion, ChatMessage, GenerationBackend, ImageGeneration};
pub use config::StoryboardConfig;
pub use error::{BridgeError, ExtractError, StoryboardError};
pub use openai_bridge::OpenAiBridge;
pub use prompt_extractor::{extract_image_prompts, IMAGE_MARKER};
pub use script_writer::{
    ScriptOutcome, ScriptRequest, ScriptStyle, ScriptWriter, VideoDuration, SCRIPT_FAILED_TEXT,
};
pub use session::{SessionContext, SessionHandle, SessionId, SessionStore};
pub use storyboard_artist::{
    ColorMode, DetailLevel, Storyboard, StoryboardArtist, StoryboardFrame, StoryboardOptions,
    StoryboardResult, StoryboardStyle, PLACEHOLDER_IMAGE,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
