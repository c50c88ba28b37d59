//! Error types for the storyboard core.

use thiserror::Error;

/// Failures talking to the generation API (chat completions or image generation).
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("{endpoint} response parse: {message}")]
    Parse {
        endpoint: &'static str,
        message: String,
    },

    #[error("{endpoint} returned no {what}")]
    Empty {
        endpoint: &'static str,
        what: &'static str,
    },
}

/// A storyboard marker line that cannot be split into a prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("line {line_number} starts with the image marker but has no ':' separator: {line:?}")]
    MissingColon { line_number: usize, line: String },
}

/// Why a storyboard run produced no frames at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoryboardError {
    #[error("Please generate a script first before creating storyboards.")]
    NoScript,

    #[error("script could not be parsed into storyboard prompts: {0}")]
    Extract(#[from] ExtractError),
}
