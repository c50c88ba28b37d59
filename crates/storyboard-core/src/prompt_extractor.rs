//! Prompt Extractor — pulls image prompts out of a generated script.
//!
//! The script writer is asked to emit one storyboard line per frame in the form
//! `Image (<n>): <description>`. Everything else in the script is ignored.

use crate::error::ExtractError;

/// Literal prefix of a storyboard line.
pub const IMAGE_MARKER: &str = "Image (";

/// Extract image prompts from `script`, in order of appearance.
///
/// Lines are split on `\n` only; a trailing `\r` ends up in the prompt and is trimmed with
/// the rest of the surrounding whitespace. A marker line without a `:` aborts extraction.
pub fn extract_image_prompts(script: &str) -> Result<Vec<String>, ExtractError> {
    let mut prompts = Vec::new();
    for (idx, line) in script.split('\n').enumerate() {
        if !line.starts_with(IMAGE_MARKER) {
            continue;
        }
        let (_, description) = line
            .split_once(':')
            .ok_or_else(|| ExtractError::MissingColon {
                line_number: idx + 1,
                line: line.to_string(),
            })?;
        prompts.push(description.trim().to_string());
    }
    Ok(prompts)
}
