//! Storyboard Artist — one image per storyboard line of a script.
//!
//! Image requests run strictly one after another. A failed frame keeps its slot as a
//! placeholder so the result list always lines up with the extracted prompts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::backend::{GenerationBackend, ImageGeneration};
use crate::error::ExtractError;
use crate::prompt_extractor::extract_image_prompts;

/// Locator shown in place of an image that could not be generated.
pub const PLACEHOLDER_IMAGE: &str = "img.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoryboardStyle {
    #[default]
    Doodle,
    Sketchy,
    Reality,
    Shaded,
}

impl StoryboardStyle {
    pub const ALL: [StoryboardStyle; 4] = [Self::Doodle, Self::Sketchy, Self::Reality, Self::Shaded];

    pub fn label(self) -> &'static str {
        match self {
            Self::Doodle => "Doodle",
            Self::Sketchy => "Sketchy",
            Self::Reality => "Reality",
            Self::Shaded => "Shaded",
        }
    }
}

impl fmt::Display for StoryboardStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DetailLevel {
    Detailed,
    #[default]
    Simple,
}

impl DetailLevel {
    pub fn from_flag(detailed: bool) -> Self {
        if detailed {
            Self::Detailed
        } else {
            Self::Simple
        }
    }

    pub fn adjective(self) -> &'static str {
        match self {
            Self::Detailed => "Detailed",
            Self::Simple => "Simple",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorMode {
    Colored,
    #[default]
    BlackAndWhite,
}

impl ColorMode {
    pub fn from_flag(colored: bool) -> Self {
        if colored {
            Self::Colored
        } else {
            Self::BlackAndWhite
        }
    }

    pub fn adjective(self) -> &'static str {
        match self {
            Self::Colored => "Colored",
            Self::BlackAndWhite => "Black and white",
        }
    }
}

/// Look of every frame in one storyboard run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoryboardOptions {
    pub style: StoryboardStyle,
    pub detail: DetailLevel,
    pub color: ColorMode,
}

impl StoryboardOptions {
    pub fn new(style: StoryboardStyle, detailed: bool, colored: bool) -> Self {
        Self {
            style,
            detail: DetailLevel::from_flag(detailed),
            color: ColorMode::from_flag(colored),
        }
    }

    /// Image instruction for one storyboard description.
    pub fn instruction(&self, prompt: &str) -> String {
        format!(
            "Create a {}, {} storyboard in the style of {} based on this storyboard description: {}",
            self.color.adjective(),
            self.detail.adjective(),
            self.style,
            prompt
        )
    }
}

/// Outcome of one frame, in prompt order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoryboardResult {
    Image { url: String },
    Placeholder { reason: String },
}

impl StoryboardResult {
    /// Image URL, or [`PLACEHOLDER_IMAGE`] for a failed frame.
    pub fn locator(&self) -> &str {
        match self {
            Self::Image { url } => url,
            Self::Placeholder { .. } => PLACEHOLDER_IMAGE,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }
}

/// One storyboard run: the extracted prompts and, slot for slot, what became of each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Storyboard {
    pub prompts: Vec<String>,
    pub results: Vec<StoryboardResult>,
}

impl Storyboard {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Prompts paired with their results, in order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &StoryboardResult)> {
        self.prompts.iter().map(String::as_str).zip(self.results.iter())
    }
}

/// A generated frame handed to the display callback as soon as it arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoryboardFrame {
    /// 1-based position among the extracted prompts.
    pub number: usize,
    pub url: String,
    /// Caption: the storyboard description the image was drawn from.
    pub prompt: String,
}

/// Issues one image request per storyboard line.
#[derive(Clone)]
pub struct StoryboardArtist {
    backend: Arc<dyn GenerationBackend>,
    model: String,
    size: String,
    quality: String,
}

impl StoryboardArtist {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        model: impl Into<String>,
        size: impl Into<String>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            size: size.into(),
            quality: quality.into(),
        }
    }

    pub fn image_request(&self, options: &StoryboardOptions, prompt: &str) -> ImageGeneration {
        ImageGeneration {
            model: self.model.clone(),
            prompt: options.instruction(prompt),
            size: self.size.clone(),
            quality: self.quality.clone(),
            n: 1,
        }
    }

    /// Draw every storyboard line of `script`. `on_frame` fires once per successful image, before the next request.
    pub async fn generate<F>(
        &self,
        script: &str,
        options: &StoryboardOptions,
        mut on_frame: F,
    ) -> Result<Storyboard, ExtractError>
    where
        F: FnMut(&StoryboardFrame) + Send,
    {
        let prompts = extract_image_prompts(script)?;
        tracing::info!(
            frames = prompts.len(),
            style = %options.style,
            detail = options.detail.adjective(),
            color = options.color.adjective(),
            "Generating storyboard"
        );

        let mut results = Vec::with_capacity(prompts.len());
        for (idx, prompt) in prompts.iter().enumerate() {
            let request = self.image_request(options, prompt);
            match self.backend.generate_image(&request).await {
                Ok(url) => {
                    on_frame(&StoryboardFrame {
                        number: idx + 1,
                        url: url.clone(),
                        prompt: prompt.clone(),
                    });
                    results.push(StoryboardResult::Image { url });
                }
                Err(e) => {
                    tracing::error!(frame = idx + 1, "Error generating storyboards: {}", e);
                    results.push(StoryboardResult::Placeholder {
                        reason: e.to_string(),
                    });
                }
            }
        }

        let drawn = results.iter().filter(|r| r.is_image()).count();
        tracing::info!(drawn, placeholders = results.len() - drawn, "Storyboard finished");
        Ok(Storyboard { prompts, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjectives_follow_flags() {
        let opts = StoryboardOptions::new(StoryboardStyle::Sketchy, true, false);
        assert_eq!(
            opts.instruction("a fox at dawn"),
            "Create a Black and white, Detailed storyboard in the style of Sketchy based on this storyboard description: a fox at dawn"
        );
        let opts = StoryboardOptions::new(StoryboardStyle::Shaded, false, true);
        assert!(opts.instruction("x").starts_with("Create a Colored, Simple storyboard in the style of Shaded"));
    }

    #[test]
    fn placeholder_locator_is_fixed() {
        let r = StoryboardResult::Placeholder {
            reason: "timeout".to_string(),
        };
        assert_eq!(r.locator(), PLACEHOLDER_IMAGE);
        assert!(!r.is_image());
    }

    #[test]
    fn entries_pair_prompts_with_results() {
        let board = Storyboard {
            prompts: vec!["a pier".to_string(), "a gull".to_string()],
            results: vec![
                StoryboardResult::Image {
                    url: "https://cdn.test/1.png".to_string(),
                },
                StoryboardResult::Placeholder {
                    reason: "rate limited".to_string(),
                },
            ],
        };
        let pairs: Vec<(&str, &str)> = board.entries().map(|(p, r)| (p, r.locator())).collect();
        assert_eq!(
            pairs,
            vec![("a pier", "https://cdn.test/1.png"), ("a gull", PLACEHOLDER_IMAGE)]
        );
        assert_eq!(board.len(), 2);
    }
}
