//! Storyboard configuration, loaded once at startup.
//!
//! | Source | Example |
//! |--------|---------|
//! | defaults | see [`StoryboardConfig::load_from`] |
//! | TOML file | `STORYBOARD_CONFIG` path, else `config/storyboard.toml` (optional) |
//! | environment | `STORYBOARD_API_KEY`, `STORYBOARD_TEXT_MODEL`, `STORYBOARD_BIND_ADDR`, ... |
//!
//! The API key falls back to `OPENAI_API_KEY` when no `api_key` is configured.

use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/storyboard.toml";

/// Process-wide configuration passed explicitly to the bridge and the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryboardConfig {
    /// Gateway listen address.
    pub bind_addr: String,
    /// OpenAI-compatible API root (no trailing slash).
    pub api_base: String,
    /// Secret API key. `None` means every generation call fails into its fallback.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Chat model for the script writer.
    pub text_model: String,
    /// Image model for the storyboard artist.
    pub image_model: String,
    pub image_size: String,
    pub image_quality: String,
    /// Per-request timeout for the generation API.
    pub request_timeout_secs: u64,
    /// Browser title of the page.
    pub page_title: String,
}

impl Default for StoryboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            text_model: "gpt-3.5-turbo".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
            image_quality: "standard".to_string(),
            request_timeout_secs: 120,
            page_title: "AI Storyboard Generator".to_string(),
        }
    }
}

impl StoryboardConfig {
    /// Load config from `.env`, file and environment. File path: env `STORYBOARD_CONFIG` > `config/storyboard.toml`.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let path = std::env::var("STORYBOARD_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load config layered as defaults < `path` (skipped when missing) < `STORYBOARD_*` env.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("bind_addr", defaults.bind_addr)?
            .set_default("api_base", defaults.api_base)?
            .set_default("text_model", defaults.text_model)?
            .set_default("image_model", defaults.image_model)?
            .set_default("image_size", defaults.image_size)?
            .set_default("image_quality", defaults.image_quality)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("page_title", defaults.page_title)?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("STORYBOARD")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut cfg: Self = built.try_deserialize()?;
        cfg.api_base = cfg.api_base.trim_end_matches('/').to_string();
        cfg.api_key = cfg
            .api_key
            .take()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(cfg)
    }

    /// True when an API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serialises tests that read or write process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 3] = ["STORYBOARD_TEXT_MODEL", "STORYBOARD_API_KEY", "OPENAI_API_KEY"];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn defaults_match_generation_contract() {
        let cfg = StoryboardConfig::default();
        assert_eq!(cfg.text_model, "gpt-3.5-turbo");
        assert_eq!(cfg.image_model, "dall-e-3");
        assert_eq!(cfg.image_size, "1024x1024");
        assert_eq!(cfg.image_quality, "standard");
    }

    #[test]
    fn file_overrides_defaults() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storyboard.toml");
        std::fs::write(
            &path,
            "bind_addr = \"0.0.0.0:9100\"\napi_base = \"http://localhost:4010/v1/\"\napi_key = \"sk-file\"\npage_title = \"Boards\"\n",
        )
        .unwrap();

        let cfg = StoryboardConfig::load_from(&path).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:9100");
        assert_eq!(cfg.api_base, "http://localhost:4010/v1");
        assert_eq!(cfg.api_key.as_deref(), Some("sk-file"));
        assert_eq!(cfg.page_title, "Boards");
        assert_eq!(cfg.text_model, "gpt-3.5-turbo");
        assert_eq!(cfg.request_timeout_secs, 120);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let cfg = StoryboardConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.image_model, "dall-e-3");
        assert_eq!(cfg.page_title, "AI Storyboard Generator");
    }

    #[test]
    fn environment_overrides_file_and_key_falls_back() {
        let _env = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storyboard.toml");
        std::fs::write(&path, "text_model = \"gpt-4o-mini\"\napi_key = \"sk-file\"\n").unwrap();

        std::env::set_var("STORYBOARD_TEXT_MODEL", "gpt-4o");
        std::env::set_var("STORYBOARD_API_KEY", "sk-env");
        let cfg = StoryboardConfig::load_from(&path).unwrap();
        assert_eq!(cfg.text_model, "gpt-4o");
        assert_eq!(cfg.api_key.as_deref(), Some("sk-env"));
        clear_env();

        let bare = dir.path().join("absent.toml");
        std::env::set_var("OPENAI_API_KEY", "  sk-openai \n");
        let cfg = StoryboardConfig::load_from(&bare).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("sk-openai"));
        assert!(cfg.has_api_key());

        std::env::set_var("OPENAI_API_KEY", "   ");
        let cfg = StoryboardConfig::load_from(&bare).unwrap();
        assert_eq!(cfg.api_key, None);
        assert!(!cfg.has_api_key());
        clear_env();
    }
}
