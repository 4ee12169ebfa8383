//! Configuration for glance.
//!
//! Settings are resolved in layers, later layers overriding earlier ones:
//! 1. Default values
//! 2. Config file (`~/.glance/config.toml`)
//! 3. Environment variables (`OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL`)
//! 4. Command-line arguments (applied by the binary with the `with_*` setters)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::image::ImageFormat;

/// Resolved configuration for a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlanceConfig {
    /// API key sent as a bearer credential.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Prompt sent alongside the image.
    pub prompt: String,
    /// Image to describe.
    pub image: Option<PathBuf>,
    /// Format declared in the image data URL.
    pub format: ImageFormat,
    /// Request timeout in seconds; the HTTP library default when unset.
    pub timeout_secs: Option<u64>,
}

impl GlanceConfig {
    /// Default API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    /// Default model.
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";
    /// Default prompt.
    pub const DEFAULT_PROMPT: &'static str = "What is in this image?";

    /// Load the config file at `path` on top of the defaults.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but cannot be read or
    /// parsed.
    pub async fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::config(format!("failed to read {}: {e}", path.display())))?;
        let config = Self::from_toml(&content)
            .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config file");

        Ok(config)
    }

    /// Parse a TOML document on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on invalid TOML or unknown keys.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Apply `OPENAI_*` environment variables.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `OPENAI_*` variables looked up through `lookup`.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.is_empty()) {
            self.model = model;
        }
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the image path.
    #[must_use]
    pub fn with_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.image = Some(path.into());
        self
    }

    /// Sets the declared image format.
    #[must_use]
    pub const fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Check that everything needed for a run is present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing or invalid value.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(Error::config("API key is not set (OPENAI_API_KEY)"));
        }
        if self.base_url.is_empty() {
            return Err(Error::config("base URL is empty"));
        }
        if self.model.is_empty() {
            return Err(Error::config("model is empty"));
        }
        if self.image.is_none() {
            return Err(Error::config("no image path given"));
        }
        Ok(())
    }
}

impl Default for GlanceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            prompt: Self::DEFAULT_PROMPT.to_owned(),
            image: None,
            format: ImageFormat::Jpeg,
            timeout_secs: None,
        }
    }
}

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".glance")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}
