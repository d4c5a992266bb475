//! Configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api_connection::endpoints::OPENROUTER_BASE_URL;

pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

pub const DEFAULT_MODEL: &str = "qwen/qwen3-32b";

/// Photo recognition needs a model that accepts image input.
pub const DEFAULT_VISION_MODEL: &str = "openai/gpt-4o-mini";

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

pub const DEFAULT_DATA_DIR: &str = ".ai-chef";

#[derive(Debug, Clone)]
pub struct ChefConfig {
    /// Name of the environment variable holding the OpenRouter key.
    pub api_key_env_var: String,
    pub model: String,
    pub vision_model: String,
    pub base_url: String,
    /// `None` leaves backend calls unbounded.
    pub timeout: Option<Duration>,
    /// Directory backing the favorites storage.
    pub data_dir: PathBuf,
}

impl Default for ChefConfig {
    fn default() -> Self {
        Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            model: DEFAULT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            base_url: OPENROUTER_BASE_URL.to_string(),
            timeout: Some(Duration::from_millis(DEFAULT_TIMEOUT_MS)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl ChefConfig {
    /// Load configuration, reading `.env` first if present.
    ///
    /// Optional:
    /// - `AI_CHEF_MODEL`: text model (default: "qwen/qwen3-32b")
    /// - `AI_CHEF_VISION_MODEL`: model for photo recognition (default: "openai/gpt-4o-mini")
    /// - `AI_CHEF_BASE_URL`: API base URL (default: "https://openrouter.ai/api/v1")
    /// - `AI_CHEF_TIMEOUT_MS`: per-call timeout, `0` disables it (default: 60000)
    /// - `AI_CHEF_DATA_DIR`: where favorites are stored (default: ".ai-chef")
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout_ms = lookup("AI_CHEF_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            api_key_env_var: defaults.api_key_env_var,
            model: lookup("AI_CHEF_MODEL").unwrap_or(defaults.model),
            vision_model: lookup("AI_CHEF_VISION_MODEL").unwrap_or(defaults.vision_model),
            base_url: lookup("AI_CHEF_BASE_URL").unwrap_or(defaults.base_url),
            timeout: timeout_from_millis(timeout_ms),
            data_dir: lookup("AI_CHEF_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        }
    }

    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env_var).ok().filter(|k| !k.is_empty())
    }
}

pub fn timeout_from_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}
