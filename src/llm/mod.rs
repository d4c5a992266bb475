//! Generative backend abstraction.
//!
//! A backend takes a rendered prompt plus the JSON schema its answer must
//! follow and returns the model's raw text. Parsing and validation of that
//! text happen in [`crate::flows`], never here.

mod fake;
mod openrouter;

pub use fake::FakeBackend;
pub use openrouter::OpenRouterBackend;

use async_trait::async_trait;
use std::fmt;

use crate::api_connection::endpoints::JsonSchemaDefinition;
use crate::config::ChefConfig;
use crate::error::BackendError;

/// Everything a backend needs for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Static template identifier, e.g. `suggestRecipesPrompt`.
    pub template: &'static str,
    pub system: String,
    pub prompt: String,
    /// Optional image sent alongside the prompt, as a data URI.
    pub media: Option<String>,
    pub output_schema: JsonSchemaDefinition,
}

/// Trait for generative backends.
///
/// Implementations must not retry or cache: each `generate` call is exactly
/// one model invocation.
#[async_trait]
pub trait GenerativeBackend: Send + Sync + fmt::Debug {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;

    /// Short backend name for logs ("openrouter", "fake").
    fn backend_name(&self) -> &'static str;
}

/// Build the live backend from configuration.
pub fn create_backend(config: &ChefConfig) -> Result<Box<dyn GenerativeBackend>, BackendError> {
    let api_key = config.api_key().ok_or_else(|| {
        BackendError::NotConfigured(format!("{} not set", config.api_key_env_var))
    })?;
    let backend = OpenRouterBackend::new(api_key, &config.base_url, &config.model, &config.vision_model);
    backend.check_vision_model()?;
    Ok(Box::new(backend))
}
