use reqwest::Client;
use serde_json::json;
use std::env;
use std::error::Error;
use std::fmt;

use super::endpoints::{
    ChatCompletionRequest, ChatCompletionResponse, OpenRouterAvailableModel, Provider,
    OPENROUTER_BASE_URL, OPENROUTER_MODELS,
};

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    EmptyResponse,
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(key_name) => {
                write!(f, "API key not found in environment: {}", key_name)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
            ApiConnectionError::EmptyResponse => {
                write!(f, "API returned no message content")
            }
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        ApiConnectionError::NetworkError(err)
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

impl Provider {
    pub fn openrouter(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::OpenRouter {
            api_key: api_key.into(),
            base_url: base_url.into(),
            site_url: env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "AI Chef".to_string()),
            http: Client::new(),
        }
    }

    /// Builds an OpenRouter provider whose key is read from `api_key_env_var_name`.
    pub fn openrouter_from_env(api_key_env_var_name: &str) -> Result<Self, ApiConnectionError> {
        dotenv::dotenv().ok();
        let api_key = env::var(api_key_env_var_name)
            .map_err(|_| ApiConnectionError::MissingApiKey(api_key_env_var_name.to_string()))?;
        Ok(Self::openrouter(api_key, OPENROUTER_BASE_URL))
    }

    pub fn get_available_models(&self) -> Vec<OpenRouterAvailableModel> {
        match self {
            Provider::OpenRouter { .. } => OPENROUTER_MODELS.to_vec(),
        }
    }

    pub async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        match self {
            Provider::OpenRouter {
                api_key,
                base_url,
                site_url,
                app_name,
                http,
            } => {
                let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

                let mut request_payload = serde_json::to_value(&request)?;
                if let Some(obj) = request_payload.as_object_mut() {
                    // Let OpenRouter fall back to another provider when the preferred one is down.
                    obj.insert("provider".to_string(), json!({ "allow_fallbacks": true }));
                }

                let response = http
                    .post(&url)
                    .bearer_auth(api_key)
                    .header("Content-Type", "application/json")
                    .header("HTTP-Referer", site_url.as_str())
                    .header("X-Title", app_name.as_str())
                    .json(&request_payload)
                    .send()
                    .await?;

                if response.status().is_success() {
                    let chat_response = response.json::<ChatCompletionResponse>().await?;
                    Ok(chat_response)
                } else {
                    let status = response.status();
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to read error body".to_string());
                    Err(ApiConnectionError::ApiError { status, error_body })
                }
            }
        }
    }
}

/// Returns the first choice's text with surrounding markdown code fences removed.
pub fn first_message_content(
    response: &ChatCompletionResponse,
) -> Result<String, ApiConnectionError> {
    let content = response
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .ok_or(ApiConnectionError::EmptyResponse)?;

    let stripped = strip_code_fences(content);
    if stripped.is_empty() {
        return Err(ApiConnectionError::EmptyResponse);
    }
    Ok(stripped.to_string())
}

pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6 {
        let inner = &trimmed[3..trimmed.len() - 3];
        inner.strip_prefix("json").unwrap_or(inner).trim()
    } else {
        trimmed
    }
}
