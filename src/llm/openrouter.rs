use async_trait::async_trait;

use super::{GenerationRequest, GenerativeBackend};
use crate::api_connection::connection::{first_message_content, ApiConnectionError};
use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatMessage, Provider, ResponseFormat,
};
use crate::error::BackendError;

const TEMPERATURE: f32 = 0.4;
const MAX_TOKENS: u32 = 4096;

/// OpenRouter chat-completions backend with JSON-schema constrained output.
#[derive(Debug, Clone)]
pub struct OpenRouterBackend {
    provider: Provider,
    model: String,
    vision_model: String,
}

impl OpenRouterBackend {
    pub fn new(api_key: String, base_url: &str, model: &str, vision_model: &str) -> Self {
        Self {
            provider: Provider::openrouter(api_key, base_url),
            model: model.to_string(),
            vision_model: vision_model.to_string(),
        }
    }

    /// Refuse a vision model the catalog lists as text-only. Models missing
    /// from the catalog are passed through.
    pub fn check_vision_model(&self) -> Result<(), BackendError> {
        let known = self
            .provider
            .get_available_models()
            .into_iter()
            .find(|m| m.model_name == self.vision_model);
        match known {
            Some(m) if !m.supports_images => Err(BackendError::NotConfigured(format!(
                "vision model '{}' does not accept images",
                self.vision_model
            ))),
            Some(_) => Ok(()),
            None => {
                tracing::debug!(model = %self.vision_model, "Vision model not in catalog, assuming image support");
                Ok(())
            }
        }
    }

    fn build_request(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        let (model, user_message) = match &request.media {
            Some(media) => (
                self.vision_model.clone(),
                ChatMessage::user_with_image(request.prompt.clone(), media.clone()),
            ),
            None => (self.model.clone(), ChatMessage::user(request.prompt.clone())),
        };

        ChatCompletionRequest {
            model,
            messages: vec![ChatMessage::system(request.system.clone()), user_message],
            response_format: Some(ResponseFormat::json_schema(request.output_schema.clone())),
            temperature: Some(TEMPERATURE),
            max_tokens: Some(MAX_TOKENS),
        }
    }
}

impl From<ApiConnectionError> for BackendError {
    fn from(err: ApiConnectionError) -> Self {
        match err {
            ApiConnectionError::MissingApiKey(key) => {
                BackendError::NotConfigured(format!("{} not set", key))
            }
            ApiConnectionError::ApiError { status, error_body } => BackendError::ApiError {
                status: status.as_u16(),
                message: error_body,
            },
            ApiConnectionError::EmptyResponse => BackendError::EmptyResponse,
            other => BackendError::RequestFailed(other.to_string()),
        }
    }
}

#[async_trait]
impl GenerativeBackend for OpenRouterBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let chat_request = self.build_request(request);
        tracing::debug!(
            template = request.template,
            model = %chat_request.model,
            with_media = request.media.is_some(),
            "Calling OpenRouter"
        );

        let response = self.provider.call_chat_completion(chat_request).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                template = request.template,
                prompt_tokens = usage.prompt_tokens,
                total_tokens = usage.total_tokens,
                "OpenRouter usage"
            );
        }
        Ok(first_message_content(&response)?)
    }

    fn backend_name(&self) -> &'static str {
        "openrouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::endpoints::{JsonSchema, JsonSchemaDefinition, MessageContent};

    fn request(media: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            template: "testPrompt",
            system: "Be brief.".to_string(),
            prompt: "List things.".to_string(),
            media: media.map(str::to_string),
            output_schema: JsonSchemaDefinition {
                name: "things".to_string(),
                strict: Some(true),
                schema: JsonSchema::object("Things", vec![], &[]),
            },
        }
    }

    #[test]
    fn text_requests_use_text_model() {
        let backend = OpenRouterBackend::new("k".into(), "http://localhost", "text-m", "vision-m");
        let chat = backend.build_request(&request(None));
        assert_eq!(chat.model, "text-m");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(
            chat.messages[1].content,
            MessageContent::Text("List things.".to_string())
        );
        let format = chat.response_format.unwrap();
        assert_eq!(format.format_type, "json_schema");
        assert_eq!(format.json_schema.unwrap().name, "things");
    }

    #[test]
    fn media_requests_switch_to_vision_model() {
        let backend = OpenRouterBackend::new("k".into(), "http://localhost", "text-m", "vision-m");
        let chat = backend.build_request(&request(Some("data:image/png;base64,AAAA")));
        assert_eq!(chat.model, "vision-m");
        assert!(matches!(chat.messages[1].content, MessageContent::Parts(ref parts) if parts.len() == 2));
    }

    #[test]
    fn api_errors_keep_their_status() {
        let err: BackendError = ApiConnectionError::ApiError {
            status: reqwest::StatusCode::UNAUTHORIZED,
            error_body: "bad key".to_string(),
        }
        .into();
        assert!(matches!(err, BackendError::ApiError { status: 401, .. }));
    }

    #[test]
    fn text_only_vision_model_is_refused() {
        let backend = OpenRouterBackend::new("k".into(), "http://localhost", "text-m", "qwen/qwen3-32b");
        assert!(matches!(
            backend.check_vision_model(),
            Err(BackendError::NotConfigured(ref msg)) if msg.contains("qwen/qwen3-32b")
        ));
    }

    #[test]
    fn image_capable_or_unknown_vision_models_pass() {
        let listed = OpenRouterBackend::new("k".into(), "http://localhost", "text-m", "openai/gpt-4o-mini");
        assert!(listed.check_vision_model().is_ok());
        let unlisted = OpenRouterBackend::new("k".into(), "http://localhost", "text-m", "vision-m");
        assert!(unlisted.check_vision_model().is_ok());
    }
}
