use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::api_connection::connection::strip_code_fences;
use crate::api_connection::endpoints::JsonSchemaDefinition;
use crate::error::{BackendError, FlowError};
use crate::llm::{GenerationRequest, GenerativeBackend};
use crate::prompts::RenderedPrompt;
use crate::schema::Validate;

/// The static description of one flow: its template, its input and output
/// shapes, and the JSON schema the backend is asked to follow.
pub trait PromptContract {
    /// Flow name used in errors and logs.
    const FLOW: &'static str;
    const TEMPLATE: &'static str;

    type Input: Validate + Send + Sync;
    type Output: DeserializeOwned + Validate;

    fn output_schema() -> JsonSchemaDefinition;

    fn render(input: &Self::Input) -> RenderedPrompt;
}

/// Runs flows against a generative backend.
///
/// Holds no per-call state: identical inputs issued twice reach the backend
/// twice, and concurrent invocations do not share anything mutable.
#[derive(Debug, Clone)]
pub struct FlowClient {
    backend: Arc<dyn GenerativeBackend>,
    timeout: Option<Duration>,
}

impl FlowClient {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            backend,
            timeout: None,
        }
    }

    /// Abort backend calls that run longer than `timeout` with a timeout failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate `input`, render the contract's template, call the backend
    /// exactly once and return the parsed, validated output.
    pub async fn invoke<C: PromptContract>(&self, input: &C::Input) -> Result<C::Output, FlowError> {
        input
            .validate()
            .map_err(|source| FlowError::InputValidation {
                flow: C::FLOW,
                source,
            })?;

        let RenderedPrompt {
            system,
            prompt,
            media,
        } = C::render(input);
        let request = GenerationRequest {
            template: C::TEMPLATE,
            system,
            prompt,
            media,
            output_schema: C::output_schema(),
        };

        tracing::debug!(
            flow = C::FLOW,
            template = C::TEMPLATE,
            backend = self.backend.backend_name(),
            "Invoking generative backend"
        );

        let raw = self
            .call_backend(&request)
            .await
            .map_err(|source| {
                tracing::warn!(flow = C::FLOW, error = %source, "Backend invocation failed");
                FlowError::BackendInvocation {
                    flow: C::FLOW,
                    source,
                }
            })?;

        let output: C::Output = serde_json::from_str(strip_code_fences(&raw)).map_err(|source| {
            tracing::warn!(
                flow = C::FLOW,
                error = %source,
                response_len = raw.len(),
                "Backend response is not valid JSON for this flow"
            );
            FlowError::MalformedOutput {
                flow: C::FLOW,
                source,
            }
        })?;

        output.validate().map_err(|source| {
            tracing::warn!(flow = C::FLOW, error = %source, "Backend response failed validation");
            FlowError::OutputValidation {
                flow: C::FLOW,
                source,
            }
        })?;

        Ok(output)
    }

    async fn call_backend(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        let call = self.backend.generate(request);
        match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(BackendError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => call.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::SuggestSubstitutions;
    use crate::llm::FakeBackend;
    use crate::prompts::substitutions::SUGGEST_SUBSTITUTIONS_PROMPT_NAME;
    use crate::schema::SuggestSubstitutionsInput;

    fn input() -> SuggestSubstitutionsInput {
        SuggestSubstitutionsInput {
            missing_ingredients: vec!["Onion".to_string()],
            available_ingredients: vec!["shallot".to_string()],
            recipe_name: "French Onion Soup".to_string(),
        }
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let backend = Arc::new(FakeBackend::with_response(
            SUGGEST_SUBSTITUTIONS_PROMPT_NAME,
            "```json\n{\"substitutions\": {\"Onion\": [\"shallot\"]}}\n```",
        ));
        let client = FlowClient::new(backend);

        let output = client.invoke::<SuggestSubstitutions>(&input()).await.unwrap();
        assert_eq!(output.substitutions["Onion"], vec!["shallot".to_string()]);
    }

    #[tokio::test]
    async fn identical_inputs_reach_backend_every_time() {
        let backend = Arc::new(
            FakeBackend::new().with_default_response(r#"{"substitutions": {"Onion": []}}"#),
        );
        let client = FlowClient::new(backend.clone());

        client.suggest_substitutions(&input()).await.unwrap();
        client.suggest_substitutions(&input()).await.unwrap();
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn backend_failure_is_not_retried() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_failure(SUGGEST_SUBSTITUTIONS_PROMPT_NAME, "502 from upstream");
        backend.push_response(SUGGEST_SUBSTITUTIONS_PROMPT_NAME, r#"{"substitutions": {}}"#);
        let client = FlowClient::new(backend.clone());

        let err = client.suggest_substitutions(&input()).await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::BackendInvocation {
                source: BackendError::RequestFailed(_),
                ..
            }
        ));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn non_json_response_is_a_malformed_output() {
        let backend = Arc::new(FakeBackend::with_response(
            SUGGEST_SUBSTITUTIONS_PROMPT_NAME,
            "Onion -> shallot",
        ));
        let client = FlowClient::new(backend);

        let err = client.suggest_substitutions(&input()).await.unwrap_err();
        assert!(matches!(err, FlowError::MalformedOutput { flow: "suggestSubstitutions", .. }));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_the_call() {
        let backend = Arc::new(FakeBackend::new().with_default_response("{}"));
        let client = FlowClient::new(backend.clone());
        let mut bad = input();
        bad.recipe_name = String::new();

        let err = client.suggest_substitutions(&bad).await.unwrap_err();
        assert!(matches!(err, FlowError::InputValidation { .. }));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_delayed_response(
            SUGGEST_SUBSTITUTIONS_PROMPT_NAME,
            r#"{"substitutions": {}}"#,
            Duration::from_secs(30),
        );
        let client = FlowClient::new(backend).with_timeout(Some(Duration::from_millis(500)));

        let err = client.suggest_substitutions(&input()).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            FlowError::BackendInvocation {
                source: BackendError::Timeout { timeout_ms: 500 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn request_carries_template_and_schema() {
        let backend = Arc::new(
            FakeBackend::new().with_default_response(r#"{"substitutions": {}}"#),
        );
        let client = FlowClient::new(backend.clone());
        client.suggest_substitutions(&input()).await.unwrap();

        let call = &backend.calls()[0];
        assert_eq!(call.template, SUGGEST_SUBSTITUTIONS_PROMPT_NAME);
        assert_eq!(call.output_schema.name, "suggest_substitutions_output");
        assert!(call.prompt.contains("French Onion Soup"));
        assert!(call.media.is_none());
    }
}
