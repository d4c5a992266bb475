//! Fake backend for tests and offline runs.
//!
//! Replies are scripted per template and consumed in order, and every request
//! is recorded so callers can assert how often (and with what) the backend
//! was invoked.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{GenerationRequest, GenerativeBackend};
use crate::error::BackendError;

#[derive(Debug, Clone)]
enum FakeOutcome {
    Respond(String),
    Fail(String),
}

#[derive(Debug, Clone)]
struct FakeReply {
    outcome: FakeOutcome,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    /// Template name -> replies still to hand out.
    replies: Mutex<HashMap<String, VecDeque<FakeReply>>>,
    calls: Mutex<Vec<GenerationRequest>>,
    default_response: Option<String>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that answers one call to `template` with `response`.
    pub fn with_response(template: &str, response: &str) -> Self {
        let backend = Self::new();
        backend.push_response(template, response);
        backend
    }

    /// Answer any template without a scripted reply.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    pub fn push_response(&self, template: &str, response: &str) {
        self.push(template, FakeOutcome::Respond(response.to_string()), None);
    }

    /// Like [`push_response`](Self::push_response) but the reply arrives after `delay`.
    pub fn push_delayed_response(&self, template: &str, response: &str, delay: Duration) {
        self.push(template, FakeOutcome::Respond(response.to_string()), Some(delay));
    }

    pub fn push_failure(&self, template: &str, message: &str) {
        self.push(template, FakeOutcome::Fail(message.to_string()), None);
    }

    fn push(&self, template: &str, outcome: FakeOutcome, delay: Option<Duration>) {
        lock(&self.replies)
            .entry(template.to_string())
            .or_default()
            .push_back(FakeReply { outcome, delay });
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn calls_for(&self, template: &str) -> Vec<GenerationRequest> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.template == template)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        lock(&self.calls).push(request.clone());

        let reply = lock(&self.replies)
            .get_mut(request.template)
            .and_then(VecDeque::pop_front);

        let reply = match (reply, &self.default_response) {
            (Some(reply), _) => reply,
            (None, Some(default)) => FakeReply {
                outcome: FakeOutcome::Respond(default.clone()),
                delay: None,
            },
            (None, None) => {
                return Err(BackendError::RequestFailed(format!(
                    "FakeBackend: no response configured for template {}",
                    request.template
                )))
            }
        };

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        match reply.outcome {
            FakeOutcome::Respond(text) => Ok(text),
            FakeOutcome::Fail(message) => Err(BackendError::RequestFailed(message)),
        }
    }

    fn backend_name(&self) -> &'static str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_connection::endpoints::{JsonSchema, JsonSchemaDefinition};

    fn request(template: &'static str) -> GenerationRequest {
        GenerationRequest {
            template,
            system: String::new(),
            prompt: "prompt".to_string(),
            media: None,
            output_schema: JsonSchemaDefinition {
                name: "x".to_string(),
                strict: None,
                schema: JsonSchema::object("x", vec![], &[]),
            },
        }
    }

    #[tokio::test]
    async fn replies_are_consumed_in_order_per_template() {
        let backend = FakeBackend::new();
        backend.push_response("a", "first");
        backend.push_response("a", "second");
        backend.push_response("b", "other");

        assert_eq!(backend.generate(&request("a")).await.unwrap(), "first");
        assert_eq!(backend.generate(&request("b")).await.unwrap(), "other");
        assert_eq!(backend.generate(&request("a")).await.unwrap(), "second");
        assert!(backend.generate(&request("a")).await.is_err());
        assert_eq!(backend.call_count(), 4);
        assert_eq!(backend.calls_for("a").len(), 3);
    }

    #[tokio::test]
    async fn default_response_covers_unscripted_templates() {
        let backend = FakeBackend::new().with_default_response("{}");
        assert_eq!(backend.generate(&request("anything")).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn scripted_failures_surface_as_request_failures() {
        let backend = FakeBackend::new();
        backend.push_failure("a", "connection reset");
        let err = backend.generate(&request("a")).await.unwrap_err();
        assert!(matches!(err, BackendError::RequestFailed(m) if m == "connection reset"));
    }
}
