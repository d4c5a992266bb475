use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A single schema violation, addressed by a dotted field path
/// such as `recipes[0].servings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefixes the field path, used when a nested value is validated inside a parent.
    pub fn nested(self, parent: &str) -> Self {
        let field = if self.field.is_empty() {
            parent.to_string()
        } else if self.field.starts_with('[') {
            format!("{}{}", parent, self.field)
        } else {
            format!("{}.{}", parent, self.field)
        };
        Self { field, ..self }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Failures reported by a generative backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Backend returned an empty response")]
    EmptyResponse,

    #[error("Backend call timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

/// Error returned by every flow.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid input for {flow}: {source}")]
    InputValidation {
        flow: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("backend invocation failed for {flow}: {source}")]
    BackendInvocation {
        flow: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("backend response for {flow} is not valid JSON: {source}")]
    MalformedOutput {
        flow: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("backend response for {flow} failed validation: {source}")]
    OutputValidation {
        flow: &'static str,
        #[source]
        source: ValidationError,
    },
}

impl FlowError {
    pub fn flow(&self) -> &'static str {
        match self {
            FlowError::InputValidation { flow, .. }
            | FlowError::BackendInvocation { flow, .. }
            | FlowError::MalformedOutput { flow, .. }
            | FlowError::OutputValidation { flow, .. } => flow,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            FlowError::BackendInvocation {
                source: BackendError::Timeout { .. },
                ..
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("rating must be a whole number between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("recipe cannot be saved: {0}")]
    InvalidRecipe(#[source] ValidationError),
}

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("could not read photo '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported photo type '{0}', expected an image")]
    UnsupportedType(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Errors surfaced by [`crate::session::ChefSession`] actions.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no ingredients: please add some ingredients first")]
    EmptyPantry,

    #[error("invalid filters: {0}")]
    InvalidFilters(ValidationError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Favorites(#[from] FavoritesError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths_join_with_dots_and_brackets() {
        let err = ValidationError::new("servings", "must be at least 1")
            .nested("[2]")
            .nested("recipes");
        assert_eq!(err.field, "recipes[2].servings");
        assert_eq!(err.to_string(), "recipes[2].servings: must be at least 1");
    }

    #[test]
    fn timeout_is_detected_through_flow_error() {
        let err = FlowError::BackendInvocation {
            flow: "suggestRecipes",
            source: BackendError::Timeout { timeout_ms: 10 },
        };
        assert!(err.is_timeout());
        assert_eq!(err.flow(), "suggestRecipes");
    }
}
