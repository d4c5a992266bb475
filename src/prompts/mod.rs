//! Prompt templates, one per flow. Template selection is static: each flow
//! always renders its own template.

pub mod personalized;
pub mod recognize;
pub mod substitutions;
pub mod suggest;

/// A rendered template ready for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPrompt {
    pub system: String,
    pub prompt: String,
    pub media: Option<String>,
}

pub(crate) const JSON_ONLY: &str = "Respond ONLY with a JSON object that follows the provided schema. Do not include explanatory text or markdown formatting before or after the JSON object.";

/// Joins list items the way the prompts present them: `a, b, c`.
pub(crate) fn comma_list(items: &[String]) -> String {
    items.join(", ")
}
