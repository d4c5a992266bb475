//! The four generative flows.
//!
//! Each flow is a [`PromptContract`] run through [`FlowClient::invoke`]:
//! validate input, render the flow's own template, call the backend once,
//! validate the output. Flows never call each other; chaining (for example
//! substitutions after a recipe is opened) happens in [`crate::session`].

mod adapter;
mod recognize_ingredients;
mod suggest_personalized;
mod suggest_recipes;
mod suggest_substitutions;

pub use adapter::{FlowClient, PromptContract};
pub use recognize_ingredients::RecognizeIngredients;
pub use suggest_personalized::SuggestPersonalizedRecipes;
pub use suggest_recipes::SuggestRecipes;
pub use suggest_substitutions::SuggestSubstitutions;
