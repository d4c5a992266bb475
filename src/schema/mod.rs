//! Typed request/response contracts for the four generative flows.
//!
//! Every input and output type implements [`Validate`]. Inputs are checked
//! before a backend call is made and outputs are checked after the backend
//! response has been parsed, so nothing half-valid ever reaches a caller.

mod contracts;
mod recipe;

pub use contracts::{
    PhotoDataUri, RecognizeIngredientsInput, RecognizeIngredientsOutput,
    SuggestPersonalizedRecipesInput, SuggestPersonalizedRecipesOutput, SuggestRecipesInput,
    SuggestRecipesOutput, SuggestSubstitutionsInput, SuggestSubstitutionsOutput, SubstitutionMap,
};
pub use recipe::{Difficulty, ImagePolicy, Ingredient, RatedRecipe, Recipe, MAX_RATING, MIN_RATING};

#[cfg(test)]
pub(crate) use recipe::tests::sample_recipe;

use crate::error::ValidationError;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Validates every element, reporting the first failure under `[index]`.
pub(crate) fn validate_each<T: Validate>(items: &[T]) -> Result<(), ValidationError> {
    items
        .iter()
        .enumerate()
        .try_for_each(|(index, item)| item.validate().map_err(|e| e.nested(&format!("[{}]", index))))
}

pub(crate) fn validate_non_blank_strings(
    field: &str,
    items: &[String],
) -> Result<(), ValidationError> {
    match items.iter().position(|item| item.trim().is_empty()) {
        Some(index) => Err(ValidationError::new(
            format!("{}[{}]", field, index),
            "must not be blank",
        )),
        None => Ok(()),
    }
}
