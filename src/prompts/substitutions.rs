//! Prompt template for ingredient substitutions.

use super::{comma_list, RenderedPrompt, JSON_ONLY};
use crate::schema::SuggestSubstitutionsInput;

pub const SUGGEST_SUBSTITUTIONS_PROMPT_NAME: &str = "suggestSubstitutionsPrompt";

pub fn render_substitutions_prompt(input: &SuggestSubstitutionsInput) -> RenderedPrompt {
    let prompt = format!(
        "You are given a list of missing ingredients and a list of available ingredients.
For each missing ingredient, suggest one or more suitable substitutions using only ingredients from the provided available ingredients.
If no suitable substitution is possible with the available ingredients, map that ingredient to an empty array.

Recipe Name: {}
Missing Ingredients: {}
Available Ingredients: {}

Return {{\"substitutions\": {{...}}}} where each missing ingredient, spelled exactly as above, maps to an array of substitutions.",
        input.recipe_name,
        comma_list(&input.missing_ingredients),
        comma_list(&input.available_ingredients),
    );

    RenderedPrompt {
        system: format!(
            "You are a helpful assistant that suggests ingredient substitutions for recipes. {}",
            JSON_ONLY
        ),
        prompt,
        media: None,
    }
}
