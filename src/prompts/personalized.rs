//! Prompt template for personalized suggestions based on rated favorites.

use super::{RenderedPrompt, JSON_ONLY};
use crate::schema::SuggestPersonalizedRecipesInput;

pub const SUGGEST_PERSONALIZED_PROMPT_NAME: &str = "suggestPersonalizedRecipesPrompt";

pub fn render_personalized_prompt(input: &SuggestPersonalizedRecipesInput) -> RenderedPrompt {
    let mut prompt =
        String::from("Here are the user's favorite recipes and their ratings (out of 5):\n");
    for favorite in &input.favorite_recipes {
        prompt.push_str(&format!("- {} (Rated: {}/5)\n", favorite.name, favorite.rating));
    }
    prompt.push_str(
        "\nPlease suggest some new and interesting recipes that align with these tastes. For each new recipe, provide all the fields specified in the output schema.\nIt is mandatory to provide a relevant, high-quality photo URL for the 'imageUrl' field for every recipe from a stock photo website like Unsplash. The image must accurately represent the recipe.",
    );

    RenderedPrompt {
        system: format!(
            "You are a recipe recommendation engine. Based on the user's rated favorite recipes, suggest a list of new recipes they might enjoy. {}",
            JSON_ONLY
        ),
        prompt,
        media: None,
    }
}
