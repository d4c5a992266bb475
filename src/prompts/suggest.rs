//! Prompt template for suggesting recipes from a list of ingredients.

use super::{comma_list, RenderedPrompt, JSON_ONLY};
use crate::schema::SuggestRecipesInput;

pub const SUGGEST_RECIPES_PROMPT_NAME: &str = "suggestRecipesPrompt";

pub fn render_suggest_recipes_prompt(input: &SuggestRecipesInput) -> RenderedPrompt {
    let mut prompt = format!("Ingredients: {}\n", comma_list(&input.ingredients));

    if let Some(diet) = &input.dietary_preferences {
        prompt.push_str(&format!("Dietary Preferences: {}\n", diet));
    }
    if let Some(minutes) = input.cooking_time {
        prompt.push_str(&format!("Maximum Cooking Time: {} minutes\n", minutes));
    }
    if let Some(difficulty) = input.difficulty {
        prompt.push_str(&format!("Difficulty: {}\n", difficulty));
    }
    if let Some(cuisine) = &input.cuisine {
        prompt.push_str(&format!("Cuisine: {}\n", cuisine));
    }

    prompt.push_str(
        "\nFor each recipe, provide all the fields specified in the output schema. Ensure ingredient quantities and units are precise. Servings and cooking time are whole numbers greater than zero. Do not include image URLs. Explain in \"reason\" why these recipes fit.",
    );

    RenderedPrompt {
        system: format!(
            "You are a world-class chef with a vast internal database of recipes from around the globe. Given the ingredients and user preferences, suggest a list of recipes. {}",
            JSON_ONLY
        ),
        prompt,
        media: None,
    }
}
