//! Prompt template for recognizing ingredients in a photo.

use super::{RenderedPrompt, JSON_ONLY};
use crate::schema::RecognizeIngredientsInput;

pub const RECOGNIZE_INGREDIENTS_PROMPT_NAME: &str = "recognizeIngredientsPrompt";

pub fn render_recognize_ingredients_prompt(input: &RecognizeIngredientsInput) -> RenderedPrompt {
    RenderedPrompt {
        system: format!("You are an AI that identifies ingredients from a photo. {}", JSON_ONLY),
        prompt: r#"Identify the ingredients in the attached photo.

Return them as {"ingredients": [...]}, one plain ingredient name per entry (e.g. "Tomato", "Cheddar Cheese"). Leave out packaging, utensils and anything that is not food."#
            .to_string(),
        media: Some(input.photo_data_uri.as_str().to_string()),
    }
}
