use super::{FlowClient, PromptContract};
use crate::api_connection::endpoints::JsonSchemaDefinition;
use crate::error::FlowError;
use crate::prompts::personalized::{render_personalized_prompt, SUGGEST_PERSONALIZED_PROMPT_NAME};
use crate::prompts::RenderedPrompt;
use crate::schema::{SuggestPersonalizedRecipesInput, SuggestPersonalizedRecipesOutput};

pub struct SuggestPersonalizedRecipes;

impl PromptContract for SuggestPersonalizedRecipes {
    const FLOW: &'static str = "suggestPersonalizedRecipes";
    const TEMPLATE: &'static str = SUGGEST_PERSONALIZED_PROMPT_NAME;

    type Input = SuggestPersonalizedRecipesInput;
    type Output = SuggestPersonalizedRecipesOutput;

    fn output_schema() -> JsonSchemaDefinition {
        SuggestPersonalizedRecipesOutput::schema_definition()
    }

    fn render(input: &Self::Input) -> RenderedPrompt {
        render_personalized_prompt(input)
    }
}

impl FlowClient {
    /// Suggest new recipes from the user's rated favorites. Every suggestion carries an image URL.
    pub async fn suggest_personalized_recipes(
        &self,
        input: &SuggestPersonalizedRecipesInput,
    ) -> Result<SuggestPersonalizedRecipesOutput, FlowError> {
        self.invoke::<SuggestPersonalizedRecipes>(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeBackend;
    use crate::schema::RatedRecipe;
    use std::sync::Arc;

    fn input() -> SuggestPersonalizedRecipesInput {
        SuggestPersonalizedRecipesInput {
            favorite_recipes: vec![RatedRecipe {
                name: "Pad Thai".to_string(),
                rating: 5.0,
            }],
        }
    }

    const SUGGESTION: &str = r#"{
        "suggestions": [{
            "name": "Green Curry",
            "ingredients": [{"name": "coconut milk", "quantity": 400, "unit": "ml"}],
            "instructions": "Simmer.",
            "servings": 4,
            "cookingTime": 35,
            "difficulty": "Medium",
            "imageUrl": "https://images.unsplash.com/photo-green-curry"
        }]
    }"#;

    #[tokio::test]
    async fn suggestions_with_images_are_accepted() {
        let backend = Arc::new(FakeBackend::with_response(SUGGEST_PERSONALIZED_PROMPT_NAME, SUGGESTION));
        let client = FlowClient::new(backend);

        let output = client.suggest_personalized_recipes(&input()).await.unwrap();
        assert_eq!(output.suggestions.len(), 1);
        assert!(output.suggestions[0].image_url.is_some());
    }

    #[tokio::test]
    async fn suggestion_without_image_fails_closed() {
        let mut value: serde_json::Value = serde_json::from_str(SUGGESTION).unwrap();
        value["suggestions"][0]
            .as_object_mut()
            .unwrap()
            .remove("imageUrl");
        let response = value.to_string();
        let backend = Arc::new(FakeBackend::with_response(SUGGEST_PERSONALIZED_PROMPT_NAME, &response));
        let client = FlowClient::new(backend);

        let err = client.suggest_personalized_recipes(&input()).await.unwrap_err();
        match err {
            FlowError::OutputValidation { source, .. } => {
                assert_eq!(source.field, "suggestions[0].imageUrl")
            }
            other => panic!("expected output validation failure, got {:?}", other),
        }
    }
}
