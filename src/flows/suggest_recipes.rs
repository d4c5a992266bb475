use super::{FlowClient, PromptContract};
use crate::api_connection::endpoints::JsonSchemaDefinition;
use crate::error::FlowError;
use crate::prompts::suggest::{render_suggest_recipes_prompt, SUGGEST_RECIPES_PROMPT_NAME};
use crate::prompts::RenderedPrompt;
use crate::schema::{SuggestRecipesInput, SuggestRecipesOutput};

pub struct SuggestRecipes;

impl PromptContract for SuggestRecipes {
    const FLOW: &'static str = "suggestRecipes";
    const TEMPLATE: &'static str = SUGGEST_RECIPES_PROMPT_NAME;

    type Input = SuggestRecipesInput;
    type Output = SuggestRecipesOutput;

    fn output_schema() -> JsonSchemaDefinition {
        SuggestRecipesOutput::schema_definition()
    }

    fn render(input: &Self::Input) -> RenderedPrompt {
        render_suggest_recipes_prompt(input)
    }
}

impl FlowClient {
    /// Suggest recipes for the given ingredients and optional filters.
    pub async fn suggest_recipes(
        &self,
        input: &SuggestRecipesInput,
    ) -> Result<SuggestRecipesOutput, FlowError> {
        self.invoke::<SuggestRecipes>(input).await
    }
}
