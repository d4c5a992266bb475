use super::{FlowClient, PromptContract};
use crate::api_connection::endpoints::JsonSchemaDefinition;
use crate::error::FlowError;
use crate::prompts::recognize::{render_recognize_ingredients_prompt, RECOGNIZE_INGREDIENTS_PROMPT_NAME};
use crate::prompts::RenderedPrompt;
use crate::schema::{RecognizeIngredientsInput, RecognizeIngredientsOutput};

pub struct RecognizeIngredients;

impl PromptContract for RecognizeIngredients {
    const FLOW: &'static str = "recognizeIngredients";
    const TEMPLATE: &'static str = RECOGNIZE_INGREDIENTS_PROMPT_NAME;

    type Input = RecognizeIngredientsInput;
    type Output = RecognizeIngredientsOutput;

    fn output_schema() -> JsonSchemaDefinition {
        RecognizeIngredientsOutput::schema_definition()
    }

    fn render(input: &Self::Input) -> RenderedPrompt {
        render_recognize_ingredients_prompt(input)
    }
}

impl FlowClient {
    /// Identify the ingredients visible in a photo.
    pub async fn recognize_ingredients(
        &self,
        input: &RecognizeIngredientsInput,
    ) -> Result<RecognizeIngredientsOutput, FlowError> {
        self.invoke::<RecognizeIngredients>(input).await
    }
}
