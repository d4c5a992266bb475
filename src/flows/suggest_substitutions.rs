use super::{FlowClient, PromptContract};
use crate::api_connection::endpoints::JsonSchemaDefinition;
use crate::error::FlowError;
use crate::prompts::substitutions::{render_substitutions_prompt, SUGGEST_SUBSTITUTIONS_PROMPT_NAME};
use crate::prompts::RenderedPrompt;
use crate::schema::{SuggestSubstitutionsInput, SuggestSubstitutionsOutput};

pub struct SuggestSubstitutions;

impl PromptContract for SuggestSubstitutions {
    const FLOW: &'static str = "suggestSubstitutions";
    const TEMPLATE: &'static str = SUGGEST_SUBSTITUTIONS_PROMPT_NAME;

    type Input = SuggestSubstitutionsInput;
    type Output = SuggestSubstitutionsOutput;

    fn output_schema() -> JsonSchemaDefinition {
        SuggestSubstitutionsOutput::schema_definition()
    }

    fn render(input: &Self::Input) -> RenderedPrompt {
        render_substitutions_prompt(input)
    }
}

impl FlowClient {
    /// Suggest substitutes for missing ingredients, drawn from the available ones.
    pub async fn suggest_substitutions(
        &self,
        input: &SuggestSubstitutionsInput,
    ) -> Result<SuggestSubstitutionsOutput, FlowError> {
        self.invoke::<SuggestSubstitutions>(input).await
    }
}
