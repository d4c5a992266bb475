use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::recipe::{Difficulty, ImagePolicy, RatedRecipe, Recipe};
use super::{validate_each, validate_non_blank_strings, Validate};
use crate::api_connection::endpoints::{JsonSchema, JsonSchemaDefinition};
use crate::error::ValidationError;

/// Missing ingredient name -> substitutes drawn from what the user has.
/// An empty list means no substitution was found.
pub type SubstitutionMap = BTreeMap<String, Vec<String>>;

/// A `data:<mime>;base64,<data>` URI carrying a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoDataUri(String);

impl PhotoDataUri {
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let uri = Self(raw.into());
        uri.validate()?;
        Ok(uri)
    }

    /// Wraps a value without checking it; the adapter still validates before any call.
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.split().map(|(mime, _)| mime)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let rest = self.0.strip_prefix("data:")?;
        let (header, payload) = rest.split_once(',')?;
        let mime = header.strip_suffix(";base64")?;
        Some((mime, payload))
    }
}

impl fmt::Display for PhotoDataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Payloads run to megabytes; show only the header.
        match self.mime_type() {
            Some(mime) => write!(f, "data:{};base64,<{} bytes>", mime, self.0.len()),
            None => write!(f, "<invalid data URI>"),
        }
    }
}

impl Validate for PhotoDataUri {
    fn validate(&self) -> Result<(), ValidationError> {
        let (mime, payload) = self.split().ok_or_else(|| {
            ValidationError::new(
                "photoDataUri",
                "expected format 'data:<mimetype>;base64,<encoded_data>'",
            )
        })?;
        let (kind, subtype) = mime.split_once('/').unwrap_or(("", ""));
        if kind.is_empty() || subtype.is_empty() {
            return Err(ValidationError::new(
                "photoDataUri",
                format!("'{}' is not a MIME type", mime),
            ));
        }
        if payload.is_empty() {
            return Err(ValidationError::new("photoDataUri", "image data is empty"));
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ValidationError::new("photoDataUri", format!("invalid base64: {}", e)))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizeIngredientsInput {
    pub photo_data_uri: PhotoDataUri,
}

impl Validate for RecognizeIngredientsInput {
    fn validate(&self) -> Result<(), ValidationError> {
        self.photo_data_uri.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizeIngredientsOutput {
    pub ingredients: Vec<String>,
}

impl RecognizeIngredientsOutput {
    pub fn schema_definition() -> JsonSchemaDefinition {
        JsonSchemaDefinition {
            name: "recognize_ingredients_output".to_string(),
            strict: Some(true),
            schema: JsonSchema::object(
                "Ingredients visible in the photo.",
                vec![(
                    "ingredients",
                    JsonSchema::array(
                        "The list of ingredients identified in the image.",
                        JsonSchema::string("One ingredient name."),
                    ),
                )],
                &[],
            ),
        }
    }
}

impl Validate for RecognizeIngredientsOutput {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_non_blank_strings("ingredients", &self.ingredients)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRecipesInput {
    pub ingredients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_preferences: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
}

impl SuggestRecipesInput {
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

impl Validate for SuggestRecipesInput {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_non_blank_strings("ingredients", &self.ingredients)?;
        if self.cooking_time == Some(0) {
            return Err(ValidationError::new("cookingTime", "must be at least 1 minute"));
        }
        for (field, value) in [
            ("dietaryPreferences", &self.dietary_preferences),
            ("cuisine", &self.cuisine),
        ] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ValidationError::new(field, "must be omitted rather than blank"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestRecipesOutput {
    pub recipes: Vec<Recipe>,
    pub reason: String,
}

impl SuggestRecipesOutput {
    pub fn schema_definition() -> JsonSchemaDefinition {
        JsonSchemaDefinition {
            name: "suggest_recipes_output".to_string(),
            strict: Some(false),
            schema: JsonSchema::object(
                "Recipe suggestions for the given ingredients.",
                vec![
                    (
                        "recipes",
                        JsonSchema::array(
                            "A list of suggested recipes.",
                            Recipe::json_schema(ImagePolicy::Forbidden),
                        ),
                    ),
                    (
                        "reason",
                        JsonSchema::string("Reasoning why these recipes are suggested."),
                    ),
                ],
                &[],
            ),
        }
    }
}

impl Validate for SuggestRecipesOutput {
    fn validate(&self) -> Result<(), ValidationError> {
        self.recipes
            .iter()
            .enumerate()
            .try_for_each(|(index, recipe)| {
                recipe
                    .validate_with(ImagePolicy::Forbidden)
                    .map_err(|e| e.nested(&format!("[{}]", index)))
            })
            .map_err(|e| e.nested("recipes"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestPersonalizedRecipesInput {
    pub favorite_recipes: Vec<RatedRecipe>,
}

impl Validate for SuggestPersonalizedRecipesInput {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_each(&self.favorite_recipes).map_err(|e| e.nested("favoriteRecipes"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestPersonalizedRecipesOutput {
    pub suggestions: Vec<Recipe>,
}

impl SuggestPersonalizedRecipesOutput {
    pub fn schema_definition() -> JsonSchemaDefinition {
        JsonSchemaDefinition {
            name: "suggest_personalized_recipes_output".to_string(),
            strict: Some(false),
            schema: JsonSchema::object(
                "Personalized recipe suggestions.",
                vec![(
                    "suggestions",
                    JsonSchema::array(
                        "A list of personalized recipe suggestions.",
                        Recipe::json_schema(ImagePolicy::Required),
                    ),
                )],
                &[],
            ),
        }
    }
}

impl Validate for SuggestPersonalizedRecipesOutput {
    fn validate(&self) -> Result<(), ValidationError> {
        self.suggestions
            .iter()
            .enumerate()
            .try_for_each(|(index, recipe)| {
                recipe
                    .validate_with(ImagePolicy::Required)
                    .map_err(|e| e.nested(&format!("[{}]", index)))
            })
            .map_err(|e| e.nested("suggestions"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestSubstitutionsInput {
    pub missing_ingredients: Vec<String>,
    pub available_ingredients: Vec<String>,
    pub recipe_name: String,
}

impl Validate for SuggestSubstitutionsInput {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_non_blank_strings("missingIngredients", &self.missing_ingredients)?;
        validate_non_blank_strings("availableIngredients", &self.available_ingredients)?;
        if self.recipe_name.trim().is_empty() {
            return Err(ValidationError::new("recipeName", "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SuggestSubstitutionsOutput {
    pub substitutions: SubstitutionMap,
}

impl SuggestSubstitutionsOutput {
    pub fn schema_definition() -> JsonSchemaDefinition {
        JsonSchemaDefinition {
            name: "suggest_substitutions_output".to_string(),
            strict: Some(false),
            schema: JsonSchema::object(
                "Substitutions for missing ingredients.",
                vec![(
                    "substitutions",
                    JsonSchema::map_of(
                        "A map of missing ingredients to a list of suggested substitutions.",
                        JsonSchema::array(
                            "Substitutes, empty when nothing suitable is available.",
                            JsonSchema::string("A substitute ingredient."),
                        ),
                    ),
                )],
                &[],
            ),
        }
    }
}

impl Validate for SuggestSubstitutionsOutput {
    fn validate(&self) -> Result<(), ValidationError> {
        for (missing, substitutes) in &self.substitutions {
            if missing.trim().is_empty() {
                return Err(ValidationError::new("substitutions", "contains a blank key"));
            }
            validate_non_blank_strings(&format!("substitutions.{}", missing), substitutes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::sample_recipe;
    use serde_json::json;

    #[test]
    fn data_uri_requires_mime_and_base64_payload() {
        assert!(PhotoDataUri::new("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(PhotoDataUri::new("data:image/png,iVBORw0KGgo=").is_err());
        assert!(PhotoDataUri::new("data:;base64,iVBORw0KGgo=").is_err());
        assert!(PhotoDataUri::new("data:image/png;base64,").is_err());
        assert!(PhotoDataUri::new("data:image/png;base64,***").is_err());
        assert!(PhotoDataUri::new("https://example.com/a.png").is_err());
    }

    #[test]
    fn data_uri_display_hides_payload() {
        let uri = PhotoDataUri::new("data:image/jpeg;base64,QUJD").unwrap();
        assert_eq!(uri.mime_type(), Some("image/jpeg"));
        assert!(!uri.to_string().contains("QUJD"));
    }

    #[test]
    fn suggest_input_omits_absent_filters() {
        let input = SuggestRecipesInput::new(["egg", "flour"]);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"ingredients": ["egg", "flour"]})
        );
        assert!(input.validate().is_ok());
    }

    #[test]
    fn suggest_input_allows_empty_ingredients_but_not_blank_ones() {
        assert!(SuggestRecipesInput::default().validate().is_ok());
        let err = SuggestRecipesInput::new(["egg", "  "]).validate().unwrap_err();
        assert_eq!(err.field, "ingredients[1]");
    }

    #[test]
    fn suggest_output_rejects_images_on_plain_suggestions() {
        let mut recipe = sample_recipe("Omelette");
        recipe.image_url = Some("https://example.com/o.jpg".to_string());
        let output = SuggestRecipesOutput {
            recipes: vec![sample_recipe("Crepes"), recipe],
            reason: "eggs".to_string(),
        };
        assert_eq!(output.validate().unwrap_err().field, "recipes[1].imageUrl");
    }

    #[test]
    fn personalized_output_requires_images() {
        let output = SuggestPersonalizedRecipesOutput {
            suggestions: vec![sample_recipe("Crepes")],
        };
        assert_eq!(output.validate().unwrap_err().field, "suggestions[0].imageUrl");
    }

    #[test]
    fn personalized_input_rejects_out_of_range_ratings() {
        let input = SuggestPersonalizedRecipesInput {
            favorite_recipes: vec![RatedRecipe {
                name: "Soup".to_string(),
                rating: 0.0,
            }],
        };
        assert_eq!(input.validate().unwrap_err().field, "favoriteRecipes[0].rating");
    }

    #[test]
    fn substitutions_parse_from_json_object() {
        let output: SuggestSubstitutionsOutput = serde_json::from_value(json!({
            "substitutions": {"Onion": ["Shallot"], "Saffron": []}
        }))
        .unwrap();
        assert!(output.validate().is_ok());
        assert_eq!(output.substitutions["Onion"], vec!["Shallot".to_string()]);
        assert!(output.substitutions["Saffron"].is_empty());
    }

    #[test]
    fn substitution_input_requires_recipe_name() {
        let input = SuggestSubstitutionsInput {
            missing_ingredients: vec!["Onion".to_string()],
            available_ingredients: vec![],
            recipe_name: " ".to_string(),
        };
        assert_eq!(input.validate().unwrap_err().field, "recipeName");
    }
}
