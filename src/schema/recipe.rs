use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{validate_each, Validate};
use crate::api_connection::endpoints::JsonSchema;
use crate::error::ValidationError;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ValidationError::new("difficulty", format!("'{}' is not Easy, Medium or Hard", s))
            })
    }
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl Validate for Ingredient {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err(ValidationError::new(
                "quantity",
                format!("must be a non-negative number, got {}", self.quantity),
            ));
        }
        Ok(())
    }
}

/// A recipe as produced by the suggestion flows and kept in favorites.
///
/// `name` is the only identity a recipe has: favorites lookup, substitution
/// correlation and list rendering all key on it, so two different recipes
/// with the same name collide.
///
/// `rating` is absent on fresh suggestions. Favorites start at `0.0`
/// (saved, not yet rated) and hold 1..=5 once rated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutritional_info: Option<String>,
    pub servings: u32,
    pub cooking_time: u32,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Whether a recipe must, may, or must not carry an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePolicy {
    Forbidden,
    /// Saved favorites may or may not carry an image; a present one must be an http(s) URL.
    Optional,
    Required,
}

impl Recipe {
    /// Rated means a user rating in 1..=5 has been recorded.
    pub fn is_rated(&self) -> bool {
        self.rating
            .map(|r| (MIN_RATING..=MAX_RATING).contains(&r))
            .unwrap_or(false)
    }

    /// Validate a recipe coming out of a flow. Any rating present must be 1..=5.
    pub fn validate_with(&self, images: ImagePolicy) -> Result<(), ValidationError> {
        self.validate_body(images)?;
        if let Some(rating) = self.rating {
            validate_rating(rating).map_err(|e| e.nested("rating"))?;
        }
        Ok(())
    }

    /// Validate a recipe entering or read back from the favorites collection,
    /// where a rating of `0` marks a saved but unrated recipe.
    pub fn validate_stored(&self) -> Result<(), ValidationError> {
        self.validate_body(ImagePolicy::Optional)?;
        match self.rating {
            Some(rating) if rating != 0.0 => validate_rating(rating).map_err(|e| e.nested("rating")),
            _ => Ok(()),
        }
    }

    fn validate_body(&self, images: ImagePolicy) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        validate_each(&self.ingredients).map_err(|e| e.nested("ingredients"))?;
        if self.servings < 1 {
            return Err(ValidationError::new("servings", "must be at least 1"));
        }
        if self.cooking_time < 1 {
            return Err(ValidationError::new("cookingTime", "must be at least 1 minute"));
        }
        match (images, self.image_url.as_deref()) {
            (ImagePolicy::Forbidden, Some(_)) => Err(ValidationError::new(
                "imageUrl",
                "is only allowed on personalized suggestions",
            )),
            (ImagePolicy::Required, None) => {
                Err(ValidationError::new("imageUrl", "is required"))
            }
            (ImagePolicy::Required | ImagePolicy::Optional, Some(raw)) => {
                validate_http_url(raw).map_err(|e| e.nested("imageUrl"))
            }
            (ImagePolicy::Forbidden | ImagePolicy::Optional, None) => Ok(()),
        }
    }

    pub fn json_schema(images: ImagePolicy) -> JsonSchema {
        let ingredient = JsonSchema::object(
            "One ingredient line of the recipe.",
            vec![
                ("name", JsonSchema::string("The name of the ingredient.")),
                ("quantity", JsonSchema::number("The amount of the ingredient.")),
                (
                    "unit",
                    JsonSchema::string(
                        "The unit of measurement for the quantity (e.g., grams, ml, cups, tbsp).",
                    ),
                ),
            ],
            &[],
        );

        let mut properties = vec![
            ("name", JsonSchema::string("The name of the recipe.")),
            (
                "ingredients",
                JsonSchema::array("The ingredients required for the recipe.", ingredient),
            ),
            (
                "instructions",
                JsonSchema::string("The cooking instructions for the recipe."),
            ),
            (
                "nutritionalInfo",
                JsonSchema::string("Nutritional information for the recipe."),
            ),
            (
                "servings",
                JsonSchema::integer("The number of servings the recipe makes."),
            ),
            (
                "cookingTime",
                JsonSchema::integer("The total cooking time in minutes."),
            ),
            (
                "difficulty",
                JsonSchema::string_enum(
                    "The difficulty level of the recipe.",
                    &["Easy", "Medium", "Hard"],
                ),
            ),
        ];
        if images == ImagePolicy::Required {
            properties.push((
                "imageUrl",
                JsonSchema::string("A URL for a high-quality image of the recipe."),
            ));
        }

        JsonSchema::object("A recipe.", properties, &["nutritionalInfo"])
    }
}

/// The projection of a favorite that feeds personalized suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedRecipe {
    pub name: String,
    pub rating: f64,
}

impl Validate for RatedRecipe {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::new("name", "must not be empty"));
        }
        validate_rating(self.rating).map_err(|e| e.nested("rating"))
    }
}

impl TryFrom<&Recipe> for RatedRecipe {
    type Error = ValidationError;

    fn try_from(recipe: &Recipe) -> Result<Self, Self::Error> {
        let rated = RatedRecipe {
            name: recipe.name.clone(),
            rating: recipe.rating.unwrap_or(0.0),
        };
        rated.validate()?;
        Ok(rated)
    }
}

fn validate_rating(rating: f64) -> Result<(), ValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "",
            format!("must be between {} and {}, got {}", MIN_RATING, MAX_RATING, rating),
        ))
    }
}

fn validate_http_url(raw: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ValidationError::new("", format!("'{}' is not a valid URL: {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::new(
            "",
            format!("unsupported URL scheme '{}'", other),
        )),
    }
}
