//! Recipe search filters as picked in the filter panel.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::schema::{Difficulty, SuggestRecipesInput, Validate};

/// Sentinel for "no dietary preference".
pub const NO_DIETARY_PREFERENCE: &str = "none";
/// Sentinel for "any cuisine".
pub const ANY_CUISINE: &str = "any";

pub const MIN_COOKING_TIME: u32 = 10;
pub const MAX_COOKING_TIME: u32 = 180;
pub const COOKING_TIME_STEP: u32 = 5;
pub const DEFAULT_COOKING_TIME: u32 = 120;

pub const DIETARY_PREFERENCES: &[&str] = &[
    "vegetarian",
    "vegan",
    "gluten-free",
    "dairy-free",
];

pub const CUISINES: &[&str] = &[
    "Italian",
    "Mexican",
    "Chinese",
    "Indian",
    "Japanese",
    "Thai",
    "French",
    "Spanish",
    "Greek",
    "Mediterranean",
    "American",
    "Korean",
    "Vietnamese",
    "Middle Eastern",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DifficultyFilter {
    #[default]
    #[serde(rename = "any")]
    Any,
    Easy,
    Medium,
    Hard,
}

impl DifficultyFilter {
    pub fn difficulty(&self) -> Option<Difficulty> {
        match self {
            DifficultyFilter::Any => None,
            DifficultyFilter::Easy => Some(Difficulty::Easy),
            DifficultyFilter::Medium => Some(Difficulty::Medium),
            DifficultyFilter::Hard => Some(Difficulty::Hard),
        }
    }
}

impl From<Difficulty> for DifficultyFilter {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => DifficultyFilter::Easy,
            Difficulty::Medium => DifficultyFilter::Medium,
            Difficulty::Hard => DifficultyFilter::Hard,
        }
    }
}

impl FromStr for DifficultyFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("any") {
            return Ok(DifficultyFilter::Any);
        }
        s.parse::<Difficulty>().map(DifficultyFilter::from)
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.difficulty() {
            Some(difficulty) => difficulty.fmt(f),
            None => f.write_str("any"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValues {
    pub dietary_preference: String,
    pub cooking_time: u32,
    pub difficulty: DifficultyFilter,
    pub cuisine: String,
}

impl Default for FilterValues {
    fn default() -> Self {
        Self {
            dietary_preference: NO_DIETARY_PREFERENCE.to_string(),
            cooking_time: DEFAULT_COOKING_TIME,
            difficulty: DifficultyFilter::Any,
            cuisine: ANY_CUISINE.to_string(),
        }
    }
}

impl FilterValues {
    /// Build the suggest-recipes request. Sentinel values become absent fields;
    /// the cooking-time limit is always sent.
    pub fn to_suggest_input(&self, ingredients: &[String]) -> SuggestRecipesInput {
        SuggestRecipesInput {
            ingredients: ingredients.to_vec(),
            dietary_preferences: unless_sentinel(&self.dietary_preference, NO_DIETARY_PREFERENCE),
            cooking_time: Some(self.cooking_time),
            difficulty: self.difficulty.difficulty(),
            cuisine: unless_sentinel(&self.cuisine, ANY_CUISINE),
        }
    }
}

fn unless_sentinel(value: &str, sentinel: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(sentinel)).then(|| trimmed.to_string())
}

fn is_offered(value: &str, sentinel: &str, options: &[&str]) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case(sentinel) || options.iter().any(|o| o.eq_ignore_ascii_case(value))
}

impl Validate for FilterValues {
    fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&self.cooking_time) {
            return Err(ValidationError::new(
                "cookingTime",
                format!(
                    "must be between {} and {} minutes, got {}",
                    MIN_COOKING_TIME, MAX_COOKING_TIME, self.cooking_time
                ),
            ));
        }
        if self.cooking_time % COOKING_TIME_STEP != 0 {
            return Err(ValidationError::new(
                "cookingTime",
                format!("must be a multiple of {} minutes", COOKING_TIME_STEP),
            ));
        }
        if !is_offered(&self.dietary_preference, NO_DIETARY_PREFERENCE, DIETARY_PREFERENCES) {
            return Err(ValidationError::new(
                "dietaryPreference",
                format!(
                    "expected '{}' or one of {}, got '{}'",
                    NO_DIETARY_PREFERENCE,
                    DIETARY_PREFERENCES.join(", "),
                    self.dietary_preference
                ),
            ));
        }
        if !is_offered(&self.cuisine, ANY_CUISINE, CUISINES) {
            return Err(ValidationError::new(
                "cuisine",
                format!("'{}' is not an offered cuisine", self.cuisine),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pantry() -> Vec<String> {
        vec!["egg".to_string(), "flour".to_string()]
    }

    #[test]
    fn defaults_map_to_absent_fields_except_cooking_time() {
        let input = FilterValues::default().to_suggest_input(&pantry());
        assert_eq!(input.dietary_preferences, None);
        assert_eq!(input.difficulty, None);
        assert_eq!(input.cuisine, None);
        assert_eq!(input.cooking_time, Some(DEFAULT_COOKING_TIME));
    }

    #[test]
    fn chosen_values_are_forwarded() {
        let filters = FilterValues {
            dietary_preference: "vegan".to_string(),
            cooking_time: 45,
            difficulty: DifficultyFilter::Medium,
            cuisine: "thai".to_string(),
        };
        let input = filters.to_suggest_input(&pantry());
        assert_eq!(input.dietary_preferences.as_deref(), Some("vegan"));
        assert_eq!(input.cooking_time, Some(45));
        assert_eq!(input.difficulty, Some(Difficulty::Medium));
        assert_eq!(input.cuisine.as_deref(), Some("thai"));
    }

    #[test]
    fn cooking_time_must_sit_on_the_slider() {
        let mut filters = FilterValues::default();
        filters.cooking_time = 5;
        assert!(filters.validate().is_err());
        filters.cooking_time = 185;
        assert!(filters.validate().is_err());
        filters.cooking_time = 42;
        assert!(filters.validate().is_err());
        filters.cooking_time = 45;
        assert!(filters.validate().is_ok());
    }

    #[test]
    fn only_offered_diets_and_cuisines_pass() {
        let mut filters = FilterValues {
            dietary_preference: "Gluten-Free".to_string(),
            cuisine: "middle eastern".to_string(),
            ..FilterValues::default()
        };
        assert!(filters.validate().is_ok());
        filters.cuisine = "Martian".to_string();
        assert_eq!(filters.validate().unwrap_err().field, "cuisine");
        filters.cuisine = ANY_CUISINE.to_string();
        filters.dietary_preference = "carnivore".to_string();
        assert_eq!(filters.validate().unwrap_err().field, "dietaryPreference");
    }

    #[test]
    fn difficulty_filter_parses_and_serializes_sentinel() {
        assert_eq!("any".parse::<DifficultyFilter>().unwrap(), DifficultyFilter::Any);
        assert_eq!("hard".parse::<DifficultyFilter>().unwrap(), DifficultyFilter::Hard);
        assert!("brutal".parse::<DifficultyFilter>().is_err());
        assert_eq!(
            serde_json::to_value(FilterValues::default()).unwrap(),
            json!({
                "dietaryPreference": "none",
                "cookingTime": 120,
                "difficulty": "any",
                "cuisine": "any"
            })
        );
    }
}
