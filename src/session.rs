//! One user's working state: pantry, search results, favorites and
//! personalized suggestions, with the flows that feed them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::error::{FavoritesError, FlowError, SessionError};
use crate::favorites::{FavoritesStore, Mutation};
use crate::filters::FilterValues;
use crate::flows::{
    FlowClient, PromptContract, RecognizeIngredients, SuggestPersonalizedRecipes, SuggestRecipes,
};
use crate::pantry::Pantry;
use crate::reconciler::{ReconcileOutcome, Reconciler};
use crate::schema::{
    PhotoDataUri, Recipe, RecognizeIngredientsInput, SubstitutionMap,
    SuggestPersonalizedRecipesInput, Validate,
};
use crate::serving::ServingScale;

/// A short user-facing message describing the result of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }

    /// The message shown when `err` ends an action.
    pub fn for_error(err: &SessionError) -> Self {
        match err {
            SessionError::EmptyPantry => Notice::new("No Ingredients", "Please add some ingredients first."),
            SessionError::InvalidFilters(e) => Notice::new("Invalid Filters", e.to_string()),
            SessionError::Favorites(e @ FavoritesError::InvalidRating(_)) => {
                Notice::new("Rating Not Saved", e.to_string())
            }
            SessionError::Favorites(e @ FavoritesError::InvalidRecipe(_)) => {
                Notice::new("Recipe Not Saved", e.to_string())
            }
            SessionError::Flow(e) => Notice::new("Error", flow_failure_message(e)),
        }
    }
}

fn flow_failure_message(err: &FlowError) -> &'static str {
    let flow = err.flow();
    if flow == RecognizeIngredients::FLOW {
        "Failed to recognize ingredients. Please try again or enter them manually."
    } else if flow == SuggestRecipes::FLOW {
        "Failed to generate recipes. Please try again."
    } else if flow == SuggestPersonalizedRecipes::FLOW {
        "Could not get personalized suggestions at this time."
    } else {
        "Something went wrong. Please try again."
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSearch {
    pub recipes: Vec<Recipe>,
    pub reason: String,
}

impl RecipeSearch {
    /// Present only when the search came back empty.
    pub fn notice(&self) -> Option<Notice> {
        self.recipes.is_empty().then(|| {
            Notice::new(
                "No Recipes Found",
                "Try adding more ingredients or adjusting your filters for better suggestions.",
            )
        })
    }
}

#[derive(Debug)]
pub enum PersonalizedRefresh {
    Applied(Vec<Recipe>),
    /// Nothing rated yet; suggestions were cleared without asking the backend.
    Cleared,
    /// A newer refresh was started while this one was in flight.
    Superseded,
}

/// Everything the recipe detail view needs.
#[derive(Debug)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub missing: Vec<String>,
    pub substitutions: Result<SubstitutionMap, FlowError>,
    pub is_favorite: bool,
    pub scale: ServingScale,
}

impl RecipeView {
    pub fn is_missing(&self, ingredient_name: &str) -> bool {
        self.missing.iter().any(|m| m == ingredient_name)
    }

    pub fn substitutes_for(&self, ingredient_name: &str) -> &[String] {
        self.substitutions
            .as_ref()
            .ok()
            .and_then(|map| map.get(ingredient_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug)]
pub struct ChefSession {
    flows: FlowClient,
    reconciler: Reconciler,
    pantry: Pantry,
    favorites: FavoritesStore,
    recipes: Vec<Recipe>,
    personalized: Mutex<Vec<Recipe>>,
    personalized_token: AtomicU64,
}

impl ChefSession {
    pub fn new(flows: FlowClient, favorites: FavoritesStore) -> Self {
        Self {
            reconciler: Reconciler::new(flows.clone()),
            flows,
            pantry: Pantry::new(),
            favorites,
            recipes: Vec::new(),
            personalized: Mutex::new(Vec::new()),
            personalized_token: AtomicU64::new(0),
        }
    }

    pub fn pantry(&self) -> &Pantry {
        &self.pantry
    }

    pub fn pantry_mut(&mut self) -> &mut Pantry {
        &mut self.pantry
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    /// Results of the last successful search.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn personalized(&self) -> Vec<Recipe> {
        self.personalized
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the pantry with what the model sees in the photo.
    pub async fn recognize_photo(&mut self, photo: PhotoDataUri) -> Result<&[String], SessionError> {
        let output = self
            .flows
            .recognize_ingredients(&RecognizeIngredientsInput {
                photo_data_uri: photo,
            })
            .await?;
        tracing::info!(count = output.ingredients.len(), "Recognized ingredients from photo");
        self.pantry.replace_all(&output.ingredients);
        Ok(self.pantry.items())
    }

    /// Ask for recipes made from the pantry. Previous results are cleared
    /// before the call, so a failure leaves no results behind.
    pub async fn find_recipes(&mut self, filters: &FilterValues) -> Result<RecipeSearch, SessionError> {
        if self.pantry.is_empty() {
            return Err(SessionError::EmptyPantry);
        }
        filters.validate().map_err(SessionError::InvalidFilters)?;

        self.recipes.clear();
        let input = filters.to_suggest_input(self.pantry.items());
        let output = self.flows.suggest_recipes(&input).await?;
        tracing::info!(count = output.recipes.len(), "Received recipe suggestions");

        self.recipes = output.recipes.clone();
        Ok(RecipeSearch {
            recipes: output.recipes,
            reason: output.reason,
        })
    }

    /// Recompute suggestions from rated favorites. Only the most recently
    /// started refresh is applied.
    pub async fn refresh_personalized(&self) -> Result<PersonalizedRefresh, SessionError> {
        let token = self.personalized_token.fetch_add(1, Ordering::SeqCst) + 1;
        let favorite_recipes = self.favorites.rated_recipes();

        if favorite_recipes.is_empty() {
            self.personalized
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
            return Ok(PersonalizedRefresh::Cleared);
        }

        let result = self
            .flows
            .suggest_personalized_recipes(&SuggestPersonalizedRecipesInput { favorite_recipes })
            .await;

        if self.personalized_token.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "Discarding stale personalized suggestions");
            return Ok(PersonalizedRefresh::Superseded);
        }

        let suggestions = result?.suggestions;
        *self
            .personalized
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = suggestions.clone();
        Ok(PersonalizedRefresh::Applied(suggestions))
    }

    /// Build the detail view for `recipe` against the current pantry.
    /// Returns `None` when a newer view was opened meanwhile.
    pub async fn open_recipe(&self, recipe: &Recipe) -> Option<RecipeView> {
        match self.reconciler.reconcile(recipe, self.pantry.items()).await {
            ReconcileOutcome::Current(reconciliation) => Some(RecipeView {
                recipe: recipe.clone(),
                missing: reconciliation.missing,
                substitutions: reconciliation.substitutions,
                is_favorite: self.favorites.is_favorite(&recipe.name),
                scale: ServingScale::new(recipe),
            }),
            ReconcileOutcome::Superseded => None,
        }
    }

    /// Save `recipe`, or remove it when a recipe of that name is already saved.
    pub fn toggle_favorite(&mut self, recipe: &Recipe) -> Result<Notice, SessionError> {
        if self.favorites.is_favorite(&recipe.name) {
            let mutation = self.favorites.remove(&recipe.name);
            Ok(with_save_warning(
                Notice::new(
                    "Removed from favorites",
                    format!("\"{}\" has been removed.", recipe.name),
                ),
                &mutation,
            ))
        } else {
            let mutation = self.favorites.add(recipe)?;
            Ok(with_save_warning(
                Notice::new(
                    "Added to favorites!",
                    format!("\"{}\" has been saved.", recipe.name),
                ),
                &mutation,
            ))
        }
    }

    pub fn remove_favorite(&mut self, name: &str) -> Notice {
        let mutation = self.favorites.remove(name);
        if !mutation.changed {
            return not_a_favorite(name);
        }
        with_save_warning(
            Notice::new("Removed from favorites", format!("\"{}\" has been removed.", name)),
            &mutation,
        )
    }

    pub fn rate(&mut self, name: &str, stars: u8) -> Result<Notice, SessionError> {
        let mutation = self.favorites.rate(name, stars)?;
        if !mutation.changed {
            return Ok(not_a_favorite(name));
        }
        Ok(with_save_warning(
            Notice::new("Rating Saved", format!("You rated \"{}\" {} stars.", name, stars)),
            &mutation,
        ))
    }
}

fn not_a_favorite(name: &str) -> Notice {
    Notice::new("Not in favorites", format!("\"{}\" is not saved.", name))
}

fn with_save_warning(mut notice: Notice, mutation: &Mutation) -> Notice {
    if let Some(e) = &mutation.save_error {
        notice.description = format!("{} It could not be stored permanently: {}", notice.description, e);
    }
    notice
}
