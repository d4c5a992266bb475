use std::sync::Arc;

use super::storage::StoragePort;
use crate::error::{FavoritesError, StorageError};
use crate::schema::{RatedRecipe, Recipe};

/// Fixed storage key of the serialized favorites collection.
pub const FAVORITES_KEY: &str = "ai-chef-favorites";

/// Rating given to a recipe when it is first saved.
pub const UNRATED: f64 = 0.0;

/// Result of a favorites mutation.
///
/// A failed save does not undo the change: the in-memory collection stays
/// authoritative and the error is handed back for a non-fatal notice.
#[derive(Debug)]
pub struct Mutation {
    pub changed: bool,
    pub save_error: Option<StorageError>,
}

impl Mutation {
    fn unchanged() -> Self {
        Self {
            changed: false,
            save_error: None,
        }
    }

    pub fn is_durable(&self) -> bool {
        self.save_error.is_none()
    }
}

/// The user's saved recipes, unique by name, in the order they were added.
#[derive(Debug)]
pub struct FavoritesStore {
    storage: Arc<dyn StoragePort>,
    favorites: Vec<Recipe>,
}

impl FavoritesStore {
    /// Load the persisted collection. Missing, unreadable or corrupt data
    /// yields an empty collection.
    pub fn load(storage: Arc<dyn StoragePort>) -> Self {
        let favorites = match storage.get(FAVORITES_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<Recipe>>(&blob) {
                Ok(recipes) => dedupe_by_name(sanitize_stored(recipes)),
                Err(e) => {
                    tracing::warn!(error = %e, "Could not parse stored favorites, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read favorites from storage, starting empty");
                Vec::new()
            }
        };
        tracing::debug!(count = favorites.len(), "Loaded favorites");
        Self { storage, favorites }
    }

    pub fn favorites(&self) -> &[Recipe] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn is_favorite(&self, name: &str) -> bool {
        self.favorites.iter().any(|fav| fav.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.favorites.iter().find(|fav| fav.name == name)
    }

    /// Favorites with a 1..=5 rating, projected for personalized suggestions.
    pub fn rated_recipes(&self) -> Vec<RatedRecipe> {
        self.favorites
            .iter()
            .filter_map(|fav| RatedRecipe::try_from(fav).ok())
            .collect()
    }

    /// Save `recipe` as unrated. Adding a name that is already saved is a
    /// no-op; a recipe that breaks the recipe invariants is refused.
    pub fn add(&mut self, recipe: &Recipe) -> Result<Mutation, FavoritesError> {
        let favorite = Recipe {
            rating: Some(UNRATED),
            ..recipe.clone()
        };
        favorite
            .validate_stored()
            .map_err(FavoritesError::InvalidRecipe)?;
        if self.is_favorite(&favorite.name) {
            tracing::debug!(recipe = %favorite.name, "Recipe already in favorites");
            return Ok(Mutation::unchanged());
        }
        self.favorites.push(favorite);
        Ok(self.persist())
    }

    pub fn remove(&mut self, name: &str) -> Mutation {
        let before = self.favorites.len();
        self.favorites.retain(|fav| fav.name != name);
        if self.favorites.len() == before {
            return Mutation::unchanged();
        }
        self.persist()
    }

    /// Rate a saved recipe from 1 to 5 stars. Out-of-range ratings are
    /// rejected before anything changes; unknown names are a no-op.
    pub fn rate(&mut self, name: &str, stars: u8) -> Result<Mutation, FavoritesError> {
        if !(1..=5).contains(&stars) {
            return Err(FavoritesError::InvalidRating(stars));
        }
        let Some(favorite) = self.favorites.iter_mut().find(|fav| fav.name == name) else {
            return Ok(Mutation::unchanged());
        };
        favorite.rating = Some(f64::from(stars));
        Ok(self.persist())
    }

    fn persist(&self) -> Mutation {
        let save_error = serde_json::to_string(&self.favorites)
            .map_err(|e| StorageError::Unavailable(format!("could not serialize favorites: {}", e)))
            .and_then(|blob| self.storage.set(FAVORITES_KEY, &blob))
            .err();
        if let Some(e) = &save_error {
            tracing::warn!(error = %e, "Could not save favorites");
        }
        Mutation {
            changed: true,
            save_error,
        }
    }
}

/// Out-of-range ratings fall back to unrated; entries that still fail
/// validation are dropped.
fn sanitize_stored(recipes: Vec<Recipe>) -> Vec<Recipe> {
    recipes
        .into_iter()
        .filter_map(|mut recipe| {
            if let Some(rating) = recipe.rating {
                if rating != UNRATED && !recipe.is_rated() {
                    tracing::warn!(recipe = %recipe.name, rating, "Resetting out-of-range stored rating");
                    recipe.rating = Some(UNRATED);
                }
            }
            match recipe.validate_stored() {
                Ok(()) => Some(recipe),
                Err(e) => {
                    tracing::warn!(recipe = %recipe.name, error = %e, "Dropping invalid stored favorite");
                    None
                }
            }
        })
        .collect()
}

/// Collections written by older builds could hold the same name twice; keep the first.
fn dedupe_by_name(recipes: Vec<Recipe>) -> Vec<Recipe> {
    let mut seen = std::collections::HashSet::new();
    recipes
        .into_iter()
        .filter(|recipe| seen.insert(recipe.name.clone()))
        .collect()
}
