//! Works out which recipe ingredients the user does not have and asks for
//! substitutes for them.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::FlowError;
use crate::flows::FlowClient;
use crate::schema::{Ingredient, Recipe, SubstitutionMap, SuggestSubstitutionsInput};

/// Recipe ingredients not covered by anything in `available`, in recipe order.
///
/// An ingredient is covered when any available name, lower-cased, is a
/// substring of the lower-cased ingredient name: "chicken" covers
/// "Chicken Breast", but "chicken breast" does not cover "Chicken".
pub fn find_missing_ingredients<'a>(
    ingredients: &'a [Ingredient],
    available: &[String],
) -> Vec<&'a Ingredient> {
    let available: Vec<String> = available.iter().map(|a| a.to_lowercase()).collect();
    ingredients
        .iter()
        .filter(|ingredient| {
            let name = ingredient.name.to_lowercase();
            !available.iter().any(|have| name.contains(have.as_str()))
        })
        .collect()
}

pub fn missing_ingredient_names(recipe: &Recipe, available: &[String]) -> Vec<String> {
    find_missing_ingredients(&recipe.ingredients, available)
        .into_iter()
        .map(|ingredient| ingredient.name.clone())
        .collect()
}

#[derive(Debug)]
pub struct Reconciliation {
    pub recipe_name: String,
    pub missing: Vec<String>,
    /// Empty without a backend call when nothing is missing.
    pub substitutions: Result<SubstitutionMap, FlowError>,
}

impl Reconciliation {
    pub fn is_missing(&self, ingredient_name: &str) -> bool {
        self.missing.iter().any(|m| m == ingredient_name)
    }
}

#[derive(Debug)]
pub enum ReconcileOutcome {
    Current(Reconciliation),
    /// A newer reconciliation was started while this one was in flight.
    Superseded,
}

/// Runs reconciliations, discarding results overtaken by a newer request.
#[derive(Debug)]
pub struct Reconciler {
    flows: FlowClient,
    latest: AtomicU64,
}

impl Reconciler {
    pub fn new(flows: FlowClient) -> Self {
        Self {
            flows,
            latest: AtomicU64::new(0),
        }
    }

    pub async fn reconcile(&self, recipe: &Recipe, available: &[String]) -> ReconcileOutcome {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let missing = missing_ingredient_names(recipe, available);

        let substitutions = if missing.is_empty() {
            Ok(SubstitutionMap::new())
        } else {
            tracing::debug!(
                recipe = %recipe.name,
                missing = missing.len(),
                "Requesting substitutions"
            );
            let input = SuggestSubstitutionsInput {
                missing_ingredients: missing.clone(),
                available_ingredients: available.to_vec(),
                recipe_name: recipe.name.clone(),
            };
            self.flows
                .suggest_substitutions(&input)
                .await
                .map(|output| output.substitutions)
        };

        if self.latest.load(Ordering::SeqCst) != token {
            tracing::debug!(recipe = %recipe.name, token, "Discarding stale substitutions");
            return ReconcileOutcome::Superseded;
        }

        ReconcileOutcome::Current(Reconciliation {
            recipe_name: recipe.name.clone(),
            missing,
            substitutions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FakeBackend;
    use crate::prompts::substitutions::SUGGEST_SUBSTITUTIONS_PROMPT_NAME;
    use crate::schema::sample_recipe;
    use std::sync::Arc;
    use std::time::Duration;

    fn recipe_with(names: &[&str]) -> Recipe {
        Recipe {
            ingredients: names
                .iter()
                .map(|name| Ingredient {
                    name: name.to_string(),
                    quantity: 1.0,
                    unit: "piece".to_string(),
                })
                .collect(),
            ..sample_recipe("Roast Chicken")
        }
    }

    fn have(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let recipe = recipe_with(&["Chicken Breast", "Onion", "Garlic"]);
        let missing = missing_ingredient_names(&recipe, &have(&["chicken", "garlic"]));
        assert_eq!(missing, vec!["Onion"]);
    }

    #[test]
    fn match_is_not_reversed_or_tokenized() {
        let recipe = recipe_with(&["Chicken", "Green Onion"]);
        let missing = missing_ingredient_names(&recipe, &have(&["Chicken Breast", "onion green"]));
        assert_eq!(missing, vec!["Chicken", "Green Onion"]);
    }

    #[test]
    fn missing_preserves_recipe_order() {
        let recipe = recipe_with(&["Salt", "Butter", "Flour", "Eggs"]);
        let missing = missing_ingredient_names(&recipe, &have(&["flour"]));
        assert_eq!(missing, vec!["Salt", "Butter", "Eggs"]);
    }

    #[test]
    fn nothing_available_means_everything_missing() {
        let recipe = recipe_with(&["Rice", "Water"]);
        assert_eq!(missing_ingredient_names(&recipe, &[]), vec!["Rice", "Water"]);
    }

    #[tokio::test]
    async fn nothing_missing_skips_the_backend() {
        let backend = Arc::new(FakeBackend::new().with_default_response(r#"{"substitutions": {}}"#));
        let reconciler = Reconciler::new(FlowClient::new(backend.clone()));
        let recipe = recipe_with(&["Chicken Breast", "Garlic"]);

        let outcome = reconciler.reconcile(&recipe, &have(&["chicken", "garlic"])).await;
        let ReconcileOutcome::Current(result) = outcome else {
            panic!("expected a current result");
        };
        assert!(result.missing.is_empty());
        assert!(result.substitutions.unwrap().is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_ingredients_are_sent_for_substitution() {
        let backend = Arc::new(FakeBackend::with_response(
            SUGGEST_SUBSTITUTIONS_PROMPT_NAME,
            r#"{"substitutions": {"Onion": ["shallot"]}}"#,
        ));
        let reconciler = Reconciler::new(FlowClient::new(backend.clone()));
        let recipe = recipe_with(&["Chicken Breast", "Onion", "Garlic"]);
        let available = have(&["chicken", "garlic", "shallot"]);

        let ReconcileOutcome::Current(result) = reconciler.reconcile(&recipe, &available).await else {
            panic!("expected a current result");
        };
        assert!(result.is_missing("Onion"));
        assert_eq!(result.substitutions.unwrap()["Onion"], vec!["shallot".to_string()]);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.contains("Missing Ingredients: Onion\n"));
        assert!(calls[0].prompt.contains("Available Ingredients: chicken, garlic, shallot\n"));
        assert!(calls[0].prompt.contains("Recipe Name: Roast Chicken\n"));
    }

    #[tokio::test]
    async fn substitution_failure_still_reports_missing() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_failure(SUGGEST_SUBSTITUTIONS_PROMPT_NAME, "upstream down");
        let reconciler = Reconciler::new(FlowClient::new(backend));
        let recipe = recipe_with(&["Onion"]);

        let ReconcileOutcome::Current(result) = reconciler.reconcile(&recipe, &[]).await else {
            panic!("expected a current result");
        };
        assert_eq!(result.missing, vec!["Onion"]);
        assert!(matches!(result.substitutions, Err(FlowError::BackendInvocation { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn slower_older_request_is_superseded() {
        let backend = Arc::new(FakeBackend::new());
        backend.push_delayed_response(
            SUGGEST_SUBSTITUTIONS_PROMPT_NAME,
            r#"{"substitutions": {"Onion": ["leek"]}}"#,
            Duration::from_millis(200),
        );
        backend.push_response(
            SUGGEST_SUBSTITUTIONS_PROMPT_NAME,
            r#"{"substitutions": {"Onion": ["shallot"]}}"#,
        );
        let reconciler = Reconciler::new(FlowClient::new(backend));
        let recipe = recipe_with(&["Onion"]);
        let before = have(&["leek"]);
        let after = have(&["leek", "shallot"]);

        let (first, second) = tokio::join!(
            reconciler.reconcile(&recipe, &before),
            reconciler.reconcile(&recipe, &after)
        );

        assert!(matches!(first, ReconcileOutcome::Superseded));
        let ReconcileOutcome::Current(result) = second else {
            panic!("latest request should win");
        };
        assert_eq!(result.substitutions.unwrap()["Onion"], vec!["shallot".to_string()]);
    }
}
