use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ai_chef::cli::{parse_args, Command, FavoritesCommand, SuggestArgs};
use ai_chef::config::{timeout_from_millis, ChefConfig};
use ai_chef::error::SessionError;
use ai_chef::favorites::{FavoritesStore, FileStorage};
use ai_chef::flows::FlowClient;
use ai_chef::llm::create_backend;
use ai_chef::pantry::photo_data_uri_from_path;
use ai_chef::schema::Recipe;
use ai_chef::serving::format_quantity;
use ai_chef::session::{ChefSession, Notice, PersonalizedRefresh, RecipeView};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = ChefConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ai_chef=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = timeout_from_millis(ms);
    }

    let storage = Arc::new(FileStorage::new(config.data_dir.clone()));
    let favorites = FavoritesStore::load(storage);

    let flows = match &cli.command {
        // Managing favorites never talks to the model, so no API key is needed.
        Command::Favorites(_) => offline_flows(&config),
        _ => {
            let backend =
                create_backend(&config).context("Failed to configure the generative backend")?;
            tracing::info!(backend = backend.backend_name(), model = %config.model, "Backend ready");
            FlowClient::new(Arc::from(backend)).with_timeout(config.timeout)
        }
    };
    let mut session = ChefSession::new(flows, favorites);

    match cli.command {
        Command::Recognize { photo } => {
            let uri = photo_data_uri_from_path(&photo)
                .await
                .with_context(|| format!("Failed to load photo '{}'", photo.display()))?;
            let items = session.recognize_photo(uri).await.map_err(report)?;
            if items.is_empty() {
                println!("No ingredients recognized.");
            }
            for item in items {
                println!("- {}", item);
            }
        }
        Command::Suggest(args) => run_suggest(&mut session, &args).await?,
        Command::Personalized => match session.refresh_personalized().await.map_err(report)? {
            PersonalizedRefresh::Applied(suggestions) => {
                for recipe in &suggestions {
                    print_summary(recipe);
                }
            }
            PersonalizedRefresh::Cleared => {
                println!("No recommendations yet. Rate some favorites to get suggestions.");
            }
            PersonalizedRefresh::Superseded => {}
        },
        Command::Open {
            name,
            have,
            servings,
        } => {
            let Some(recipe) = session.favorites().get(&name).cloned() else {
                bail!("'{}' is not in your favorites", name);
            };
            session.pantry_mut().replace_all(&have);
            if let Some(mut view) = session.open_recipe(&recipe).await {
                if let Some(servings) = servings {
                    view.scale.set_servings(servings);
                }
                print_view(&view);
            }
        }
        Command::Favorites(command) => run_favorites(&mut session, command).await?,
    }

    Ok(())
}

/// A flow client for commands that never reach the backend.
fn offline_flows(config: &ChefConfig) -> FlowClient {
    #[derive(Debug)]
    struct Offline;

    #[async_trait::async_trait]
    impl ai_chef::llm::GenerativeBackend for Offline {
        async fn generate(
            &self,
            _request: &ai_chef::llm::GenerationRequest,
        ) -> Result<String, ai_chef::error::BackendError> {
            Err(ai_chef::error::BackendError::NotConfigured(
                "favorites commands run offline".to_string(),
            ))
        }

        fn backend_name(&self) -> &'static str {
            "offline"
        }
    }

    FlowClient::new(Arc::new(Offline)).with_timeout(config.timeout)
}

async fn run_suggest(session: &mut ChefSession, args: &SuggestArgs) -> Result<()> {
    for item in &args.ingredients {
        session.pantry_mut().add(item);
    }
    let search = session.find_recipes(&args.filters()).await.map_err(report)?;

    if let Some(notice) = search.notice() {
        print_notice(&notice);
        return Ok(());
    }
    println!("{}\n", search.reason);
    for recipe in &search.recipes {
        print_summary(recipe);
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&search.recipes)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write recipes to '{}'", path.display()))?;
        println!("Saved {} recipes to {}", search.recipes.len(), path.display());
    }
    Ok(())
}

async fn run_favorites(session: &mut ChefSession, command: FavoritesCommand) -> Result<()> {
    match command {
        FavoritesCommand::List => {
            if session.favorites().is_empty() {
                println!("No favorites yet.");
            }
            for recipe in session.favorites().favorites() {
                let stars = match recipe.rating {
                    Some(r) if recipe.is_rated() => format!("{}/5", r),
                    _ => "unrated".to_string(),
                };
                println!("- {} ({})", recipe.name, stars);
            }
        }
        FavoritesCommand::Add { from } => {
            for recipe in read_recipes(&from).await? {
                if session.favorites().is_favorite(&recipe.name) {
                    println!("\"{}\" is already saved.", recipe.name);
                    continue;
                }
                match session.toggle_favorite(&recipe) {
                    Ok(notice) => print_notice(&notice),
                    Err(e) => print_notice(&Notice::for_error(&e)),
                }
            }
        }
        FavoritesCommand::Remove { name } => print_notice(&session.remove_favorite(&name)),
        FavoritesCommand::Rate { name, stars } => {
            let notice = session.rate(&name, stars).map_err(report)?;
            print_notice(&notice);
        }
    }
    Ok(())
}

async fn read_recipes(path: &Path) -> Result<Vec<Recipe>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read recipes from '{}'", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))?;
    let recipes = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(recipes)
}

fn report(err: SessionError) -> anyhow::Error {
    print_notice(&Notice::for_error(&err));
    anyhow::Error::new(err)
}

fn print_notice(notice: &Notice) {
    println!("{}: {}", notice.title, notice.description);
}

fn print_summary(recipe: &Recipe) {
    println!(
        "{} ({} min, {}, serves {})",
        recipe.name, recipe.cooking_time, recipe.difficulty, recipe.servings
    );
}

fn print_view(view: &RecipeView) {
    let recipe = &view.recipe;
    let marker = if view.is_favorite { " [favorite]" } else { "" };
    println!("{}{}", recipe.name, marker);
    println!(
        "{} min, {}, {} of {} servings\n",
        recipe.cooking_time,
        recipe.difficulty,
        view.scale.servings(),
        view.scale.base_servings()
    );

    for ingredient in &recipe.ingredients {
        let line = format!(
            "{} {} {}",
            format_quantity(view.scale.scaled(ingredient)),
            ingredient.unit,
            ingredient.name
        );
        if view.is_missing(&ingredient.name) {
            let substitutes = view.substitutes_for(&ingredient.name);
            if substitutes.is_empty() {
                println!("  ! {} (missing)", line);
            } else {
                println!("  ! {} (missing, try: {})", line, substitutes.join(", "));
            }
        } else {
            println!("  - {}", line);
        }
    }
    if let Err(e) = &view.substitutions {
        tracing::warn!(error = %e, "Substitutions unavailable");
    }
    if let Some(info) = &recipe.nutritional_info {
        println!("\nNutrition: {}", info);
    }
    println!("\n{}", recipe.instructions);
}
