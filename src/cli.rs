use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::filters::{DifficultyFilter, FilterValues, ANY_CUISINE, DEFAULT_COOKING_TIME, NO_DIETARY_PREFERENCE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe ideas from what is in your kitchen", long_about = None)]
pub struct Cli {
    /// Text model to use, overrides AI_CHEF_MODEL
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Directory holding saved favorites, overrides AI_CHEF_DATA_DIR
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Per-call timeout in milliseconds, 0 disables it
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the ingredients visible in a photo
    Recognize {
        #[arg(short, long)]
        photo: PathBuf,
    },
    /// Suggest recipes from a list of ingredients
    Suggest(SuggestArgs),
    /// Suggest new recipes based on rated favorites
    Personalized,
    /// Show a saved recipe with missing ingredients and substitutes
    Open {
        /// Name of a saved favorite
        #[arg(short, long)]
        name: String,
        /// Ingredients on hand, comma separated
        #[arg(long, value_delimiter = ',')]
        have: Vec<String>,
        /// Show quantities for this many servings
        #[arg(short, long)]
        servings: Option<u32>,
    },
    /// Manage saved recipes
    #[command(subcommand)]
    Favorites(FavoritesCommand),
}

#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Ingredients on hand, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub ingredients: Vec<String>,

    #[arg(long, default_value = NO_DIETARY_PREFERENCE)]
    pub diet: String,

    #[arg(long, default_value = ANY_CUISINE)]
    pub cuisine: String,

    /// easy, medium, hard or any
    #[arg(long, default_value = "any")]
    pub difficulty: DifficultyFilter,

    /// Maximum cooking time in minutes (10 to 180, steps of 5)
    #[arg(long, default_value_t = DEFAULT_COOKING_TIME)]
    pub max_time: u32,

    /// Also write the suggested recipes as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl SuggestArgs {
    pub fn filters(&self) -> FilterValues {
        FilterValues {
            dietary_preference: self.diet.clone(),
            cooking_time: self.max_time,
            difficulty: self.difficulty,
            cuisine: self.cuisine.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    List,
    /// Save recipes from a JSON file holding one recipe or a list of them
    Add {
        #[arg(long)]
        from: PathBuf,
    },
    Remove {
        #[arg(short, long)]
        name: String,
    },
    /// Rate a saved recipe from 1 to 5 stars
    Rate {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        stars: u8,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_splits_ingredients_and_defaults_filters() {
        let cli = Cli::try_parse_from(["ai_chef", "suggest", "--ingredients", "egg,flour"]).unwrap();
        let Command::Suggest(args) = cli.command else {
            panic!("expected suggest");
        };
        assert_eq!(args.ingredients, vec!["egg", "flour"]);
        assert_eq!(args.filters(), FilterValues::default());
    }

    #[test]
    fn suggest_parses_filter_flags() {
        let cli = Cli::try_parse_from([
            "ai_chef", "suggest", "-i", "rice", "--difficulty", "hard", "--max-time", "30",
            "--cuisine", "Thai",
        ])
        .unwrap();
        let Command::Suggest(args) = cli.command else {
            panic!("expected suggest");
        };
        let filters = args.filters();
        assert_eq!(filters.difficulty, DifficultyFilter::Hard);
        assert_eq!(filters.cooking_time, 30);
        assert_eq!(filters.cuisine, "Thai");
    }

    #[test]
    fn favorites_rate_and_global_flags() {
        let cli = Cli::try_parse_from([
            "ai_chef", "favorites", "rate", "--name", "Soup", "--stars", "4", "--data-dir", "/tmp/chef",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/chef")));
        assert!(matches!(
            cli.command,
            Command::Favorites(FavoritesCommand::Rate { ref name, stars: 4 }) if name == "Soup"
        ));
    }

    #[test]
    fn unknown_difficulty_is_rejected() {
        assert!(Cli::try_parse_from(["ai_chef", "suggest", "-i", "egg", "--difficulty", "brutal"]).is_err());
    }
}
