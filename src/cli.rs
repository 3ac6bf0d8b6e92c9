use clap::{Parser, Subcommand};

use crate::ranker::RecipeFilter;
use crate::recipe::Difficulty;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the recipe corpus JSON file
    #[arg(short, long, env = "PANTRY_RECIPES", default_value = "recipes.json")]
    pub recipes: String,

    /// Optional JSON file replacing the built-in substitution table
    #[arg(short, long)]
    pub substitutions: Option<String>,

    /// Optional CSV file (recipe_id,rating) used to seed ratings
    #[arg(long)]
    pub ratings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Autocomplete an ingredient name
    Suggest { text: String },
    /// Resolve one ingredient against the vocabulary and substitution table
    Resolve { ingredient: String },
    /// Find recipes that can be made from the given ingredients
    Search {
        #[arg(required = true)]
        ingredients: Vec<String>,
        /// Only recipes fully covered by the ingredients
        #[arg(long)]
        exact: bool,
    },
    /// Rank recipes by ingredient coverage and rating
    Recommend {
        #[arg(short, long, value_delimiter = ',')]
        ingredients: Vec<String>,
        #[arg(short, long, value_delimiter = ',')]
        diet: Vec<String>,
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Filter recipes by their attributes
    Filter(FilterArgs),
    /// Show one recipe with its rating aggregate
    Show {
        id: u32,
        /// Scale quantities and nutrition to this many servings
        #[arg(long)]
        servings: Option<u32>,
    },
    /// List every known ingredient
    Ingredients,
}

#[derive(clap::Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long, value_delimiter = ',')]
    pub diet: Vec<String>,
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
    #[arg(long)]
    pub max_time: Option<i64>,
    #[arg(long)]
    pub min_calories: Option<f64>,
    #[arg(long)]
    pub max_calories: Option<f64>,
    #[arg(long)]
    pub cuisine: Option<String>,
    #[arg(long, value_delimiter = ',')]
    pub tag: Vec<String>,
}

impl From<FilterArgs> for RecipeFilter {
    fn from(args: FilterArgs) -> Self {
        RecipeFilter {
            dietary: args.diet,
            difficulty: args.difficulty,
            max_cooking_time: args.max_time,
            min_calories: args.min_calories,
            max_calories: args.max_calories,
            cuisine: args.cuisine,
            tags: args.tag,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_command() {
        let cli = Cli::try_parse_from(["pantry", "-r", "db.json", "search", "milk", "eggs", "--exact"]).unwrap();
        assert_eq!(cli.recipes, "db.json");
        match cli.command {
            Command::Search { ingredients, exact } => {
                assert_eq!(ingredients, vec!["milk", "eggs"]);
                assert!(exact);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_filter_args_convert() {
        let cli = Cli::try_parse_from([
            "pantry", "filter", "--diet", "vegan,keto", "--difficulty", "Hard", "--max-time", "45",
        ])
        .unwrap();
        let Command::Filter(args) = cli.command else {
            panic!("expected filter command");
        };
        let filter = RecipeFilter::from(args);
        assert_eq!(filter.dietary, vec!["vegan", "keto"]);
        assert_eq!(filter.difficulty, Some(Difficulty::Hard));
        assert_eq!(filter.max_cooking_time, Some(45));
        assert!(filter.cuisine.is_none());
    }

    #[test]
    fn test_search_requires_ingredients() {
        assert!(Cli::try_parse_from(["pantry", "search"]).is_err());
    }
}
