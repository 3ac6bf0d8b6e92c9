use anyhow::{Context, Result};
use pantry_match::cli::{parse_args, Command};
use pantry_match::config::EngineConfig;
use pantry_match::corpus::{load_ratings_csv, parse_recipe_corpus};
use pantry_match::engine::PantryEngine;
use pantry_match::matching::SubstitutionTable;
use pantry_match::ranker::{RecipeFilter, RecommendRequest};
use pantry_match::ratings::InMemoryRatingStore;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn seed_ratings(engine: &PantryEngine, csv_path: &str) -> Result<()> {
    let rows = load_ratings_csv(Path::new(csv_path))?;
    let total = rows.len();
    let accepted = engine.seed_ratings(rows);
    info!("Seeded {} ratings from {} ({} skipped)", accepted, csv_path, total - accepted);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli_args = parse_args();
    let config = EngineConfig::from_env();

    let substitutions = match &cli_args.substitutions {
        Some(path) => SubstitutionTable::from_json_file(Path::new(path))?,
        None => SubstitutionTable::default(),
    };

    info!("Loading recipe corpus from {}", cli_args.recipes);
    let raw_corpus = fs::read_to_string(&cli_args.recipes)
        .await
        .with_context(|| format!("Failed to read recipe corpus '{}'", cli_args.recipes))?;
    let recipes = parse_recipe_corpus(&raw_corpus)
        .with_context(|| format!("Failed to load recipe corpus '{}'", cli_args.recipes))?;

    let ui_limit = config.ui_suggestion_limit;
    let engine = PantryEngine::new(config, substitutions, Arc::new(InMemoryRatingStore::new()));
    engine.initialize(recipes)?;
    if let Some(csv_path) = &cli_args.ratings {
        seed_ratings(&engine, csv_path)?;
    }

    match cli_args.command {
        Command::Suggest { text } => {
            let mut suggestions = engine.suggest(&text)?;
            suggestions.truncate(ui_limit);
            print_json(&suggestions)
        }
        Command::Resolve { ingredient } => print_json(&engine.find_matches(&ingredient)?),
        Command::Search { ingredients, exact } => print_json(&engine.match_recipes(&ingredients, exact)?),
        Command::Recommend { ingredients, diet, limit } => {
            let request = RecommendRequest {
                available_ingredients: ingredients.into_iter().map(Into::into).collect(),
                dietary_preferences: diet,
                limit,
            };
            print_json(&engine.recommend(&request)?)
        }
        Command::Filter(args) => print_json(&engine.filter_recipes(&RecipeFilter::from(args))?),
        Command::Show { id, servings } => {
            let mut details = engine.recipe_details(id)?;
            if let Some(servings) = servings {
                details.recipe = details.recipe.scaled(servings);
            }
            print_json(&details)
        }
        Command::Ingredients => print_json(&engine.all_ingredients()?),
    }
}
