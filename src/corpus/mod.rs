pub mod data_loader;

pub use data_loader::{load_ratings_csv, load_recipe_corpus, parse_recipe_corpus, validate_corpus};
