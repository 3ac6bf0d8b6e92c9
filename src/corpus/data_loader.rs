use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::recipe::Recipe;

// Expected column headers of a ratings seed file
const RECIPE_ID_COL: &str = "recipe_id";
const RATING_COL: &str = "rating";

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Wrapped { recipes: Vec<Recipe> },
    Bare(Vec<Recipe>),
}

/// Parses a corpus given either as `{"recipes": [...]}` or as a bare array,
/// then validates it.
pub fn parse_recipe_corpus(raw: &str) -> Result<Vec<Recipe>> {
    let corpus: CorpusFile = serde_json::from_str(raw).context("Malformed recipe corpus")?;
    let recipes = match corpus {
        CorpusFile::Wrapped { recipes } | CorpusFile::Bare(recipes) => recipes,
    };
    validate_corpus(&recipes)?;
    Ok(recipes)
}

pub fn load_recipe_corpus(path: &Path) -> Result<Vec<Recipe>> {
    if !path.exists() {
        return Err(anyhow::anyhow!("Recipe corpus file not found at: {:?}", path));
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe corpus at {:?}", path))?;
    parse_recipe_corpus(&raw).with_context(|| format!("Failed to load recipe corpus from {:?}", path))
}

/// Structural checks that make a corpus unusable as a whole. An empty corpus
/// is valid.
pub fn validate_corpus(recipes: &[Recipe]) -> EngineResult<()> {
    let mut seen_ids = HashSet::new();
    for recipe in recipes {
        if !seen_ids.insert(recipe.id) {
            return Err(EngineError::CorpusValidation(format!("duplicate recipe id {}", recipe.id)));
        }
        if recipe.name.trim().is_empty() {
            return Err(EngineError::CorpusValidation(format!("recipe {} has no name", recipe.id)));
        }
        if recipe.ingredients.is_empty() {
            return Err(EngineError::CorpusValidation(format!(
                "recipe {} has no ingredients",
                recipe.id
            )));
        }
        if let Some(position) = recipe.ingredients.iter().position(|i| i.name.trim().is_empty()) {
            return Err(EngineError::CorpusValidation(format!(
                "recipe {} ingredient #{} has no name",
                recipe.id,
                position + 1
            )));
        }
        if recipe.cooking_time < 0 {
            return Err(EngineError::CorpusValidation(format!(
                "recipe {} has a negative cooking time",
                recipe.id
            )));
        }
        if recipe.nutrition.has_negative_value() {
            return Err(EngineError::CorpusValidation(format!(
                "recipe {} has negative nutrition values",
                recipe.id
            )));
        }
    }
    Ok(())
}

/// Reads `recipe_id,rating` rows used to seed a rating store.
pub fn load_ratings_csv(csv_path: &Path) -> Result<Vec<(u32, f64)>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Ratings CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open ratings CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(file);

    let headers = rdr.headers()?.clone();
    let id_idx = headers.iter().position(|h| h == RECIPE_ID_COL).ok_or_else(|| anyhow::anyhow!("Column '{}' not found", RECIPE_ID_COL))?;
    let rating_idx = headers.iter().position(|h| h == RATING_COL).ok_or_else(|| anyhow::anyhow!("Column '{}' not found", RATING_COL))?;

    let mut ratings = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;
        let recipe_id = record
            .get(id_idx)
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid recipe id at row {}", row_index))?;
        let rating = record
            .get(rating_idx)
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| anyhow::anyhow!("Invalid rating at row {}", row_index))?;
        ratings.push((recipe_id, rating));
    }
    Ok(ratings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CORPUS: &str = r#"{"recipes": [
        {"id": 1, "name": "Omelette", "ingredients": [{"name": "Eggs", "quantity": 3, "unit": ""}],
         "dietary": ["vegetarian"], "cuisine": "French", "cookingTime": 10, "difficulty": "easy",
         "nutrition": {"calories": 300, "protein": 20, "carbs": 2, "fat": 22}, "tags": ["breakfast"]},
        {"id": 2, "name": "Toast", "ingredients": [{"name": "Bread", "quantity": 2, "unit": "slices"}]}
    ]}"#;

    #[test]
    fn test_parse_wrapped_and_bare_corpus() -> Result<()> {
        let wrapped = parse_recipe_corpus(CORPUS)?;
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[1].cuisine, "");

        let bare = parse_recipe_corpus(r#"[{"id": 9, "name": "Tea", "ingredients": [{"name": "tea"}]}]"#)?;
        assert_eq!(bare[0].id, 9);
        Ok(())
    }

    #[test]
    fn test_empty_corpus_is_valid() -> Result<()> {
        assert!(parse_recipe_corpus(r#"{"recipes": []}"#)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_corpus_is_rejected() {
        let result = parse_recipe_corpus(r#"{"recipes": [{"id": "one"}]}"#);
        assert!(result.unwrap_err().to_string().contains("Malformed recipe corpus"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let raw = r#"[{"id": 1, "name": "A", "ingredients": [{"name": "x"}]},
                      {"id": 1, "name": "B", "ingredients": [{"name": "y"}]}]"#;
        let err = parse_recipe_corpus(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate recipe id 1"));
    }

    #[test]
    fn test_blank_ingredient_name_rejected() {
        let raw = r#"[{"id": 4, "name": "A", "ingredients": [{"name": "salt"}, {"name": "  "}]}]"#;
        let err = parse_recipe_corpus(raw).unwrap_err();
        assert!(err.to_string().contains("ingredient #2 has no name"));
    }

    #[test]
    fn test_negative_values_rejected() {
        let raw = r#"[{"id": 5, "name": "A", "ingredients": [{"name": "salt"}], "cookingTime": -1}]"#;
        assert!(parse_recipe_corpus(raw).is_err());
        let raw = r#"[{"id": 5, "name": "A", "ingredients": [{"name": "salt"}],
                      "nutrition": {"calories": -10, "protein": 0, "carbs": 0, "fat": 0}}]"#;
        assert!(parse_recipe_corpus(raw).is_err());
    }

    #[test]
    fn test_load_recipe_corpus_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", CORPUS)?;
        file.flush()?;
        let recipes = load_recipe_corpus(file.path())?;
        assert_eq!(recipes[0].name, "Omelette");
        Ok(())
    }

    #[test]
    fn test_load_recipe_corpus_file_not_found() {
        let result = load_recipe_corpus(Path::new("this_corpus_does_not_exist.json"));
        assert!(result.unwrap_err().to_string().contains("Recipe corpus file not found"));
    }

    #[test]
    fn test_load_ratings_csv() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{},{}", RECIPE_ID_COL, RATING_COL)?;
        writeln!(file, "1, 4")?;
        writeln!(file, "2,3.5")?;
        file.flush()?;

        let ratings = load_ratings_csv(file.path())?;
        assert_eq!(ratings, vec![(1, 4.0), (2, 3.5)]);
        Ok(())
    }

    #[test]
    fn test_load_ratings_csv_missing_column() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{},stars", RECIPE_ID_COL)?;
        writeln!(file, "1,4")?;
        file.flush()?;

        let result = load_ratings_csv(file.path());
        assert!(result.unwrap_err().to_string().contains(&format!("Column '{}' not found", RATING_COL)));
        Ok(())
    }

    #[test]
    fn test_load_ratings_csv_bad_value() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "{},{}", RECIPE_ID_COL, RATING_COL)?;
        writeln!(file, "1,great")?;
        file.flush()?;

        let result = load_ratings_csv(file.path());
        assert!(result.unwrap_err().to_string().contains("Invalid rating at row 0"));
        Ok(())
    }
}
