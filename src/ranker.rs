use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::EngineConfig;
use crate::matching::MatchScorer;
use crate::ratings::RatingStore;
use crate::recipe::{Difficulty, IngredientName, Recipe};

/// Optional attribute predicates. Each unset field is skipped; the set ones
/// must all hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecipeFilter {
    /// Keep recipes carrying any of these dietary tags.
    pub dietary: Vec<String>,
    pub difficulty: Option<Difficulty>,
    /// Minutes, inclusive.
    pub max_cooking_time: Option<i64>,
    pub min_calories: Option<f64>,
    pub max_calories: Option<f64>,
    /// Case-insensitive substring of the recipe's cuisine.
    pub cuisine: Option<String>,
    /// Keep recipes carrying any of these tags (compared lower-cased).
    pub tags: Vec<String>,
}

impl RecipeFilter {
    pub fn is_empty(&self) -> bool {
        *self == RecipeFilter::default()
    }

    pub fn matches(&self, recipe: &Recipe) -> bool {
        if !self.dietary.is_empty() && !self.dietary.iter().any(|diet| recipe.dietary.contains(diet)) {
            return false;
        }
        if let Some(difficulty) = self.difficulty {
            if recipe.difficulty != Some(difficulty) {
                return false;
            }
        }
        if let Some(max_time) = self.max_cooking_time {
            if recipe.cooking_time > max_time {
                return false;
            }
        }
        let calories = recipe.nutrition.calories;
        if self.min_calories.is_some_and(|min| calories < min) || self.max_calories.is_some_and(|max| calories > max) {
            return false;
        }
        if let Some(cuisine) = &self.cuisine {
            if !recipe.cuisine.to_lowercase().contains(&cuisine.to_lowercase()) {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| recipe.tags.contains(&tag.to_lowercase())) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        recipes.iter().filter(|recipe| self.matches(recipe)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMatch {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub match_score: f64,
    pub missing_ingredients: Vec<String>,
    pub substitution_suggestions: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecommendRequest {
    pub available_ingredients: Vec<IngredientName>,
    pub dietary_preferences: Vec<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub average_rating: f64,
    pub match_score: f64,
    pub recommendation_score: f64,
}

pub struct Ranker<'a> {
    scorer: MatchScorer<'a>,
    config: &'a EngineConfig,
}

impl<'a> Ranker<'a> {
    pub fn new(scorer: MatchScorer<'a>, config: &'a EngineConfig) -> Self {
        Self { scorer, config }
    }

    /// Recipes reaching the minimum score (exactly 1 when `exact_match`), best
    /// first. Equal scores keep corpus order.
    pub fn search_by_ingredients<U>(&self, recipes: &[Recipe], user_ingredients: &[U], exact_match: bool) -> Vec<RecipeMatch>
    where
        U: AsRef<str> + Sync,
    {
        let minimum = if exact_match { 1.0 } else { self.config.min_match_score };
        let mut matches: Vec<RecipeMatch> = recipes
            .par_iter()
            .filter_map(|recipe| {
                let result = self.scorer.evaluate(&recipe.ingredient_names(), user_ingredients);
                (result.score >= minimum).then(|| RecipeMatch {
                    recipe: recipe.clone(),
                    match_score: result.score,
                    missing_ingredients: result.missing_ingredients,
                    substitution_suggestions: result.substitution_suggestions,
                })
            })
            .collect();
        matches.sort_by(|a, b| b.match_score.partial_cmp(&a.match_score).unwrap_or(Ordering::Equal));
        matches
    }

    /// Blends ingredient coverage with the recipe's average rating and
    /// returns the top `limit` recipes.
    pub fn recommend(&self, recipes: &[Recipe], ratings: &dyn RatingStore, request: &RecommendRequest) -> Vec<Recommendation> {
        let limit = request.limit.unwrap_or(self.config.recommend_limit);
        let preferences = &request.dietary_preferences;

        let mut scored: Vec<Recommendation> = recipes
            .par_iter()
            .filter(|recipe| {
                preferences.is_empty() || preferences.iter().any(|pref| recipe.dietary.contains(pref))
            })
            .map(|recipe| {
                let average_rating = ratings.average_rating(recipe.id).unwrap_or(self.config.default_rating);
                let match_score = self.scorer.score(&recipe.ingredient_names(), &request.available_ingredients);
                Recommendation {
                    recipe: recipe.clone(),
                    average_rating,
                    match_score,
                    recommendation_score: self.blend(match_score, average_rating),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.recommendation_score
                .partial_cmp(&a.recommendation_score)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(limit);
        scored
    }

    fn blend(&self, match_score: f64, average_rating: f64) -> f64 {
        let rating_fraction = if self.config.max_rating > 0.0 {
            average_rating / self.config.max_rating
        } else {
            0.0
        };
        (self.config.ingredient_weight * match_score + self.config.rating_weight * rating_fraction).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{MatchRule, SubstitutionTable};
    use crate::ratings::InMemoryRatingStore;
    use crate::recipe::{Nutrition, RecipeIngredient};

    fn recipe(id: u32, ingredients: &[&str], dietary: &[&str]) -> Recipe {
        Recipe {
            id,
            name: format!("Recipe {}", id),
            description: None,
            ingredients: ingredients
                .iter()
                .map(|name| RecipeIngredient {
                    name: name.to_string(),
                    quantity: None,
                    unit: String::new(),
                })
                .collect(),
            instructions: Vec::new(),
            dietary: dietary.iter().map(|d| d.to_string()).collect(),
            cuisine: "Italian".to_string(),
            cooking_time: 30,
            difficulty: Some(Difficulty::Easy),
            servings: None,
            nutrition: Nutrition {
                calories: 500.0,
                ..Nutrition::default()
            },
            tags: vec!["dinner".to_string()],
            image: None,
        }
    }

    fn corpus() -> Vec<Recipe> {
        vec![
            recipe(1, &["pasta", "tomato", "basil", "garlic"], &["vegetarian"]),
            recipe(2, &["chicken breast", "rice"], &[]),
            recipe(3, &["tomato", "garlic"], &["vegan", "vegetarian"]),
            recipe(4, &["beef", "potato", "carrot", "onion", "celery", "thyme", "bay leaf", "stock", "wine", "flour", "butter"], &[]),
        ]
    }

    #[test]
    fn test_search_sorted_and_thresholded() {
        let table = SubstitutionTable::default();
        let config = EngineConfig::default();
        let ranker = Ranker::new(MatchScorer::new(&table, 0.8, MatchRule::Containment), &config);
        let results = ranker.search_by_ingredients(&corpus(), &["tomato", "garlic"], false);

        let ids: Vec<u32> = results.iter().map(|m| m.recipe.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(results[0].match_score, 1.0);
        assert_eq!(results[1].match_score, 0.5);
        assert_eq!(results[1].missing_ingredients, vec!["pasta", "basil"]);
        assert!(results.windows(2).all(|w| w[0].match_score >= w[1].match_score));
    }

    #[test]
    fn test_exact_search_requires_full_coverage() {
        let table = SubstitutionTable::default();
        let config = EngineConfig::default();
        let ranker = Ranker::new(MatchScorer::new(&table, 0.8, MatchRule::Containment), &config);
        let results = ranker.search_by_ingredients(&corpus(), &["tomato", "garlic"], true);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe.id, 3);
        assert!(results[0].missing_ingredients.is_empty());
    }

    #[test]
    fn test_single_hit_in_large_recipe_is_below_threshold() {
        let table = SubstitutionTable::default();
        let config = EngineConfig::default();
        let ranker = Ranker::new(MatchScorer::new(&table, 0.8, MatchRule::Containment), &config);
        // 1 of 11 ingredients is just under 0.1.
        let results = ranker.search_by_ingredients(&corpus(), &["thyme"], false);
        assert!(results.is_empty());
    }

    #[test]
    fn test_recommend_unrated_uses_default_rating() {
        let table = SubstitutionTable::default();
        let config = EngineConfig::default();
        let ranker = Ranker::new(MatchScorer::new(&table, 0.8, MatchRule::Containment), &config);
        let store = InMemoryRatingStore::new();
        let request = RecommendRequest {
            available_ingredients: vec!["chicken".into()],
            dietary_preferences: Vec::new(),
            limit: Some(10),
        };
        let results = ranker.recommend(&corpus(), &store, &request);
        let chicken = results.iter().find(|r| r.recipe.id == 2).unwrap();
        assert_eq!(chicken.match_score, 0.5);
        assert_eq!(chicken.average_rating, 3.0);
        assert!((chicken.recommendation_score - 0.56).abs() < 1e-9);
        assert_eq!(results[0].recipe.id, 2);
    }

    #[test]
    fn test_recommend_ratings_outweigh_coverage() -> anyhow::Result<()> {
        let table = SubstitutionTable::default();
        let config = EngineConfig::default();
        let ranker = Ranker::new(MatchScorer::new(&table, 0.8, MatchRule::Containment), &config);
        let store = InMemoryRatingStore::new();
        store.record_rating(4, 5.0)?;
        store.record_rating(3, 1.0)?;
        let request = RecommendRequest {
            available_ingredients: vec!["tomato".into(), "garlic".into()],
            dietary_preferences: Vec::new(),
            limit: None,
        };
        let results = ranker.recommend(&corpus(), &store, &request);
        assert_eq!(results.len(), 4);
        // Recipe 4: 0.4 * 0 + 0.6 * 1.0 = 0.6; recipe 3: 0.4 * 1 + 0.6 * 0.2 = 0.52.
        assert_eq!(results[0].recipe.id, 4);
        assert!(results.windows(2).all(|w| w[0].recommendation_score >= w[1].recommendation_score));
        Ok(())
    }

    #[test]
    fn test_recommend_dietary_filter_and_limit() {
        let table = SubstitutionTable::default();
        let config = EngineConfig::default();
        let ranker = Ranker::new(MatchScorer::new(&table, 0.8, MatchRule::Containment), &config);
        let store = InMemoryRatingStore::new();
        let request = RecommendRequest {
            available_ingredients: Vec::new(),
            dietary_preferences: vec!["vegan".to_string(), "keto".to_string()],
            limit: Some(5),
        };
        let results = ranker.recommend(&corpus(), &store, &request);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].recipe.id, 3);
        assert_eq!(results[0].match_score, 0.0);

        let request = RecommendRequest {
            limit: Some(2),
            ..RecommendRequest::default()
        };
        assert_eq!(ranker.recommend(&corpus(), &store, &request).len(), 2);
    }

    #[test]
    fn test_filter_chain_each_predicate() {
        let mut recipes = corpus();
        recipes[1].difficulty = Some(Difficulty::Hard);
        recipes[1].cooking_time = 90;
        recipes[2].nutrition.calories = 150.0;
        recipes[2].cuisine = "Thai".to_string();
        recipes[3].tags = vec!["comfort".to_string()];

        let ids = |filter: &RecipeFilter| filter.apply(&recipes).iter().map(|r| r.id).collect::<Vec<_>>();

        assert_eq!(ids(&RecipeFilter::default()), vec![1, 2, 3, 4]);
        assert!(RecipeFilter::default().is_empty());
        assert_eq!(
            ids(&RecipeFilter { dietary: vec!["vegan".into()], ..Default::default() }),
            vec![3]
        );
        assert_eq!(
            ids(&RecipeFilter { difficulty: Some(Difficulty::Hard), ..Default::default() }),
            vec![2]
        );
        assert_eq!(
            ids(&RecipeFilter { max_cooking_time: Some(30), ..Default::default() }),
            vec![1, 3, 4]
        );
        assert_eq!(
            ids(&RecipeFilter { min_calories: Some(200.0), max_calories: Some(500.0), ..Default::default() }),
            vec![1, 2, 4]
        );
        assert_eq!(
            ids(&RecipeFilter { max_calories: Some(150.0), ..Default::default() }),
            vec![3]
        );
        assert_eq!(
            ids(&RecipeFilter { cuisine: Some("THA".into()), ..Default::default() }),
            vec![3]
        );
        assert_eq!(
            ids(&RecipeFilter { tags: vec!["Comfort".into()], ..Default::default() }),
            vec![4]
        );
        assert_eq!(
            ids(&RecipeFilter {
                dietary: vec!["vegetarian".into()],
                cuisine: Some("italian".into()),
                ..Default::default()
            }),
            vec![1]
        );
    }
}
