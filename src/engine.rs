use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::corpus::validate_corpus;
use crate::error::{EngineError, EngineResult};
use crate::matching::{
    normalize, FuzzyResolver, IngredientMatch, MatchResult, MatchScorer, SubstitutionTable, Suggestion, Vocabulary,
};
use crate::ranker::{Ranker, RecipeFilter, RecipeMatch, RecommendRequest, Recommendation};
use crate::ratings::{validate_rating, InMemoryRatingStore, RatingStore, RatingSummary};
use crate::recipe::Recipe;

/// Everything derived from one corpus load. Never mutated once published.
struct MatchIndex {
    recipes: Vec<Recipe>,
    by_id: HashMap<u32, usize>,
    resolver: FuzzyResolver,
}

impl MatchIndex {
    fn build(recipes: Vec<Recipe>, config: &EngineConfig) -> Self {
        let vocabulary = Vocabulary::build(&recipes);
        let by_id = recipes.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
        Self {
            resolver: FuzzyResolver::new(vocabulary, config),
            recipes,
            by_id,
        }
    }

    fn recipe(&self, id: u32) -> Option<&Recipe> {
        self.by_id.get(&id).map(|&i| &self.recipes[i])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetails {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub average_rating: Option<f64>,
    pub total_ratings: usize,
}

/// Ingredient matching and recipe ranking over a swappable recipe corpus.
///
/// Readers take a snapshot of the current index and work on it without
/// holding any lock; [`PantryEngine::initialize`] builds a complete new index
/// before replacing the old one.
pub struct PantryEngine {
    config: EngineConfig,
    substitutions: SubstitutionTable,
    ratings: Arc<dyn RatingStore>,
    index: RwLock<Option<Arc<MatchIndex>>>,
}

impl Default for PantryEngine {
    fn default() -> Self {
        Self::new(
            EngineConfig::default(),
            SubstitutionTable::default(),
            Arc::new(InMemoryRatingStore::new()),
        )
    }
}

impl PantryEngine {
    pub fn new(config: EngineConfig, substitutions: SubstitutionTable, ratings: Arc<dyn RatingStore>) -> Self {
        Self {
            config,
            substitutions,
            ratings,
            index: RwLock::new(None),
        }
    }

    /// Builds an engine and loads `recipes` in one step.
    pub fn with_corpus(recipes: Vec<Recipe>) -> EngineResult<Self> {
        let engine = Self::default();
        engine.initialize(recipes)?;
        Ok(engine)
    }

    /// Validates `recipes`, builds the vocabulary and publishes the new index.
    /// On error the previously loaded corpus, if any, stays in service.
    pub fn initialize(&self, recipes: Vec<Recipe>) -> EngineResult<usize> {
        if let Err(e) = validate_corpus(&recipes) {
            warn!("Rejected recipe corpus: {}", e);
            return Err(e);
        }
        let index = Arc::new(MatchIndex::build(recipes, &self.config));
        let vocabulary_size = index.resolver.vocabulary().len();
        info!(
            "Initialized ingredient index with {} ingredients from {} recipes",
            vocabulary_size,
            index.recipes.len()
        );

        let mut slot = self.index.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(index);
        Ok(vocabulary_size)
    }

    pub fn is_initialized(&self) -> bool {
        self.index.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn snapshot(&self) -> EngineResult<Arc<MatchIndex>> {
        let slot = self.index.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.clone().ok_or(EngineError::NotInitialized)
    }

    fn scorer(&self) -> MatchScorer<'_> {
        MatchScorer::new(&self.substitutions, self.config.substitution_credit, self.config.match_rule)
    }

    pub fn recipe_count(&self) -> usize {
        self.snapshot().map(|index| index.recipes.len()).unwrap_or(0)
    }

    /// Ingredient autocomplete, capped at the configured suggestion limit.
    pub fn suggest(&self, partial: &str) -> EngineResult<Vec<Suggestion>> {
        self.suggest_with_limit(partial, self.config.suggestion_limit)
    }

    pub fn suggest_with_limit(&self, partial: &str, limit: usize) -> EngineResult<Vec<Suggestion>> {
        if partial.trim().chars().count() < self.config.min_query_len {
            return Ok(Vec::new());
        }
        Ok(self.snapshot()?.resolver.suggest(partial, limit))
    }

    pub fn find_matches(&self, user_ingredient: &str) -> EngineResult<Vec<IngredientMatch>> {
        Ok(self.snapshot()?.resolver.find_matches(user_ingredient, &self.substitutions))
    }

    /// Vocabulary in alphabetical order.
    pub fn all_ingredients(&self) -> EngineResult<Vec<String>> {
        Ok(self.snapshot()?.resolver.vocabulary().sorted())
    }

    pub fn substitutes_for(&self, ingredient: &str) -> Vec<String> {
        self.substitutions.substitutes_for(&normalize(ingredient)).to_vec()
    }

    pub fn score<R, U>(&self, recipe_ingredients: &[R], user_ingredients: &[U]) -> f64
    where
        R: AsRef<str>,
        U: AsRef<str>,
    {
        self.scorer().score(recipe_ingredients, user_ingredients)
    }

    pub fn evaluate<R, U>(&self, recipe_ingredients: &[R], user_ingredients: &[U]) -> MatchResult
    where
        R: AsRef<str>,
        U: AsRef<str>,
    {
        self.scorer().evaluate(recipe_ingredients, user_ingredients)
    }

    /// Primary search: recipes covered by `user_ingredients`, best first.
    pub fn match_recipes<U>(&self, user_ingredients: &[U], exact_match: bool) -> EngineResult<Vec<RecipeMatch>>
    where
        U: AsRef<str> + Sync,
    {
        let index = self.snapshot()?;
        let ranker = Ranker::new(self.scorer(), &self.config);
        let matches = ranker.search_by_ingredients(&index.recipes, user_ingredients, exact_match);
        debug!(
            "Ingredient search ({} ingredients, exact: {}) matched {} recipes",
            user_ingredients.len(),
            exact_match,
            matches.len()
        );
        Ok(matches)
    }

    pub fn recommend(&self, request: &RecommendRequest) -> EngineResult<Vec<Recommendation>> {
        let index = self.snapshot()?;
        let ranker = Ranker::new(self.scorer(), &self.config);
        let recommendations = ranker.recommend(&index.recipes, self.ratings.as_ref(), request);
        debug!("Produced {} recommendations", recommendations.len());
        Ok(recommendations)
    }

    pub fn filter_recipes(&self, filter: &RecipeFilter) -> EngineResult<Vec<Recipe>> {
        let index = self.snapshot()?;
        Ok(filter.apply(&index.recipes).into_iter().cloned().collect())
    }

    pub fn recipe_details(&self, recipe_id: u32) -> EngineResult<RecipeDetails> {
        let index = self.snapshot()?;
        let recipe = index.recipe(recipe_id).ok_or(EngineError::RecipeNotFound(recipe_id))?;
        Ok(RecipeDetails {
            recipe: recipe.clone(),
            average_rating: self.ratings.average_rating(recipe_id),
            total_ratings: self.ratings.rating_count(recipe_id),
        })
    }

    /// Records a 1-5 rating for a known recipe.
    pub fn rate_recipe(&self, recipe_id: u32, value: f64) -> EngineResult<RatingSummary> {
        let value = validate_rating(value)?;
        let index = self.snapshot()?;
        if index.recipe(recipe_id).is_none() {
            return Err(EngineError::RecipeNotFound(recipe_id));
        }
        let summary = self.ratings.record_rating(recipe_id, value)?;
        info!(
            "Recipe {} rated {} (avg {:.2} over {} ratings)",
            recipe_id, value, summary.average_rating, summary.total_ratings
        );
        Ok(summary)
    }

    /// Replays stored ratings through [`PantryEngine::rate_recipe`]. Rows for
    /// unknown recipes or with out-of-range values are skipped with a warning.
    /// Returns how many were recorded.
    pub fn seed_ratings(&self, rows: impl IntoIterator<Item = (u32, f64)>) -> usize {
        let mut accepted = 0;
        for (recipe_id, value) in rows {
            match self.rate_recipe(recipe_id, value) {
                Ok(_) => accepted += 1,
                Err(e) => warn!("Skipping seeded rating for recipe {}: {}", recipe_id, e),
            }
        }
        accepted
    }
}
