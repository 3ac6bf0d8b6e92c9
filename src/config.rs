use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::matching::scorer::MatchRule;

const ENV_PREFIX: &str = "PANTRY_";

/// Tunables for ingredient resolution, scoring and ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest fuzzy distance (`1 - similarity`) a suggestion may have.
    pub fuzzy_threshold: f64,
    pub suggestion_limit: usize,
    /// Extra cap applied by autocomplete front ends.
    pub ui_suggestion_limit: usize,
    pub min_query_len: usize,
    /// Discount applied when the query only matches part of a vocabulary entry.
    pub partial_match_weight: f64,
    pub substitution_credit: f64,
    pub min_match_score: f64,
    pub ingredient_weight: f64,
    pub rating_weight: f64,
    /// Average assumed for recipes nobody has rated yet.
    pub default_rating: f64,
    pub max_rating: f64,
    pub recommend_limit: usize,
    pub match_rule: MatchRule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.3,
            suggestion_limit: 10,
            ui_suggestion_limit: 8,
            min_query_len: 2,
            partial_match_weight: 0.9,
            substitution_credit: 0.8,
            min_match_score: 0.1,
            ingredient_weight: 0.4,
            rating_weight: 0.6,
            default_rating: 3.0,
            max_rating: 5.0,
            recommend_limit: 5,
            match_rule: MatchRule::Containment,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `PANTRY_*` variables (a `.env` file is honoured).
    pub fn from_env() -> Self {
        dotenv().ok();
        let mut config = Self::default();
        override_from_env("FUZZY_THRESHOLD", &mut config.fuzzy_threshold);
        override_from_env("SUGGESTION_LIMIT", &mut config.suggestion_limit);
        override_from_env("UI_SUGGESTION_LIMIT", &mut config.ui_suggestion_limit);
        override_from_env("MIN_QUERY_LEN", &mut config.min_query_len);
        override_from_env("PARTIAL_MATCH_WEIGHT", &mut config.partial_match_weight);
        override_from_env("SUBSTITUTION_CREDIT", &mut config.substitution_credit);
        override_from_env("MIN_MATCH_SCORE", &mut config.min_match_score);
        override_from_env("INGREDIENT_WEIGHT", &mut config.ingredient_weight);
        override_from_env("RATING_WEIGHT", &mut config.rating_weight);
        override_from_env("DEFAULT_RATING", &mut config.default_rating);
        override_from_env("RECOMMEND_LIMIT", &mut config.recommend_limit);
        override_from_env("MATCH_RULE", &mut config.match_rule);
        config
    }
}

fn override_from_env<T>(key: &str, field: &mut T)
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let var_name = format!("{}{}", ENV_PREFIX, key);
    if let Ok(raw) = env::var(&var_name) {
        match raw.trim().parse::<T>() {
            Ok(value) => *field = value,
            Err(e) => warn!("Ignoring {}={:?}: {}", var_name, raw, e),
        }
    }
}
