use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Rejects NaN and anything outside [1, 5].
pub fn validate_rating(value: f64) -> EngineResult<f64> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::InvalidRating(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub recipe_id: u32,
    pub average_rating: f64,
    pub total_ratings: usize,
}

/// Storage of per-recipe ratings. Implementations must be safe to share
/// between request threads.
pub trait RatingStore: Send + Sync {
    /// Appends a validated rating and returns the updated aggregate.
    fn record_rating(&self, recipe_id: u32, value: f64) -> EngineResult<RatingSummary>;

    /// Mean of all ratings for the recipe, `None` when it has none.
    fn average_rating(&self, recipe_id: u32) -> Option<f64>;

    fn rating_count(&self, recipe_id: u32) -> usize;
}

/// Process-local rating store. One coarse lock serialises appends.
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    ratings: Mutex<HashMap<u32, Vec<f64>>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_ratings<T>(&self, f: impl FnOnce(&mut HashMap<u32, Vec<f64>>) -> T) -> T {
        // Appends are atomic per entry; a poisoned map is still consistent.
        let mut guard = self.ratings.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl RatingStore for InMemoryRatingStore {
    fn record_rating(&self, recipe_id: u32, value: f64) -> EngineResult<RatingSummary> {
        let value = validate_rating(value)?;
        let summary = self.with_ratings(|ratings| {
            let list = ratings.entry(recipe_id).or_default();
            list.push(value);
            RatingSummary {
                recipe_id,
                average_rating: mean(list).unwrap_or(value),
                total_ratings: list.len(),
            }
        });
        debug!(
            "Recorded rating {} for recipe {} (avg {:.2} over {})",
            value, recipe_id, summary.average_rating, summary.total_ratings
        );
        Ok(summary)
    }

    fn average_rating(&self, recipe_id: u32) -> Option<f64> {
        self.with_ratings(|ratings| ratings.get(&recipe_id).and_then(|list| mean(list)))
    }

    fn rating_count(&self, recipe_id: u32) -> usize {
        self.with_ratings(|ratings| ratings.get(&recipe_id).map_or(0, Vec::len))
    }
}
