//! Approximate ingredient lookup against the corpus vocabulary.
//!
//! Similarity is the best of three edit-distance views of the pair: the whole
//! strings, the strings with their words sorted (so word order does not
//! matter) and the query against same-length windows of the candidate that
//! start on a word boundary (so "tom" finds "cherry tomatoes"). Window matches
//! are discounted by the configured partial weight so a complete match always
//! outranks a prefix match.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strsim::normalized_levenshtein;

use crate::config::EngineConfig;
use crate::matching::normalizer::normalize;
use crate::matching::substitutions::SubstitutionTable;
use crate::matching::vocabulary::Vocabulary;

/// Slack for candidates sitting exactly on the distance threshold.
const DISTANCE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub ingredient: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Substitution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientMatch {
    pub ingredient: String,
    pub match_type: MatchType,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substitutes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FuzzyResolver {
    vocabulary: Vocabulary,
    threshold: f64,
    partial_weight: f64,
    min_query_len: usize,
    substitution_confidence: f64,
}

impl FuzzyResolver {
    pub fn new(vocabulary: Vocabulary, config: &EngineConfig) -> Self {
        Self {
            vocabulary,
            threshold: config.fuzzy_threshold.clamp(0.0, 1.0),
            partial_weight: config.partial_match_weight.clamp(0.0, 1.0),
            min_query_len: config.min_query_len,
            substitution_confidence: config.substitution_credit,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Autocomplete suggestions for partially typed text, best first.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_query_len {
            return Vec::new();
        }
        // A query made only of descriptors ("fresh") still deserves suggestions.
        let mut normalized = normalize(trimmed);
        if normalized.is_empty() {
            normalized = trimmed.to_lowercase();
        }
        let mut ranked = self.rank(&normalized);
        ranked.truncate(limit);
        ranked
    }

    /// Resolves one user ingredient: an exact canonical hit or else the best
    /// fuzzy candidate, followed by a substitution hit when the table has one.
    pub fn find_matches(&self, user_ingredient: &str, substitutions: &SubstitutionTable) -> Vec<IngredientMatch> {
        let normalized = normalize(user_ingredient);
        let mut matches = Vec::new();
        if normalized.is_empty() {
            return matches;
        }

        if let Some(entry) = self.vocabulary.lookup_canonical(&normalized) {
            matches.push(IngredientMatch {
                ingredient: entry.to_string(),
                match_type: MatchType::Exact,
                confidence: 1.0,
                substitutes: Vec::new(),
            });
        } else if let Some(best) = self.rank(&normalized).into_iter().next() {
            matches.push(IngredientMatch {
                ingredient: best.ingredient,
                match_type: MatchType::Fuzzy,
                confidence: best.confidence,
                substitutes: Vec::new(),
            });
        }

        if let Some((base, substitutes)) = substitutions.find_containing(&normalized) {
            matches.push(IngredientMatch {
                ingredient: base.to_string(),
                match_type: MatchType::Substitution,
                confidence: self.substitution_confidence,
                substitutes: substitutes.to_vec(),
            });
        }
        matches
    }

    fn rank(&self, normalized_query: &str) -> Vec<Suggestion> {
        let mut ranked: Vec<Suggestion> = self
            .vocabulary
            .entries()
            .iter()
            .filter_map(|entry| {
                let confidence = similarity(normalized_query, entry, self.partial_weight).clamp(0.0, 1.0);
                (confidence + DISTANCE_EPSILON >= 1.0 - self.threshold).then(|| Suggestion {
                    ingredient: entry.clone(),
                    confidence,
                })
            })
            .collect();
        // Stable: equal confidences keep vocabulary order.
        ranked.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(Ordering::Equal));
        ranked
    }
}

/// Similarity of a normalized query and a vocabulary entry, in [0, 1].
pub fn similarity(query: &str, candidate: &str, partial_weight: f64) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    if query == candidate {
        return 1.0;
    }
    let whole = normalized_levenshtein(query, candidate);
    let sorted = normalized_levenshtein(&sorted_tokens(query), &sorted_tokens(candidate));
    let partial = best_window(query, candidate) * partial_weight;
    whole.max(sorted).max(partial)
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Best similarity between `query` and windows of `candidate` that start at a
/// word and are within one character of the query's length.
fn best_window(query: &str, candidate: &str) -> f64 {
    let query_len = query.chars().count();
    let chars: Vec<char> = candidate.chars().collect();
    if query_len >= chars.len() {
        return 0.0;
    }

    let word_starts = chars
        .iter()
        .enumerate()
        .filter(|(i, c)| !c.is_whitespace() && (*i == 0 || chars[i - 1].is_whitespace()))
        .map(|(i, _)| i);

    let mut best = 0.0_f64;
    for start in word_starts {
        for window_len in [query_len.saturating_sub(1), query_len, query_len + 1] {
            if window_len == 0 {
                continue;
            }
            let end = (start + window_len).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            best = best.max(normalized_levenshtein(query, &window));
        }
    }
    best
}
