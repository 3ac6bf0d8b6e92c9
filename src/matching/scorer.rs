use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::matching::normalizer::normalize;
use crate::matching::substitutions::SubstitutionTable;

/// How a user ingredient is compared with a recipe ingredient once both are
/// in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchRule {
    /// Either string contains the other. Loose: "egg" also hits "eggplant".
    #[default]
    Containment,
    /// The shorter name must appear as a run of whole words in the longer one.
    TokenBoundary,
}

impl MatchRule {
    pub fn matches(self, a: &str, b: &str) -> bool {
        if a.is_empty() || b.is_empty() {
            return false;
        }
        match self {
            MatchRule::Containment => a.contains(b) || b.contains(a),
            MatchRule::TokenBoundary => contains_word_run(a, b) || contains_word_run(b, a),
        }
    }

    /// One-directional form of [`MatchRule::matches`]: `needle` inside `haystack`.
    pub fn matches_within(self, haystack: &str, needle: &str) -> bool {
        if haystack.is_empty() || needle.is_empty() {
            return false;
        }
        match self {
            MatchRule::Containment => haystack.contains(needle),
            MatchRule::TokenBoundary => contains_word_run(haystack, needle),
        }
    }
}

fn contains_word_run(haystack: &str, needle: &str) -> bool {
    let haystack: Vec<&str> = haystack.split_whitespace().collect();
    let needle: Vec<&str> = needle.split_whitespace().collect();
    !needle.is_empty() && haystack.windows(needle.len()).any(|window| window == needle.as_slice())
}

impl FromStr for MatchRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "containment" => Ok(MatchRule::Containment),
            "token-boundary" => Ok(MatchRule::TokenBoundary),
            other => Err(format!("unknown match rule '{}'", other)),
        }
    }
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRule::Containment => f.write_str("containment"),
            MatchRule::TokenBoundary => f.write_str("token-boundary"),
        }
    }
}

/// Score and gaps of one recipe against a user's pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub score: f64,
    /// Recipe ingredients, as written in the recipe, that earned no credit.
    pub missing_ingredients: Vec<String>,
    /// Missing ingredient (as written) -> substitutes the table knows for it.
    pub substitution_suggestions: BTreeMap<String, Vec<String>>,
}

pub struct MatchScorer<'a> {
    substitutions: &'a SubstitutionTable,
    substitution_credit: f64,
    rule: MatchRule,
}

impl<'a> MatchScorer<'a> {
    pub fn new(substitutions: &'a SubstitutionTable, substitution_credit: f64, rule: MatchRule) -> Self {
        Self {
            substitutions,
            // Substitution credit stays strictly below a direct match.
            substitution_credit: substitution_credit.clamp(0.0, 0.99),
            rule,
        }
    }

    /// Fraction of `recipe_ingredients` covered by `user_ingredients`, in [0, 1].
    pub fn score<R, U>(&self, recipe_ingredients: &[R], user_ingredients: &[U]) -> f64
    where
        R: AsRef<str>,
        U: AsRef<str>,
    {
        if user_ingredients.is_empty() || recipe_ingredients.is_empty() {
            return 0.0;
        }
        let pantry = canonical_pantry(user_ingredients);
        let points: f64 = recipe_ingredients
            .iter()
            .map(|ingredient| self.credit(&normalize(ingredient.as_ref()), &pantry))
            .sum();
        (points / recipe_ingredients.len() as f64).clamp(0.0, 1.0)
    }

    /// Recipe ingredients that earn neither a direct nor a substitution credit.
    pub fn missing_ingredients<R, U>(&self, recipe_ingredients: &[R], user_ingredients: &[U]) -> Vec<String>
    where
        R: AsRef<str>,
        U: AsRef<str>,
    {
        let pantry = canonical_pantry(user_ingredients);
        recipe_ingredients
            .iter()
            .map(|ingredient| ingredient.as_ref())
            .filter(|ingredient| self.credit(&normalize(ingredient), &pantry) == 0.0)
            .map(str::to_string)
            .collect()
    }

    /// Substitutes for each missing ingredient that has a table entry, keyed
    /// by the ingredient as written.
    pub fn substitution_suggestions<M: AsRef<str>>(&self, missing: &[M]) -> BTreeMap<String, Vec<String>> {
        missing
            .iter()
            .filter_map(|ingredient| {
                let substitutes = self.substitutions.substitutes_for(&normalize(ingredient.as_ref()));
                (!substitutes.is_empty()).then(|| (ingredient.as_ref().to_string(), substitutes.to_vec()))
            })
            .collect()
    }

    /// Score, missing list and suggestions from a single pass over the recipe.
    pub fn evaluate<R, U>(&self, recipe_ingredients: &[R], user_ingredients: &[U]) -> MatchResult
    where
        R: AsRef<str>,
        U: AsRef<str>,
    {
        let pantry = canonical_pantry(user_ingredients);
        let mut points = 0.0;
        let mut missing = Vec::new();
        for ingredient in recipe_ingredients.iter().map(|ingredient| ingredient.as_ref()) {
            let credit = self.credit(&normalize(ingredient), &pantry);
            if credit == 0.0 {
                missing.push(ingredient.to_string());
            }
            points += credit;
        }
        let score = if user_ingredients.is_empty() || recipe_ingredients.is_empty() {
            0.0
        } else {
            (points / recipe_ingredients.len() as f64).clamp(0.0, 1.0)
        };
        let substitution_suggestions = self.substitution_suggestions(&missing);
        MatchResult {
            score,
            missing_ingredients: missing,
            substitution_suggestions,
        }
    }

    /// 1 for a direct match, the substitution credit when only a listed
    /// substitute is on hand, 0 otherwise. A pantry item that is itself one of
    /// the recipe ingredient's substitutes ("almond milk" for "milk") counts as
    /// a substitution even though the names also contain each other.
    fn credit(&self, recipe_canonical: &str, pantry: &[String]) -> f64 {
        let substitutes = self.substitutions.substitutes_for(recipe_canonical);
        let is_listed_substitute =
            |owned: &str| substitutes.iter().any(|sub| self.rule.matches_within(owned, sub));

        let direct = pantry.iter().any(|owned| {
            owned == recipe_canonical
                || (self.rule.matches(owned, recipe_canonical) && !is_listed_substitute(owned.as_str()))
        });
        if direct {
            return 1.0;
        }
        let has_substitute = pantry
            .iter()
            .any(|owned| substitutes.iter().any(|sub| self.rule.matches(owned, sub)));
        if has_substitute {
            self.substitution_credit
        } else {
            0.0
        }
    }
}

/// Canonical forms of the user's ingredients. Entries that normalize to
/// nothing ("fresh") carry no information and are dropped.
fn canonical_pantry<U: AsRef<str>>(user_ingredients: &[U]) -> Vec<String> {
    user_ingredients
        .iter()
        .map(|ingredient| normalize(ingredient.as_ref()))
        .filter(|canonical| !canonical.is_empty())
        .collect()
}
