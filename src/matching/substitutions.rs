use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::matching::normalizer::normalize;

/// Curated base ingredient -> acceptable substitutes.
const DEFAULT_SUBSTITUTIONS: &[(&str, &[&str])] = &[
    ("milk", &["almond milk", "soy milk", "oat milk", "coconut milk"]),
    ("butter", &["margarine", "coconut oil", "olive oil", "vegetable oil"]),
    ("eggs", &["flax eggs", "chia eggs", "applesauce"]),
    ("ground beef", &["ground turkey", "ground chicken", "lentils", "mushrooms"]),
    ("flour", &["almond flour", "rice flour", "coconut flour", "oat flour"]),
    ("sugar", &["honey", "maple syrup", "stevia", "brown sugar"]),
    ("soy sauce", &["tamari", "coconut aminos", "fish sauce"]),
    ("chicken breast", &["chicken thighs", "turkey breast", "tofu", "tempeh"]),
    ("heavy cream", &["coconut cream", "cashew cream", "greek yogurt"]),
    ("parmesan cheese", &["nutritional yeast", "romano cheese", "pecorino"]),
];

/// Immutable substitution lookup. Bases are stored in canonical form so
/// normalized recipe names find them; substitutes keep their descriptors
/// ("ground turkey") and are only lower-cased. Lookups go from base
/// ingredient to substitutes only.
#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::from_pairs(
            DEFAULT_SUBSTITUTIONS
                .iter()
                .map(|(base, subs)| (base.to_string(), subs.iter().map(|s| s.to_string()).collect())),
        )
    }
}

impl SubstitutionTable {
    /// Builds a table from `(base, substitutes)` pairs. Later pairs for an already-seen base extend its list.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let mut table = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for (base, substitutes) in pairs {
            let base = normalize(&base);
            if base.is_empty() {
                continue;
            }
            let position = *table.index.entry(base.clone()).or_insert_with(|| {
                table.entries.push((base, Vec::new()));
                table.entries.len() - 1
            });
            let list = &mut table.entries[position].1;
            for substitute in substitutes {
                let substitute = fold_case(&substitute);
                if !substitute.is_empty() && !list.contains(&substitute) {
                    list.push(substitute);
                }
            }
        }
        table
    }

    /// Loads a `{"base": ["substitute", ...]}` JSON object. Bases are kept in
    /// key order.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read substitution table at {:?}", path))?;
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse substitution table at {:?}", path))?;
        Ok(Self::from_pairs(parsed))
    }

    /// Substitutes for a canonical ingredient; empty when none are defined.
    pub fn substitutes_for(&self, canonical: &str) -> &[String] {
        self.index
            .get(canonical)
            .map(|&position| self.entries[position].1.as_slice())
            .unwrap_or(&[])
    }

    /// First base whose own name, or one of whose substitutes, appears inside
    /// `normalized_query`.
    pub fn find_containing(&self, normalized_query: &str) -> Option<(&str, &[String])> {
        if normalized_query.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(base, substitutes)| {
                normalized_query.contains(base.as_str())
                    || substitutes.iter().any(|sub| normalized_query.contains(sub.as_str()))
            })
            .map(|(base, substitutes)| (base.as_str(), substitutes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fold_case(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
