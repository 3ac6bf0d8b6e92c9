use std::collections::HashMap;

use crate::matching::normalizer::normalize;
use crate::recipe::Recipe;

/// Deduplicated, lower-cased ingredient names seen in a recipe corpus.
///
/// Entries keep their first-seen order, which the fuzzy resolver uses to break
/// ties. A second index keyed by canonical form answers exact lookups for
/// normalized queries.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<String>,
    positions: HashMap<String, usize>,
    canonical: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn build(recipes: &[Recipe]) -> Self {
        Self::from_names(
            recipes
                .iter()
                .flat_map(|recipe| recipe.ingredients.iter().map(|i| i.name.as_str())),
        )
    }

    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vocabulary = Self::default();
        for name in names {
            vocabulary.insert(name);
        }
        vocabulary
    }

    fn insert(&mut self, name: &str) {
        let entry = name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        if entry.is_empty() || self.positions.contains_key(&entry) {
            return;
        }
        let position = self.entries.len();
        let canonical = normalize(&entry);
        if !canonical.is_empty() {
            self.canonical.entry(canonical).or_insert(position);
        }
        self.positions.insert(entry.clone(), position);
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive membership of a name as it appears in recipes.
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(&name.trim().to_lowercase())
    }

    /// First entry whose canonical form equals `canonical`.
    pub fn lookup_canonical(&self, canonical: &str) -> Option<&str> {
        self.canonical
            .get(canonical)
            .map(|&position| self.entries[position].as_str())
    }

    /// Entries in first-seen order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn sorted(&self) -> Vec<String> {
        let mut sorted = self.entries.clone();
        sorted.sort();
        sorted
    }
}
