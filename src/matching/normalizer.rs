//! Reduces free-text ingredient names to their canonical comparison form.

use regex::Regex;
use std::sync::LazyLock;

/// Freshness and preparation words.
const PREPARATION_DESCRIPTORS: &[&str] = &[
    "fresh", "dried", "chopped", "sliced", "diced", "minced", "grated", "ground",
];

/// Quality and fat-content words. Multi-word entries are matched as a phrase.
const QUALITY_DESCRIPTORS: &[&str] = &["organic", "extra virgin", "unsalted", "low-fat", "fat-free"];

static DESCRIPTOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = PREPARATION_DESCRIPTORS
        .iter()
        .chain(QUALITY_DESCRIPTORS.iter())
        .map(|word| regex::escape(word).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternatives)).expect("descriptor pattern is valid")
});

/// Lower-cases `raw`, drops descriptor words and collapses whitespace.
///
/// Removal repeats until nothing changes, so descriptors that only become
/// adjacent once another descriptor is gone ("extra fresh virgin") are
/// stripped as well and the result is a fixed point.
pub fn normalize(raw: &str) -> String {
    let mut current = collapse_whitespace(&raw.to_lowercase());
    loop {
        let stripped = collapse_whitespace(&DESCRIPTOR_PATTERN.replace_all(&current, " "));
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::Rng;

    #[test]
    fn test_strips_descriptors_and_lowercases() {
        assert_eq!(normalize("Fresh  Basil"), "basil");
        assert_eq!(normalize("Extra Virgin Olive Oil"), "olive oil");
        assert_eq!(normalize("diced tomato"), "tomato");
        assert_eq!(normalize("  unsalted   butter "), "butter");
        assert_eq!(normalize("Low-Fat Greek Yogurt"), "greek yogurt");
        assert_eq!(normalize("ground beef"), "beef");
    }

    #[test]
    fn test_only_whole_words_are_removed() {
        assert_eq!(normalize("groundnut oil"), "groundnut oil");
        assert_eq!(normalize("freshwater fish"), "freshwater fish");
        assert_eq!(normalize("dried-fruit mix"), "-fruit mix");
    }

    #[test]
    fn test_descriptor_only_input_is_empty() {
        assert_eq!(normalize("fresh chopped organic"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_descriptor_revealed_after_removal() {
        assert_eq!(normalize("extra fresh virgin olive oil"), "olive oil");
    }

    #[test]
    fn test_normalize_is_idempotent_on_random_inputs() {
        let words = [
            "fresh", "dried", "extra", "virgin", "low-fat", "fat-free", "Tomato", "chicken",
            "breast", "  ", "MINCED", "garlic", "oil", "organic", "ground", "beef",
        ];
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let len = rng.gen_range(0..8);
            let input = (0..len)
                .map(|_| *words.choose(&mut rng).unwrap())
                .collect::<Vec<_>>()
                .join(" ");
            let once = normalize(&input);
            assert_eq!(normalize(&once), once, "input: {:?}", input);
        }
    }
}
