pub mod fuzzy;
pub mod normalizer;
pub mod scorer;
pub mod substitutions;
pub mod vocabulary;

// Re-export key structs/functions for easier access from the engine and ranker
pub use fuzzy::{FuzzyResolver, IngredientMatch, MatchType, Suggestion};
pub use normalizer::normalize;
pub use scorer::{MatchResult, MatchRule, MatchScorer};
pub use substitutions::SubstitutionTable;
pub use vocabulary::Vocabulary;
