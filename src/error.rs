use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine has not been initialized with a recipe corpus")]
    NotInitialized,

    #[error("Recipe not found: {0}")]
    RecipeNotFound(u32),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(f64),

    #[error("Invalid recipe corpus: {0}")]
    CorpusValidation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offending_value() {
        assert_eq!(EngineError::RecipeNotFound(7).to_string(), "Recipe not found: 7");
        assert_eq!(
            EngineError::InvalidRating(6.5).to_string(),
            "Rating must be between 1 and 5, got 6.5"
        );
        assert!(EngineError::CorpusValidation("duplicate recipe id 1".into())
            .to_string()
            .ends_with("duplicate recipe id 1"));
    }
}
