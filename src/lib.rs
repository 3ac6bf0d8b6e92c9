pub mod cli;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod matching;
pub mod ranker;
pub mod ratings;
pub mod recipe;

pub use engine::PantryEngine;
pub use error::{EngineError, EngineResult};
