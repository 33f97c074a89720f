//! crates/resource_list_core/src/error.rs
//!
//! Errors raised by the core services.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The AI classifier could not produce a usable answer. Always recovered
    /// inside the classifier by falling back to keyword rules.
    #[error("Classification unavailable: {0}")]
    ClassificationUnavailable(String),

    /// No unused share slug was found within the attempt budget.
    #[error("Could not generate a unique slug after {attempts} attempts")]
    SlugExhaustion { attempts: usize },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Port(#[from] PortError),
}

pub type EngineResult<T> = Result<T, EngineError>;
