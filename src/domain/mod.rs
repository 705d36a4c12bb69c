/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, CompletionLog) together with
/// the two pure engines that drive them: the streak evaluator and the growth
/// stage classifier. Nothing in here touches storage or I/O.

pub mod clock;
pub mod growth;
pub mod habit;
pub mod log;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use clock::*;
pub use growth::*;
pub use habit::*;
pub use log::*;
pub use streak::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid verification: {0}")]
    InvalidVerification(String),

    /// Raised only when a caller passes a stage index outside the taxonomy.
    #[error("Growth stage index {0} is out of range (expected 0..={})", GROWTH_STAGES.len() - 1)]
    InvalidStageIndex(usize),

    #[error("Invalid timezone offset: {0}")]
    InvalidTimezone(String),
}
