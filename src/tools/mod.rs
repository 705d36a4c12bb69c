/// MCP tools for habit management
///
/// This module contains all the MCP tools that external clients (like Claude)
/// can call to interact with the habit tracker. Every tool is a plain function
/// over a `HabitStorage`; the streak decisions themselves come from the
/// domain's `StreakEvaluator`.

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod logs;
pub mod refresh;
pub mod update;
pub mod verify;
pub mod view;

// Re-export tool functions for easy access
pub use create::*;
pub use delete::*;
pub use get::*;
pub use list::*;
pub use logs::*;
pub use refresh::*;
pub use update::*;
pub use verify::*;
pub use view::*;

use thiserror::Error;

use crate::domain::{DomainError, HabitId};
use crate::storage::StorageError;

/// Errors a tool call can end with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Business rejection, not a failure: the habit was already verified today
    #[error("Habit already completed today")]
    AlreadyCompletedToday { habit_id: String },
}

/// Parse a habit ID argument
pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    if raw.trim().is_empty() {
        return Err(ToolError::InvalidInput("Habit ID cannot be empty".to_string()));
    }
    HabitId::from_string(raw)
        .map_err(|_| ToolError::InvalidInput(format!("Invalid habit ID format: '{}'", raw)))
}

/// "1 day" / "3 days"
pub(crate) fn days(n: u32) -> String {
    format!("{} day{}", n, if n == 1 { "" } else { "s" })
}
