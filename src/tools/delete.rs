/// Tool for deleting habits
///
/// This module implements the habit_delete MCP tool. Deleting a habit also
/// removes its completion history.

use serde::{Deserialize, Serialize};
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, ToolError};

#[derive(Debug, Deserialize)]
pub struct DeleteHabitParams {
    pub habit_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub success: bool,
    pub habit_id: String,
    pub message: String,
}

/// Delete a habit and all of its logs
pub fn delete_habit<S: HabitStorage>(
    storage: &S,
    params: DeleteHabitParams,
) -> Result<DeleteHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    storage.delete_habit(&habit_id)?;
    tracing::info!("Deleted habit '{}' ({})", habit.name, habit_id);

    Ok(DeleteHabitResponse {
        success: true,
        habit_id: habit_id.to_string(),
        message: format!("🗑️ Deleted habit '{}' and its history", habit.name),
    })
}
