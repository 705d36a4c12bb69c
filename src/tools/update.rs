/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool. Only the name and the
/// description can be changed; streaks move through verification and the
/// refresh sweep alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::StreakEvaluator;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, HabitView, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize)]
pub struct UpdateHabitParams {
    pub habit_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// An empty string clears the description
    #[serde(default)]
    pub description: Option<String>,
}

/// Response from updating a habit
#[derive(Debug, Serialize)]
pub struct UpdateHabitResponse {
    pub success: bool,
    pub habit: HabitView,
    pub message: String,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    evaluator: &StreakEvaluator,
    now: DateTime<Utc>,
    params: UpdateHabitParams,
) -> Result<UpdateHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    if params.name.is_none() && params.description.is_none() {
        return Err(ToolError::InvalidInput(
            "Nothing to update: provide name and/or description".to_string(),
        ));
    }

    let mut habit = storage.get_habit(&habit_id)?;
    habit.update(params.name, params.description.map(Some), now)?;
    storage.update_habit(&habit)?;
    tracing::info!("Updated habit '{}' ({})", habit.name, habit.id);

    let last_completed_at = storage.latest_log(&habit_id)?.map(|log| log.completed_at);
    Ok(UpdateHabitResponse {
        success: true,
        message: format!("✅ Updated habit '{}'", habit.name),
        habit: HabitView::new(&habit, last_completed_at, evaluator, now),
    })
}
