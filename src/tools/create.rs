/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::{Habit, StreakEvaluator};
use crate::storage::HabitStorage;
use crate::tools::{HabitView, ToolError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub success: bool,
    pub habit: HabitView,
    pub message: String,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    evaluator: &StreakEvaluator,
    now: DateTime<Utc>,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ToolError> {
    let habit = Habit::new(params.name, params.description, now)?;

    storage.create_habit(&habit)?;
    tracing::info!("Created habit '{}' ({})", habit.name, habit.id);

    let view = HabitView::new(&habit, None, evaluator, now);
    Ok(CreateHabitResponse {
        success: true,
        message: format!(
            "{} Planted habit '{}'! Verify it today to start your streak.\nHabit ID: {}",
            view.stage_icon, habit.name, habit.id
        ),
        habit: view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_create_habit_starts_as_seed() {
        let storage = SqliteStorage::in_memory().unwrap();
        let now = Utc::now();

        let response = create_habit(
            &storage,
            &StreakEvaluator::utc(),
            now,
            CreateHabitParams {
                name: "Drink water".to_string(),
                description: Some("8 glasses".to_string()),
            },
        ).unwrap();

        assert!(response.success);
        assert_eq!(response.habit.current_streak, 0);
        assert_eq!(response.habit.growth_stage, 0);
        assert_eq!(response.habit.stage_name, "Seed");
        assert!(!response.habit.completed_today);
        assert_eq!(storage.list_habits().unwrap().len(), 1);
    }

    #[test]
    fn test_create_habit_requires_name() {
        let storage = SqliteStorage::in_memory().unwrap();
        let result = create_habit(
            &storage,
            &StreakEvaluator::utc(),
            Utc::now(),
            CreateHabitParams {
                name: "  ".to_string(),
                description: None,
            },
        );

        assert!(matches!(result, Err(ToolError::Domain(_))));
        assert!(storage.list_habits().unwrap().is_empty());
    }
}
