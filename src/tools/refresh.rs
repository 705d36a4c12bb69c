/// Tool for resetting broken streaks
///
/// This module implements the habit_refresh MCP tool: an explicit sweep over
/// all habits that zeroes every streak whose last completion is two or more
/// calendar days old. Running it twice in a row changes nothing the second
/// time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::StreakEvaluator;
use crate::storage::HabitStorage;
use crate::tools::{days, ToolError};

/// A habit whose streak was reset by the sweep
#[derive(Debug, Serialize)]
pub struct ResetHabit {
    pub habit_id: String,
    pub name: String,
    pub previous_streak: u32,
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// Response from a refresh sweep
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub checked: u32,
    pub reset: Vec<ResetHabit>,
    pub message: String,
}

/// Reset every broken streak
pub fn refresh_streaks<S: HabitStorage>(
    storage: &S,
    evaluator: &StreakEvaluator,
    now: DateTime<Utc>,
) -> Result<RefreshResponse, ToolError> {
    let habits = storage.list_habits()?;
    let mut reset = Vec::new();

    for habit in &habits {
        let last_completed_at = storage.latest_log(&habit.id)?.map(|log| log.completed_at);
        let outcome = evaluator.evaluate_list_refresh(last_completed_at, habit.current_streak, now);
        if !outcome.reset_needed {
            continue;
        }

        storage.reset_streak(&habit.id, now)?;
        tracing::info!(
            "Reset broken streak of habit '{}' ({}) from {}",
            habit.name,
            habit.id,
            habit.current_streak
        );

        reset.push(ResetHabit {
            habit_id: habit.id.to_string(),
            name: habit.name.clone(),
            previous_streak: habit.current_streak,
            last_completed_at,
        });
    }

    let message = if reset.is_empty() {
        format!("🌱 All {} habits are on track.", habits.len())
    } else {
        let lines = reset
            .iter()
            .map(|r| format!("🥀 {} lost a streak of {}", r.name, days(r.previous_streak)))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Checked {} habits, reset {}:\n{}", habits.len(), reset.len(), lines)
    };

    Ok(RefreshResponse {
        checked: habits.len() as u32,
        reset,
        message,
    })
}
