/// Tool for inspecting a single habit
///
/// This module implements the habit_get MCP tool, which shows a habit's
/// streak together with the details of its growth stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::{days_to_next_stage, motivational_message, GrowthStage, StreakEvaluator};
use crate::storage::HabitStorage;
use crate::tools::{days, parse_habit_id, HabitView, ToolError};

/// Parameters for inspecting a habit
#[derive(Debug, Deserialize)]
pub struct GetHabitParams {
    pub habit_id: String,
}

/// Detailed view of one habit
#[derive(Debug, Serialize)]
pub struct HabitDetailResponse {
    pub habit: HabitView,
    pub stage: &'static GrowthStage,
    pub next_stage: Option<&'static GrowthStage>,
    pub days_to_next_stage: Option<u32>,
    pub total_completions: u32,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// Look up a habit and describe where it stands
pub fn get_habit<S: HabitStorage>(
    storage: &S,
    evaluator: &StreakEvaluator,
    now: DateTime<Utc>,
    params: GetHabitParams,
) -> Result<HabitDetailResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let habit = storage.get_habit(&habit_id)?;
    let last_completed_at = storage.latest_log(&habit_id)?.map(|log| log.completed_at);
    let total_completions = storage.count_logs(&habit_id)?;

    let view = HabitView::new(&habit, last_completed_at, evaluator, now);
    let stage = habit.stage();
    let next_stage = habit.growth_stage().next().map(|s| s.metadata());
    let remaining = days_to_next_stage(habit.current_streak);

    let mut message = format!("{}\n{}", view.headline(), stage.description);
    match (next_stage, remaining) {
        (Some(next), Some(n)) => message.push_str(&format!(
            " {} more to reach {} {}.",
            days(n),
            next.icon,
            next.name
        )),
        _ => message.push_str(" 🌲 Fully grown!"),
    }
    message.push('\n');
    message.push_str(&motivational_message(habit.current_streak));
    if view.streak_broken {
        message.push_str("\n⚠️ This streak lapsed and will be reset on the next refresh.");
    }

    Ok(HabitDetailResponse {
        habit: view,
        stage,
        next_stage,
        days_to_next_stage: remaining,
        total_completions,
        created_at: habit.created_at,
        message,
    })
}
