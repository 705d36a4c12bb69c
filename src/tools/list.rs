/// Tool for listing all habits
///
/// This module implements the habit_list MCP tool. Listing is read-only:
/// broken streaks are only flagged here, the reset itself is done by the
/// refresh sweep.

use chrono::{DateTime, Utc};
use serde::Serialize;
use crate::domain::StreakEvaluator;
use crate::storage::HabitStorage;
use crate::tools::{HabitView, ToolError};

/// Summary statistics for all habits
#[derive(Debug, Serialize)]
pub struct HabitListSummary {
    pub total_habits: u32,
    pub completed_today: u32,
    pub broken_streaks: u32,
    /// Number of habits in each growth stage, indexed by stage
    pub stage_counts: [u32; 5],
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitView>,
    pub summary: HabitListSummary,
    pub message: String,
}

/// List habits, newest first, with their latest completion
pub fn list_habits<S: HabitStorage>(
    storage: &S,
    evaluator: &StreakEvaluator,
    now: DateTime<Utc>,
) -> Result<ListHabitsResponse, ToolError> {
    let habits = storage.list_habits()?;

    let mut views = Vec::with_capacity(habits.len());
    for habit in &habits {
        let last_completed_at = storage.latest_log(&habit.id)?.map(|log| log.completed_at);
        views.push(HabitView::new(habit, last_completed_at, evaluator, now));
    }

    let mut stage_counts = [0u32; 5];
    for view in &views {
        stage_counts[usize::from(view.growth_stage)] += 1;
    }

    let summary = HabitListSummary {
        total_habits: views.len() as u32,
        completed_today: views.iter().filter(|v| v.completed_today).count() as u32,
        broken_streaks: views.iter().filter(|v| v.streak_broken).count() as u32,
        stage_counts,
    };

    let message = if views.is_empty() {
        "No habits found. Create your first habit to get started!".to_string()
    } else {
        let header = format!(
            "📋 Your garden ({} habits, {} done today)",
            summary.total_habits, summary.completed_today
        );
        let lines = views
            .iter()
            .map(|v| format!("{}\n   ID: {}", v.headline(), v.habit_id))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("{}\n\n{}", header, lines)
    };

    Ok(ListHabitsResponse {
        habits: views,
        summary,
        message,
    })
}
