/// Serializable snapshot of a habit as clients see it

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Habit, StreakEvaluator, StreakState};

/// A habit with its derived growth data and today's status
#[derive(Debug, Clone, Serialize)]
pub struct HabitView {
    pub habit_id: String,
    pub name: String,
    pub description: Option<String>,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub growth_stage: u8,
    pub stage_name: &'static str,
    pub stage_icon: &'static str,
    pub stage_color: &'static str,
    pub progress_to_next_stage: u8,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub completed_today: bool,
    /// Streak is stale and will be reset by the next refresh sweep
    pub streak_broken: bool,
}

impl HabitView {
    pub fn new(
        habit: &Habit,
        last_completed_at: Option<DateTime<Utc>>,
        evaluator: &StreakEvaluator,
        now: DateTime<Utc>,
    ) -> Self {
        let stage = habit.stage();
        Self {
            habit_id: habit.id.to_string(),
            name: habit.name.clone(),
            description: habit.description.clone(),
            current_streak: habit.current_streak,
            longest_streak: habit.longest_streak,
            growth_stage: habit.growth_stage().value(),
            stage_name: stage.name,
            stage_icon: stage.icon,
            stage_color: stage.color,
            progress_to_next_stage: habit.progress_to_next_stage(),
            last_completed_at,
            completed_today: evaluator.is_completed_on_date(last_completed_at, now),
            streak_broken: matches!(
                evaluator.classify(last_completed_at, habit.current_streak, now),
                StreakState::Broken(_)
            ),
        }
    }

    /// One-line summary used in text responses
    pub fn headline(&self) -> String {
        format!(
            "{} {} ({}) | 🔥 Streak: {} | 🏆 Best: {} | {}% to next stage{}",
            self.stage_icon,
            self.name,
            self.stage_name,
            super::days(self.current_streak),
            super::days(self.longest_streak),
            self.progress_to_next_stage,
            if self.completed_today { " | ✅ done today" } else { "" },
        )
    }
}
