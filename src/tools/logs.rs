/// Tool for reading a habit's completion history
///
/// This module implements the habit_logs MCP tool.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::StreakEvaluator;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, ToolError};

const DEFAULT_LOG_LIMIT: u32 = 30;
const MAX_LOG_LIMIT: u32 = 365;

#[derive(Debug, Deserialize)]
pub struct HabitLogsParams {
    pub habit_id: String,
    /// Defaults to 30, at most 365
    #[serde(default)]
    pub limit: Option<u32>,
}

/// One completion as clients see it
#[derive(Debug, Serialize)]
pub struct LogEntryView {
    pub log_id: String,
    pub completed_at: DateTime<Utc>,
    /// Calendar day of the completion in the reference timezone
    pub day: NaiveDate,
    pub verification_type: &'static str,
    pub image_url: Option<String>,
    pub text: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HabitLogsResponse {
    pub habit_id: String,
    pub habit_name: String,
    pub logs: Vec<LogEntryView>,
    pub message: String,
}

/// Completion logs of a habit, newest first
pub fn habit_logs<S: HabitStorage>(
    storage: &S,
    evaluator: &StreakEvaluator,
    params: HabitLogsParams,
) -> Result<HabitLogsResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let limit = match params.limit {
        Some(0) => return Err(ToolError::InvalidInput("limit must be at least 1".to_string())),
        Some(n) => n.min(MAX_LOG_LIMIT),
        None => DEFAULT_LOG_LIMIT,
    };

    let habit = storage.get_habit(&habit_id)?;
    let logs: Vec<LogEntryView> = storage
        .logs_for_habit(&habit_id, Some(limit))?
        .into_iter()
        .map(|log| LogEntryView {
            log_id: log.id.to_string(),
            day: evaluator.calendar_day(log.completed_at),
            completed_at: log.completed_at,
            verification_type: log.kind().as_str(),
            image_url: log.verification.image_url().map(str::to_string),
            text: log.verification.text_evidence().map(str::to_string),
            note: log.note,
        })
        .collect();

    let message = if logs.is_empty() {
        format!("No completions recorded for '{}' yet.", habit.name)
    } else {
        let lines = logs
            .iter()
            .map(|l| {
                let icon = if l.image_url.is_some() { "📷" } else { "📝" };
                match l.note.as_deref() {
                    Some(note) => format!("{} {} - {}", icon, l.day, note),
                    None => format!("{} {}", icon, l.day),
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("Recent completions of '{}':\n{}", habit.name, lines)
    };

    Ok(HabitLogsResponse {
        habit_id: habit_id.to_string(),
        habit_name: habit.name,
        logs,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Habit;
    use crate::storage::SqliteStorage;
    use crate::tools::{verify_habit, VerifyHabitParams};
    use chrono::{Duration, TimeZone};

    fn seed_days(storage: &SqliteStorage, habit: &Habit, start: DateTime<Utc>, count: i64) {
        for day in 0..count {
            verify_habit(
                storage,
                &StreakEvaluator::utc(),
                start + Duration::days(day),
                VerifyHabitParams {
                    habit_id: habit.id.to_string(),
                    verification_type: "text".to_string(),
                    image_url: None,
                    text: Some(format!("day {}", day)),
                    note: None,
                },
            ).unwrap();
        }
    }

    #[test]
    fn test_logs_newest_first_with_limit() {
        let storage = SqliteStorage::in_memory().unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 7, 30, 0).unwrap();
        let habit = Habit::new("Journal".to_string(), None, start).unwrap();
        storage.create_habit(&habit).unwrap();
        seed_days(&storage, &habit, start, 5);

        let response = habit_logs(
            &storage,
            &StreakEvaluator::utc(),
            HabitLogsParams { habit_id: habit.id.to_string(), limit: Some(2) },
        ).unwrap();

        assert_eq!(response.logs.len(), 2);
        assert_eq!(response.logs[0].day, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(response.logs[1].day, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(response.logs[0].verification_type, "text");
        assert_eq!(response.logs[0].text.as_deref(), Some("day 4"));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let storage = SqliteStorage::in_memory().unwrap();
        let habit = Habit::new("Journal".to_string(), None, Utc::now()).unwrap();
        storage.create_habit(&habit).unwrap();

        let result = habit_logs(
            &storage,
            &StreakEvaluator::utc(),
            HabitLogsParams { habit_id: habit.id.to_string(), limit: Some(0) },
        );
        assert!(matches!(result, Err(ToolError::InvalidInput(_))));
    }
}
