/// Tool for verifying habit completions
///
/// This module implements the habit_verify MCP tool: check that the habit
/// was not already verified today, record the evidence, and grow the streak.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::domain::{
    CompletionLog, StreakEvaluator, Verification, VerificationKind, VerificationOutcome,
};
use crate::storage::{HabitStorage, StorageError};
use crate::tools::{days, parse_habit_id, HabitView, ToolError};

/// Parameters for verifying a habit
#[derive(Debug, Deserialize)]
pub struct VerifyHabitParams {
    pub habit_id: String,
    /// "photo" or "text" ("note" is accepted too)
    pub verification_type: String,
    /// Image URL for photo verification
    #[serde(default)]
    pub image_url: Option<String>,
    /// Evidence text for text verification
    #[serde(default)]
    pub text: Option<String>,
    /// Optional note attached to any verification
    #[serde(default)]
    pub note: Option<String>,
}

/// Response from verifying a habit
#[derive(Debug, Serialize)]
pub struct VerifyHabitResponse {
    pub success: bool,
    pub habit: HabitView,
    pub log_id: String,
    pub streak_increased: bool,
    /// The stored streak was stale and restarted from zero
    pub streak_restarted: bool,
    pub previous_growth_stage: u8,
    pub new_growth_stage: u8,
    pub message: String,
}

/// Turn the raw parameters into validated evidence
///
/// A text verification without `text` falls back to `note`, matching clients
/// that only send a note. The second value is the note left to store next to
/// the evidence, which is `None` once the note became the evidence.
fn build_verification(
    params: VerifyHabitParams,
) -> Result<(Verification, Option<String>), ToolError> {
    match VerificationKind::parse(&params.verification_type)? {
        VerificationKind::Photo => {
            let url = params.image_url.as_deref().ok_or_else(|| {
                ToolError::InvalidInput("Photo verification requires image_url".to_string())
            })?;
            Ok((Verification::photo(url)?, params.note))
        }
        VerificationKind::Text => match params.text.as_deref() {
            Some(text) => Ok((Verification::text(text)?, params.note)),
            None => {
                let text = params.note.as_deref().unwrap_or_default();
                Ok((Verification::text(text)?, None))
            }
        },
    }
}

/// Verify a habit completion using the provided storage
pub fn verify_habit<S: HabitStorage>(
    storage: &S,
    evaluator: &StreakEvaluator,
    now: DateTime<Utc>,
    params: VerifyHabitParams,
) -> Result<VerifyHabitResponse, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let (verification, note) = build_verification(params)?;

    let mut habit = storage.get_habit(&habit_id)?;
    let last_completed_at = storage.latest_log(&habit_id)?.map(|log| log.completed_at);

    let update = match evaluator.evaluate_verification(
        last_completed_at,
        habit.current_streak,
        habit.longest_streak,
        now,
    ) {
        VerificationOutcome::Accepted(update) => update,
        VerificationOutcome::RejectedAlreadyDone => {
            tracing::info!("Rejected verification for habit {}: already completed today", habit_id);
            return Err(ToolError::AlreadyCompletedToday {
                habit_id: habit_id.to_string(),
            });
        }
    };

    let log = CompletionLog::new(habit_id.clone(), now, verification, note)?;
    habit.apply_streak_update(&update, now);

    // The unique (habit, day) index catches a concurrent verification that
    // slipped past the check above
    match storage.record_verification(&habit, &log, evaluator.calendar_day(now)) {
        Ok(()) => {}
        Err(StorageError::DuplicateEntry { .. }) => {
            tracing::warn!("Concurrent verification for habit {} lost the race", habit_id);
            return Err(ToolError::AlreadyCompletedToday {
                habit_id: habit_id.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        "Verified habit {} via {}: streak {} -> {}",
        habit_id,
        log.kind(),
        update.previous_streak,
        update.new_streak
    );

    let view = HabitView::new(&habit, Some(log.completed_at), evaluator, now);
    let mut message = format!(
        "🔥 Verified '{}'! Current streak: {}",
        habit.name,
        days(update.new_streak)
    );
    if update.restarted {
        message.push_str("\nYour previous streak had lapsed, so a new one starts today.");
    }
    if update.stage_changed() {
        let stage = update.new_stage.metadata();
        message.push_str(&format!(
            "\n{} Your habit grew into a {}! {}",
            stage.icon, stage.name, stage.description
        ));
    }

    Ok(VerifyHabitResponse {
        success: true,
        log_id: log.id.to_string(),
        streak_increased: true,
        streak_restarted: update.restarted,
        previous_growth_stage: update.previous_stage.value(),
        new_growth_stage: update.new_stage.value(),
        habit: view,
        message,
    })
}
