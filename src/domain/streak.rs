/// Streak evaluation
///
/// This module decides how a habit's streak responds to a new verification
/// and to the passage of time. Everything here is pure: callers supply the
/// last completion instant and "now", and get back a decision. Applying the
/// decision (writing logs, resetting streaks) is the orchestrator's job.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::Serialize;

use crate::domain::{stage_for_streak, StageIndex};

/// Where a habit sits in the streak lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "streak", rename_all = "snake_case")]
pub enum StreakState {
    /// Never completed, or reset back to zero
    Fresh,
    /// Completed today or yesterday with a running streak
    Active(u32),
    /// Last completion is two or more days old; the stored streak is stale
    Broken(u32),
}

/// Result of asking whether a verification may be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Accepted(StreakUpdate),
    /// A completion was already recorded on the current calendar day
    RejectedAlreadyDone,
}

/// New streak values after an accepted verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakUpdate {
    /// Streak the verification builds on (0 if a pending reset was applied)
    pub previous_streak: u32,
    pub new_streak: u32,
    pub new_longest: u32,
    pub previous_stage: StageIndex,
    pub new_stage: StageIndex,
    /// True when the stored streak was stale and had to restart from zero
    pub restarted: bool,
}

impl StreakUpdate {
    pub fn stage_changed(&self) -> bool {
        self.previous_stage != self.new_stage
    }
}

/// Result of checking a habit for a broken streak before display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub reset_needed: bool,
    pub new_streak: u32,
    pub new_stage: StageIndex,
}

/// Calendar-day streak rules in a fixed reference timezone
///
/// All "today" / "yesterday" decisions compare calendar days (year, month,
/// day) in `offset`, never elapsed hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakEvaluator {
    offset: FixedOffset,
}

impl Default for StreakEvaluator {
    fn default() -> Self {
        Self::utc()
    }
}

impl StreakEvaluator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Evaluator that uses UTC calendar days
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar day of an instant in the reference timezone
    pub fn calendar_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Whether the last completion falls on the same calendar day as `reference`
    pub fn is_completed_on_date(
        &self,
        last_completed_at: Option<DateTime<Utc>>,
        reference: DateTime<Utc>,
    ) -> bool {
        last_completed_at
            .is_some_and(|last| self.calendar_day(last) == self.calendar_day(reference))
    }

    /// Whether the last completion falls on the calendar day before `reference`
    pub fn is_completed_yesterday(
        &self,
        last_completed_at: Option<DateTime<Utc>>,
        reference: DateTime<Utc>,
    ) -> bool {
        let Some(last) = last_completed_at else {
            return false;
        };
        self.calendar_day(reference)
            .pred_opt()
            .is_some_and(|yesterday| self.calendar_day(last) == yesterday)
    }

    /// Whether at least one full calendar day was skipped since the last completion
    ///
    /// A habit that was never completed is not broken, it just hasn't started.
    pub fn is_streak_broken(
        &self,
        last_completed_at: Option<DateTime<Utc>>,
        reference: DateTime<Utc>,
    ) -> bool {
        let Some(last) = last_completed_at else {
            return false;
        };
        let gap = self.calendar_day(reference) - self.calendar_day(last);
        gap.num_days() >= 2
    }

    /// Streak after one more completed day
    pub fn next_streak(current_streak: u32) -> u32 {
        current_streak.saturating_add(1)
    }

    /// Classify a habit from its stored streak and last completion
    pub fn classify(
        &self,
        last_completed_at: Option<DateTime<Utc>>,
        current_streak: u32,
        now: DateTime<Utc>,
    ) -> StreakState {
        if self.is_streak_broken(last_completed_at, now) {
            if current_streak == 0 {
                StreakState::Fresh
            } else {
                StreakState::Broken(current_streak)
            }
        } else if current_streak == 0 || last_completed_at.is_none() {
            StreakState::Fresh
        } else {
            StreakState::Active(current_streak)
        }
    }

    /// Decide whether a new verification is accepted and compute the new streak
    ///
    /// A stale streak (last completion two or more days ago) that was not yet
    /// reset restarts from zero, so the update never extends a broken run.
    pub fn evaluate_verification(
        &self,
        last_completed_at: Option<DateTime<Utc>>,
        current_streak: u32,
        longest_streak: u32,
        now: DateTime<Utc>,
    ) -> VerificationOutcome {
        if self.is_completed_on_date(last_completed_at, now) {
            return VerificationOutcome::RejectedAlreadyDone;
        }

        let restarted = current_streak > 0 && self.is_streak_broken(last_completed_at, now);
        let base = if restarted { 0 } else { current_streak };
        let new_streak = Self::next_streak(base);

        VerificationOutcome::Accepted(StreakUpdate {
            previous_streak: base,
            new_streak,
            new_longest: longest_streak.max(new_streak),
            previous_stage: stage_for_streak(base),
            new_stage: stage_for_streak(new_streak),
            restarted,
        })
    }

    /// Decide whether a habit's stored streak must be reset to zero
    pub fn evaluate_list_refresh(
        &self,
        last_completed_at: Option<DateTime<Utc>>,
        current_streak: u32,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        let reset_needed = current_streak > 0 && self.is_streak_broken(last_completed_at, now);
        let new_streak = if reset_needed { 0 } else { current_streak };

        RefreshOutcome {
            reset_needed,
            new_streak,
            new_stage: stage_for_streak(new_streak),
        }
    }
}

/// Encouraging one-liner for a streak length
pub fn motivational_message(current_streak: u32) -> String {
    match current_streak {
        0 => "Ready to plant a seed! Every journey begins with a single step.".to_string(),
        1 => "Great start! One day down, keep the momentum going.".to_string(),
        2..=6 => format!("Nice work! {} days in a row. Your habit is taking root.", current_streak),
        7..=13 => format!("Excellent! {} days strong. You're in the groove now!", current_streak),
        14..=29 => format!("Amazing! {} days straight. This is becoming second nature.", current_streak),
        _ => format!("Incredible! {} days of consistency. Your habit is a tree now!", current_streak),
    }
}
