/// CompletionLog entity for recording verified completions
///
/// Every accepted verification produces exactly one log. Logs are never
/// edited afterwards; the newest one decides streak continuity.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, HabitId, LogId, Verification, VerificationKind};

const MAX_NOTE_LEN: usize = 500;

/// A verified completion of a habit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionLog {
    /// Unique identifier for this log
    pub id: LogId,
    /// Which habit was completed
    pub habit_id: HabitId,
    /// When the completion was verified
    pub completed_at: DateTime<Utc>,
    /// Photo URL or note text proving the completion
    pub verification: Verification,
    /// Optional free-text note, independent of the verification kind
    pub note: Option<String>,
}

impl CompletionLog {
    /// Create a new log with validation
    pub fn new(
        habit_id: HabitId,
        completed_at: DateTime<Utc>,
        verification: Verification,
        note: Option<String>,
    ) -> Result<Self, DomainError> {
        let note = Self::validate_note(note)?;

        Ok(Self {
            id: LogId::new(),
            habit_id,
            completed_at,
            verification,
            note,
        })
    }

    /// Create a log from existing data (used when loading from database)
    pub fn from_existing(
        id: LogId,
        habit_id: HabitId,
        completed_at: DateTime<Utc>,
        verification: Verification,
        note: Option<String>,
    ) -> Self {
        Self {
            id,
            habit_id,
            completed_at,
            verification,
            note,
        }
    }

    pub fn kind(&self) -> VerificationKind {
        self.verification.kind()
    }

    fn validate_note(note: Option<String>) -> Result<Option<String>, DomainError> {
        let Some(text) = note else {
            return Ok(None);
        };
        let trimmed = text.trim();

        if trimmed.chars().count() > MAX_NOTE_LEN {
            return Err(DomainError::Validation {
                message: format!("Notes cannot be longer than {} characters", MAX_NOTE_LEN),
            });
        }

        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}
