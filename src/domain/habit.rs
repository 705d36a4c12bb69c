/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents something the
/// user wants to do every day, along with its validation rules and the only
/// two ways its streak may change: an accepted verification or a reset.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{
    progress_to_next_stage, stage_for_streak, DomainError, GrowthStage, HabitId, StageIndex,
    StreakUpdate,
};

const MAX_NAME_LEN: usize = 100;
const MAX_DESCRIPTION_LEN: usize = 500;

/// A habit the user verifies once per calendar day
///
/// The growth stage is not a field: it is always derived from
/// `current_streak` so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// Consecutive calendar days with a verified completion
    pub current_streak: u32,
    /// Best streak ever achieved, never below `current_streak`
    pub longest_streak: u32,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    /// Last time any field changed
    pub updated_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// New habits start as a seed: no streak, no history.
    pub fn new(
        name: String,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(&name)?;
        let description = Self::validate_description(description)?;

        Ok(Self {
            id: HabitId::new(),
            name,
            description,
            current_streak: 0,
            longest_streak: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// A stored longest streak below the current one is lifted to match.
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        current_streak: u32,
        longest_streak: u32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            current_streak,
            longest_streak: longest_streak.max(current_streak),
            created_at,
            updated_at,
        }
    }

    /// Update name and/or description with validation
    ///
    /// `description: Some(None)` clears the description.
    pub fn update(
        &mut self,
        name: Option<String>,
        description: Option<Option<String>>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        // Validate everything before touching self
        let name = name.map(|n| Self::validate_name(&n)).transpose()?;
        let description = description
            .map(Self::validate_description)
            .transpose()?;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_description) = description {
            self.description = new_description;
        }
        self.updated_at = now;

        Ok(())
    }

    /// Current growth stage, derived from the streak
    pub fn growth_stage(&self) -> StageIndex {
        stage_for_streak(self.current_streak)
    }

    /// Display data for the current growth stage
    pub fn stage(&self) -> &'static GrowthStage {
        self.growth_stage().metadata()
    }

    pub fn progress_to_next_stage(&self) -> u8 {
        progress_to_next_stage(self.current_streak)
    }

    /// Apply the result of an accepted verification
    pub fn apply_streak_update(&mut self, update: &StreakUpdate, now: DateTime<Utc>) {
        self.current_streak = update.new_streak;
        self.longest_streak = self.longest_streak.max(update.new_longest);
        self.updated_at = now;
    }

    // Validation helper methods

    /// Validate habit name according to business rules, returning it trimmed
    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name is required".to_string()
            ));
        }

        if trimmed.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::InvalidHabitName(format!(
                "Habit name cannot be longer than {} characters",
                MAX_NAME_LEN
            )));
        }

        Ok(trimmed.to_string())
    }

    /// Validate optional description; blank descriptions become None
    fn validate_description(description: Option<String>) -> Result<Option<String>, DomainError> {
        let Some(desc) = description else {
            return Ok(None);
        };
        let trimmed = desc.trim();

        if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DomainError::Validation {
                message: format!(
                    "Description cannot be longer than {} characters",
                    MAX_DESCRIPTION_LEN
                ),
            });
        }

        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }
}
