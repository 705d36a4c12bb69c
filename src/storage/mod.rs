/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits and completion logs.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use crate::domain::{CompletionLog, Habit, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Duplicate entry: habit {habit_id} already verified on {date}")]
    DuplicateEntry { habit_id: String, date: String },

    #[error("Cannot switch reference offset to {offset}: habit {habit_id} would have two completions on {date}")]
    OffsetConflict { habit_id: String, date: String, offset: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits
///
/// This trait allows us to potentially swap out SQLite for other databases
/// in the future while keeping the same interface.
pub trait HabitStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Save name and description changes of an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit together with all of its logs
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List all habits, newest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Most recent completion log of a habit, if any
    fn latest_log(&self, habit_id: &HabitId) -> Result<Option<CompletionLog>, StorageError>;

    /// Number of completion logs of a habit
    fn count_logs(&self, habit_id: &HabitId) -> Result<u32, StorageError>;

    /// Completion logs of a habit, newest first
    fn logs_for_habit(
        &self,
        habit_id: &HabitId,
        limit: Option<u32>,
    ) -> Result<Vec<CompletionLog>, StorageError>;

    /// Atomically insert a log and store the habit's new streak values
    ///
    /// `day` is the log's calendar day in the reference timezone. A second
    /// log for the same habit and day fails with `DuplicateEntry` and leaves
    /// the habit untouched.
    fn record_verification(
        &self,
        habit: &Habit,
        log: &CompletionLog,
        day: NaiveDate,
    ) -> Result<(), StorageError>;

    /// Set a habit's current streak to zero. Resetting twice is harmless.
    fn reset_streak(&self, habit_id: &HabitId, at: DateTime<Utc>) -> Result<(), StorageError>;
}
