/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data conversion.

use std::path::Path;
use rusqlite::{params, Connection, OptionalExtension, Row};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

use crate::domain::{
    CompletionLog, Habit, HabitId, LogId, StreakEvaluator, Verification, VerificationKind,
};
use crate::storage::{migrations, HabitStorage, StorageError};

const HABIT_COLUMNS: &str =
    "id, name, description, current_streak, longest_streak, created_at, updated_at";

const LOG_COLUMNS: &str =
    "id, habit_id, completed_at, verification_type, verification_data, verification_image_url, note";

/// `settings` key of the offset that `habit_logs.completed_day` is computed in
const REFERENCE_OFFSET_KEY: &str = "reference_offset";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {}", db_path.display());
        Ok(storage)
    }

    /// Open a private in-memory database (handy for tests)
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open in-memory database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        // Deleting a habit relies on ON DELETE CASCADE for its logs
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Bring stored calendar days in line with the evaluator's reference offset
    ///
    /// The offset the days were computed in is kept in `settings`. When it
    /// differs, every log's `completed_day` is recomputed in one transaction.
    /// If two logs of one habit fall on the same day under the new offset the
    /// switch fails with `OffsetConflict` and nothing is changed.
    pub fn ensure_reference_offset(&self, evaluator: &StreakEvaluator) -> Result<(), StorageError> {
        let offset = evaluator.offset();
        let stored = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![REFERENCE_OFFSET_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .map(|value| {
                value.parse::<FixedOffset>().map_err(|e| StorageError::CorruptRow {
                    table: "settings",
                    message: format!("invalid reference offset '{}': {}", value, e),
                })
            })
            .transpose()?;

        if stored == Some(offset) {
            return Ok(());
        }

        let tx = self.conn.unchecked_transaction()?;

        let logs: Vec<(String, String, String)> = {
            let mut stmt = tx.prepare("SELECT id, habit_id, completed_at FROM habit_logs")?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
            let logs = rows.collect::<Result<Vec<_>, _>>()?;
            logs
        };

        // Park every row on a unique placeholder first so re-keying in any
        // order only trips the unique index on a real clash
        tx.execute("UPDATE habit_logs SET completed_day = id", [])?;

        for (id, habit_id, completed_at) in &logs {
            let day = evaluator.calendar_day(parse_timestamp("habit_logs", completed_at)?);
            tx.execute(
                "UPDATE habit_logs SET completed_day = ?2 WHERE id = ?1",
                params![id, day.to_string()],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StorageError::OffsetConflict {
                        offset: offset.to_string(),
                        habit_id: habit_id.clone(),
                        date: day.to_string(),
                    }
                } else {
                    StorageError::Query(e)
                }
            })?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![REFERENCE_OFFSET_KEY, offset.to_string()],
        )?;
        tx.commit()?;

        match stored {
            Some(previous) => tracing::warn!(
                "Reference offset changed from {} to {}, recomputed the calendar day of {} logs",
                previous,
                offset,
                logs.len()
            ),
            None => tracing::info!("Reference offset set to {} ({} logs)", offset, logs.len()),
        }
        Ok(())
    }

    /// Translate constraint failures on log insertion into domain-level errors
    fn map_log_insert_error(err: rusqlite::Error, habit_id: &HabitId, day: NaiveDate) -> StorageError {
        match err {
            ref e if is_unique_violation(e) => {
                StorageError::DuplicateEntry {
                    habit_id: habit_id.to_string(),
                    date: day.to_string(),
                }
            }
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                StorageError::HabitNotFound {
                    habit_id: habit_id.to_string(),
                }
            }
            other => StorageError::Query(other),
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Timestamps are stored as fixed-width RFC 3339 in UTC so text order is time order
fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(table: &'static str, value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow {
            table,
            message: format!("invalid timestamp '{}': {}", value, e),
        })
}

/// Raw `habits` row before conversion into a domain object
struct HabitRow {
    id: String,
    name: String,
    description: Option<String>,
    current_streak: u32,
    longest_streak: u32,
    created_at: String,
    updated_at: String,
}

impl HabitRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            current_streak: row.get(3)?,
            longest_streak: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_habit(self) -> Result<Habit, StorageError> {
        let id = HabitId::from_string(&self.id).map_err(|e| StorageError::CorruptRow {
            table: "habits",
            message: format!("invalid id '{}': {}", self.id, e),
        })?;

        Ok(Habit::from_existing(
            id,
            self.name,
            self.description,
            self.current_streak,
            self.longest_streak,
            parse_timestamp("habits", &self.created_at)?,
            parse_timestamp("habits", &self.updated_at)?,
        ))
    }
}

/// Raw `habit_logs` row before conversion into a domain object
struct LogRow {
    id: String,
    habit_id: String,
    completed_at: String,
    verification_type: String,
    verification_data: Option<String>,
    verification_image_url: Option<String>,
    note: Option<String>,
}

impl LogRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            completed_at: row.get(2)?,
            verification_type: row.get(3)?,
            verification_data: row.get(4)?,
            verification_image_url: row.get(5)?,
            note: row.get(6)?,
        })
    }

    fn into_log(self) -> Result<CompletionLog, StorageError> {
        let corrupt = |message: String| StorageError::CorruptRow {
            table: "habit_logs",
            message,
        };

        let id = LogId::from_string(&self.id)
            .map_err(|e| corrupt(format!("invalid id '{}': {}", self.id, e)))?;
        let habit_id = HabitId::from_string(&self.habit_id)
            .map_err(|e| corrupt(format!("invalid habit id '{}': {}", self.habit_id, e)))?;
        let completed_at = parse_timestamp("habit_logs", &self.completed_at)?;

        let kind = VerificationKind::parse(&self.verification_type)
            .map_err(|e| corrupt(e.to_string()))?;
        let verification = match kind {
            VerificationKind::Photo => Verification::Photo {
                image_url: self
                    .verification_image_url
                    .ok_or_else(|| corrupt(format!("photo log {} has no image URL", id)))?,
            },
            VerificationKind::Text => Verification::Text {
                text: self
                    .verification_data
                    .ok_or_else(|| corrupt(format!("text log {} has no text", id)))?,
            },
        };

        Ok(CompletionLog::from_existing(
            id,
            habit_id,
            completed_at,
            verification,
            self.note,
        ))
    }
}

impl HabitStorage for SqliteStorage {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO habits (
                id, name, description, current_streak, longest_streak, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                habit.current_streak,
                habit.longest_streak,
                format_timestamp(&habit.created_at),
                format_timestamp(&habit.updated_at),
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![habit_id.to_string()], HabitRow::from_row)
            .optional()?;

        match row {
            Some(row) => row.into_habit(),
            None => Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            }),
        }
    }

    /// Update name and description of an existing habit
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                name = ?2,
                description = ?3,
                updated_at = ?4
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.description,
                format_timestamp(&habit.updated_at),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Delete a habit; its logs go with it through ON DELETE CASCADE
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    /// List all habits, newest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habits ORDER BY created_at DESC, rowid DESC",
            HABIT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], HabitRow::from_row)?;

        let mut habits = Vec::new();
        for row in rows {
            habits.push(row?.into_habit()?);
        }

        Ok(habits)
    }

    fn latest_log(&self, habit_id: &HabitId) -> Result<Option<CompletionLog>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_logs WHERE habit_id = ?1
             ORDER BY completed_at DESC, rowid DESC LIMIT 1",
            LOG_COLUMNS
        );
        self.conn
            .query_row(&sql, params![habit_id.to_string()], LogRow::from_row)
            .optional()?
            .map(LogRow::into_log)
            .transpose()
    }

    fn count_logs(&self, habit_id: &HabitId) -> Result<u32, StorageError> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM habit_logs WHERE habit_id = ?1",
            params![habit_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn logs_for_habit(
        &self,
        habit_id: &HabitId,
        limit: Option<u32>,
    ) -> Result<Vec<CompletionLog>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habit_logs WHERE habit_id = ?1
             ORDER BY completed_at DESC, rowid DESC LIMIT ?2",
            LOG_COLUMNS
        );
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map_or(-1, i64::from);

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![habit_id.to_string(), limit], LogRow::from_row)?;

        let mut logs = Vec::new();
        for row in rows {
            logs.push(row?.into_log()?);
        }

        Ok(logs)
    }

    fn record_verification(
        &self,
        habit: &Habit,
        log: &CompletionLog,
        day: NaiveDate,
    ) -> Result<(), StorageError> {
        // Dropping the transaction without commit rolls everything back
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO habit_logs (
                id, habit_id, completed_at, completed_day, verification_type,
                verification_data, verification_image_url, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                log.id.to_string(),
                log.habit_id.to_string(),
                format_timestamp(&log.completed_at),
                day.to_string(),
                log.kind().as_str(),
                log.verification.text_evidence(),
                log.verification.image_url(),
                log.note,
            ],
        )
        .map_err(|e| Self::map_log_insert_error(e, &log.habit_id, day))?;

        let rows_affected = tx.execute(
            "UPDATE habits SET
                current_streak = ?2,
                longest_streak = ?3,
                updated_at = ?4
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.current_streak,
                habit.longest_streak,
                format_timestamp(&habit.updated_at),
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tx.commit()?;

        tracing::debug!(
            "Recorded {} verification {} for habit {} on {} (streak {})",
            log.kind(),
            log.id,
            habit.id,
            day,
            habit.current_streak
        );
        Ok(())
    }

    fn reset_streak(&self, habit_id: &HabitId, at: DateTime<Utc>) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET current_streak = 0, updated_at = ?2 WHERE id = ?1",
            params![habit_id.to_string(), format_timestamp(&at)],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Reset streak for habit: {}", habit_id);
        Ok(())
    }
}
