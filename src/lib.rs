/// Public library interface for the Habit Garden MCP server
///
/// A habit grows from a seed into a tree as its daily streak gets longer.
/// This module exports the server and the public types used by the binary
/// and by the test suites.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;

pub mod domain;
pub mod mcp;
pub mod storage;
pub mod tools;

// Re-export public modules and types
pub use domain::*;
pub use mcp::McpServer;
pub use storage::{HabitStorage, SqliteStorage, StorageError};
pub use tools::ToolError;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit garden state shared by every tool call
///
/// Holds the SQLite storage, the streak evaluator for the configured
/// reference timezone, and the clock that decides what "now" is.
pub struct HabitGardenServer {
    storage: SqliteStorage,
    evaluator: StreakEvaluator,
    clock: Arc<dyn Clock>,
}

impl HabitGardenServer {
    /// Open (or create) the database at `db_path`
    pub fn new(db_path: impl AsRef<Path>, offset: FixedOffset) -> Result<Self, ServerError> {
        let db_path = db_path.as_ref();
        tracing::info!(
            "Initializing Habit Garden server with database {:?}, reference offset {}",
            db_path,
            offset
        );

        let storage = SqliteStorage::new(db_path)?;
        Self::with_storage(storage, offset)
    }

    /// Server backed by a throwaway in-memory database
    pub fn in_memory(offset: FixedOffset) -> Result<Self, ServerError> {
        Self::with_storage(SqliteStorage::in_memory()?, offset)
    }

    /// Stored calendar days are re-keyed if the database was last used with
    /// another offset
    fn with_storage(storage: SqliteStorage, offset: FixedOffset) -> Result<Self, ServerError> {
        let evaluator = StreakEvaluator::new(offset);
        storage.ensure_reference_offset(&evaluator)?;
        Ok(Self {
            storage,
            evaluator,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the system clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn evaluator(&self) -> &StreakEvaluator {
        &self.evaluator
    }

    /// Current instant according to the configured clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Reset every lapsed streak as of now
    pub fn refresh_streaks(&self) -> Result<tools::RefreshResponse, ToolError> {
        tools::refresh_streaks(&self.storage, &self.evaluator, self.now())
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Lapsed streaks are reset once before the first request is served.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let sweep = self.refresh_streaks()?;
        tracing::info!(
            "Server started successfully, found {} existing habits ({} streaks reset)",
            sweep.checked,
            sweep.reset.len()
        );

        let mut mcp_server = McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }
}
