/// Public library interface for the habit statistics MCP server
///
/// This module exports the server, the domain model with its statistics
/// engine, the storage layer and the tools, so that other applications and
/// tests can drive them directly.

use std::path::PathBuf;
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
    Database(#[from] storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit statistics server behind the MCP tool surface
///
/// Owns the SQLite-backed store and the statistics engine configured for
/// this deployment.
pub struct HabitTrackerServer {
    storage: SqliteStorage,
    engine: StatsEngine,
}

impl HabitTrackerServer {
    /// Create a server with the database at `db_path`
    ///
    /// The schema is created on first use.
    pub async fn new(db_path: PathBuf, engine: StatsEngine) -> Result<Self, ServerError> {
        tracing::info!("Initializing habit stats server with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;
        Ok(Self::with_storage(storage, engine))
    }

    /// Create a server around an already opened store
    pub fn with_storage(storage: SqliteStorage, engine: StatsEngine) -> Self {
        tracing::debug!("Weekly completion policy: {:?}", engine.weekly_policy());
        Self { storage, engine }
    }

    /// Run the MCP server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Returns once stdin is closed.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting MCP server...");

        let mut mcp_server = McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn engine(&self) -> &StatsEngine {
        &self.engine
    }
}
