/// Database schema setup
///
/// This module creates the SQLite tables and indexes the storage layer needs.
/// Every statement is idempotent, so it is safe to run on each start.

use rusqlite::Connection;

use crate::storage::StorageError;

/// Create all required tables and indexes if they don't exist
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (user_id, name)
        );

        CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            frequency TEXT NOT NULL CHECK (frequency IN ('daily', 'weekly')),
            category_id TEXT REFERENCES categories (id) ON DELETE SET NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habit_completions (
            habit_id TEXT NOT NULL REFERENCES habits (id) ON DELETE CASCADE,
            completed_on TEXT NOT NULL,
            PRIMARY KEY (habit_id, completed_on)
        );",
    )?;

    create_indexes(conn)?;

    tracing::info!("Database schema ready");
    Ok(())
}

/// Create the indexes backing the common lookups
fn create_indexes(conn: &Connection) -> Result<(), StorageError> {
    // Listing a user's habits, newest first
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_user_created
         ON habits (user_id, created_at)",
        [],
    )?;

    // Filtering by category and un-linking on category delete
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_habits_category
         ON habits (category_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_categories_user
         ON categories (user_id)",
        [],
    )?;

    Ok(())
}
