/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits, completions and categories. It handles all SQL
/// queries and the conversion between rows and domain types.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};

use crate::domain::{CalendarDate, Category, CategoryId, Frequency, Habit, HabitId, UserId};
use crate::storage::{schema, CategoryFilter, HabitFilter, HabitPage, HabitStorage, StorageError};

const HABIT_COLUMNS: &str = "id, user_id, title, frequency, category_id, created_at";
const CATEGORY_COLUMNS: &str = "id, user_id, name, color, created_at";

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStorage trait.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open (or create) the database file and make sure the schema exists
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db_path = db_path.as_ref();
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::with_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {}", db_path.display());
        Ok(storage)
    }

    /// Private in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        // Needed for ON DELETE CASCADE / SET NULL
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        schema::initialize_database(&conn)?;
        Ok(Self { conn })
    }

    /// Load a habit row without its completions
    fn find_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1 AND user_id = ?2", HABIT_COLUMNS);
        self.conn
            .query_row(&sql, params![habit_id, user_id], habit_from_row)
            .optional()?
            .ok_or_else(|| StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            })
    }

    fn load_completions(&self, habit_id: &HabitId) -> Result<BTreeSet<CalendarDate>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT completed_on FROM habit_completions WHERE habit_id = ?1")?;
        let dates = stmt
            .query_map(params![habit_id], |row| row.get::<_, CalendarDate>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(dates)
    }

    fn with_completions(&self, mut habit: Habit) -> Result<Habit, StorageError> {
        habit.completion_dates = self.load_completions(&habit.id)?;
        Ok(habit)
    }
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO habits (id, user_id, title, frequency, category_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                habit.id,
                habit.user_id,
                habit.title,
                habit.frequency,
                habit.category_id,
                habit.created_at
            ],
        )?;

        for date in &habit.completion_dates {
            tx.execute(
                "INSERT OR IGNORE INTO habit_completions (habit_id, completed_on) VALUES (?1, ?2)",
                params![habit.id, date],
            )?;
        }

        tx.commit()?;
        tracing::debug!("Created habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn get_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let habit = self.find_habit(user_id, habit_id)?;
        self.with_completions(habit)
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habits SET
                title = ?3,
                frequency = ?4,
                category_id = ?5
             WHERE id = ?1 AND user_id = ?2",
            params![
                habit.id,
                habit.user_id,
                habit.title,
                habit.frequency,
                habit.category_id
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    fn delete_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
            params![habit_id, user_id],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    fn list_habits(&self, user_id: &UserId, filter: &HabitFilter) -> Result<HabitPage, StorageError> {
        let mut clauses = vec!["user_id = ?".to_string()];
        let mut values: Vec<Box<dyn ToSql>> = vec![Box::new(*user_id)];

        match filter.category {
            CategoryFilter::Any => {}
            CategoryFilter::Uncategorized => clauses.push("category_id IS NULL".to_string()),
            CategoryFilter::Only(category_id) => {
                clauses.push("category_id = ?".to_string());
                values.push(Box::new(category_id));
            }
        }

        if let Some(frequency) = filter.frequency {
            clauses.push("frequency = ?".to_string());
            values.push(Box::new(frequency));
        }

        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            clauses.push("LOWER(title) LIKE ? ESCAPE '\\'".to_string());
            values.push(Box::new(format!("%{}%", escape_like(&search.to_lowercase()))));
        }

        let where_sql = clauses.join(" AND ");

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM habits WHERE {}", where_sql),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let limit = i64::from(filter.limit);
        let offset = i64::try_from(filter.offset()).unwrap_or(i64::MAX);
        values.push(Box::new(limit));
        values.push(Box::new(offset));

        let sql = format!(
            "SELECT {} FROM habits WHERE {} ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
            HABIT_COLUMNS, where_sql
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let habits = rows
            .into_iter()
            .map(|habit| self.with_completions(habit))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HabitPage {
            habits,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    fn add_completion(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        date: CalendarDate,
    ) -> Result<Habit, StorageError> {
        let habit = self.find_habit(user_id, habit_id)?;

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO habit_completions (habit_id, completed_on) VALUES (?1, ?2)",
            params![habit_id, date],
        )?;
        if inserted == 0 {
            tracing::debug!("Habit {} already completed on {}", habit_id, date);
        }

        self.with_completions(habit)
    }

    fn remove_completion(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        date: CalendarDate,
    ) -> Result<Habit, StorageError> {
        let habit = self.find_habit(user_id, habit_id)?;

        self.conn.execute(
            "DELETE FROM habit_completions WHERE habit_id = ?1 AND completed_on = ?2",
            params![habit_id, date],
        )?;

        self.with_completions(habit)
    }

    fn create_category(&self, category: &Category) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO categories (id, user_id, name, color, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    category.id,
                    category.user_id,
                    category.name,
                    category.color,
                    category.created_at
                ],
            )
            .map_err(|e| duplicate_name_or(e, &category.name))?;

        tracing::debug!("Created category: {} ({})", category.name, category.id);
        Ok(())
    }

    fn get_category(&self, user_id: &UserId, category_id: &CategoryId) -> Result<Category, StorageError> {
        let sql = format!("SELECT {} FROM categories WHERE id = ?1 AND user_id = ?2", CATEGORY_COLUMNS);
        self.conn
            .query_row(&sql, params![category_id, user_id], category_from_row)
            .optional()?
            .ok_or_else(|| StorageError::CategoryNotFound {
                category_id: category_id.to_string(),
            })
    }

    fn list_categories(&self, user_id: &UserId) -> Result<Vec<Category>, StorageError> {
        let sql = format!(
            "SELECT {} FROM categories WHERE user_id = ?1 ORDER BY name COLLATE NOCASE",
            CATEGORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let categories = stmt
            .query_map(params![user_id], category_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    fn update_category(&self, category: &Category) -> Result<(), StorageError> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE categories SET name = ?3, color = ?4 WHERE id = ?1 AND user_id = ?2",
                params![category.id, category.user_id, category.name, category.color],
            )
            .map_err(|e| duplicate_name_or(e, &category.name))?;

        if rows_affected == 0 {
            return Err(StorageError::CategoryNotFound {
                category_id: category.id.to_string(),
            });
        }

        tracing::debug!("Updated category: {} ({})", category.name, category.id);
        Ok(())
    }

    fn delete_category(&self, user_id: &UserId, category_id: &CategoryId) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let detached = tx.execute(
            "UPDATE habits SET category_id = NULL WHERE category_id = ?1 AND user_id = ?2",
            params![category_id, user_id],
        )?;

        let deleted = tx.execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            params![category_id, user_id],
        )?;

        if deleted == 0 {
            // Dropping the transaction rolls the detach back
            return Err(StorageError::CategoryNotFound {
                category_id: category_id.to_string(),
            });
        }

        tx.commit()?;
        tracing::debug!("Deleted category {} and detached {} habits", category_id, detached);
        Ok(())
    }
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit::from_existing(
        row.get(0)?, // id
        row.get(1)?, // user_id
        row.get(2)?, // title
        row.get(3)?, // frequency
        row.get(4)?, // category_id
        BTreeSet::new(),
        row.get(5)?, // created_at
    ))
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category::from_existing(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

/// Map a unique-constraint failure on a category name to `DuplicateCategory`
fn duplicate_name_or(error: rusqlite::Error, name: &str) -> StorageError {
    match error {
        rusqlite::Error::SqliteFailure(ref failure, _) if failure.code == ErrorCode::ConstraintViolation => {
            StorageError::DuplicateCategory {
                name: name.to_string(),
            }
        }
        other => StorageError::Query(other),
    }
}

/// Escape LIKE wildcards so user input only ever matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Store a domain value as its canonical text form
macro_rules! text_column {
    ($ty:ty, $parse:expr) => {
        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.to_string()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let raw = value.as_str()?;
                ($parse)(raw).map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_column!(HabitId, HabitId::from_string);
text_column!(CategoryId, CategoryId::from_string);
text_column!(UserId, UserId::from_string);
text_column!(CalendarDate, CalendarDate::parse);
text_column!(Frequency, |raw: &str| raw.parse::<Frequency>());
