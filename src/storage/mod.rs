/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits, their completion
/// dates and categories. Every operation is scoped to a single user.

pub mod schema;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use thiserror::Error;

use crate::domain::{CalendarDate, Category, CategoryId, Frequency, Habit, HabitId, UserId};

/// Default number of habits per page when listing
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: String },

    #[error("Category with this name already exists: {name}")]
    DuplicateCategory { name: String },
}

/// Which categories a habit listing should include
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// No category restriction
    #[default]
    Any,
    /// Only habits without a category
    Uncategorized,
    /// Only habits filed under this category
    Only(CategoryId),
}

/// Filtering and pagination options for listing habits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitFilter {
    pub category: CategoryFilter,
    pub frequency: Option<Frequency>,
    /// Case-insensitive substring match on the title
    pub search: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
}

impl Default for HabitFilter {
    fn default() -> Self {
        Self {
            category: CategoryFilter::Any,
            frequency: None,
            search: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl HabitFilter {
    /// Every habit of the user on a single page
    pub fn unbounded() -> Self {
        Self {
            limit: u32::MAX,
            ..Self::default()
        }
    }

    /// Rows to skip for the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }
}

/// One page of habits plus the number of habits matching the filter
#[derive(Debug, Clone, PartialEq)]
pub struct HabitPage {
    pub habits: Vec<Habit>,
    pub total: u64,
}

/// Trait defining the storage interface for habits and categories
///
/// This trait allows us to swap out SQLite for other databases while keeping
/// the same interface. Lookups by id never cross user boundaries: a habit
/// owned by someone else is reported as not found.
pub trait HabitStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit, including its completion dates
    fn get_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Persist title, frequency and category changes
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Permanently delete a habit and its completions
    fn delete_habit(&self, user_id: &UserId, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List habits with filtering and pagination, newest first
    fn list_habits(&self, user_id: &UserId, filter: &HabitFilter) -> Result<HabitPage, StorageError>;

    /// Every habit of a user, newest first
    fn all_habits(&self, user_id: &UserId) -> Result<Vec<Habit>, StorageError> {
        Ok(self.list_habits(user_id, &HabitFilter::unbounded())?.habits)
    }

    /// Record a completion date; recording an existing date is a no-op
    fn add_completion(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        date: CalendarDate,
    ) -> Result<Habit, StorageError>;

    /// Remove a completion date if present
    fn remove_completion(
        &self,
        user_id: &UserId,
        habit_id: &HabitId,
        date: CalendarDate,
    ) -> Result<Habit, StorageError>;

    /// Create a new category
    fn create_category(&self, category: &Category) -> Result<(), StorageError>;

    /// Get a category by ID
    fn get_category(&self, user_id: &UserId, category_id: &CategoryId) -> Result<Category, StorageError>;

    /// All categories of a user, ordered by name
    fn list_categories(&self, user_id: &UserId) -> Result<Vec<Category>, StorageError>;

    /// Persist name and color changes
    fn update_category(&self, category: &Category) -> Result<(), StorageError>;

    /// Delete a category and detach it from every habit that used it
    fn delete_category(&self, user_id: &UserId, category_id: &CategoryId) -> Result<(), StorageError>;
}
