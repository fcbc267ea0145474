/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, Category), the validated
/// value types they are built from, and the statistics engine that turns a
/// habit's completion dates into per-window progress figures.

pub mod category;
pub mod habit;
pub mod stats;
pub mod types;

// Re-export public types for easy access
pub use category::*;
pub use habit::*;
pub use stats::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid habit title: {0}")]
    InvalidHabitTitle(String),

    #[error("Invalid category name: {0}")]
    InvalidCategoryName(String),

    #[error("Invalid color '{0}': expected a hex code like #4CAF50")]
    InvalidColor(String),

    #[error("Invalid date format '{0}': expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Unsupported frequency '{0}': expected 'daily' or 'weekly'")]
    UnsupportedFrequency(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
