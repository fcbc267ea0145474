/// MCP tools for habit management
///
/// This module contains all the tools that external clients can call to
/// interact with the habit tracker. Each tool takes the calling user's id,
/// already verified by the auth layer, and never touches another user's data.

pub mod categories;
pub mod create;
pub mod delete;
pub mod list;
pub mod log;
pub mod stats;
pub mod update;

// Re-export tool functions for easy access
pub use categories::*;
pub use create::*;
pub use delete::*;
pub use list::*;
pub use log::*;
pub use stats::*;
pub use update::*;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::domain::{CalendarDate, CategoryId, DomainError, HabitId};
use crate::storage::StorageError;

/// Length of the default reporting window, counted back from today
pub const TRAILING_WINDOW_DAYS: u32 = 30;

/// Errors a tool call can fail with
#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: &'static str, message: String },
}

/// Default `[today - 30 days, today]` window
pub fn trailing_window(today: CalendarDate) -> (CalendarDate, CalendarDate) {
    (today.minus_days(TRAILING_WINDOW_DAYS), today)
}

/// Parse a habit id argument; malformed ids can't name an existing habit
pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ToolError> {
    HabitId::from_string(raw).map_err(|_| {
        StorageError::HabitNotFound {
            habit_id: raw.to_string(),
        }
        .into()
    })
}

pub(crate) fn parse_category_id(raw: &str) -> Result<CategoryId, ToolError> {
    CategoryId::from_string(raw).map_err(|_| {
        StorageError::CategoryNotFound {
            category_id: raw.to_string(),
        }
        .into()
    })
}

/// Parse an optional date argument, falling back to `default`
pub(crate) fn parse_date_or(raw: Option<&str>, default: CalendarDate) -> Result<CalendarDate, ToolError> {
    match raw {
        Some(s) => Ok(CalendarDate::parse(s.trim())?),
        None => Ok(default),
    }
}

/// Distinguishes an absent field from an explicit `null`
///
/// Used with `#[serde(default)]` so that a missing field becomes `None` and
/// `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
