/// Tool for creating new habits
///
/// This module implements the habit_create MCP tool.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::{Frequency, Habit, UserId};
use crate::storage::HabitStorage;
use crate::tools::{parse_category_id, ToolError};

/// Parameters for creating a new habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateHabitParams {
    /// Habit title, 1-100 characters
    pub title: String,
    /// "daily" or "weekly" (defaults to daily)
    #[serde(default)]
    pub frequency: Option<String>,
    /// Category to file the habit under (optional)
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Create a new habit using the provided storage
///
/// The category, when given, must be one of the caller's own categories.
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: CreateHabitParams,
) -> Result<Habit, ToolError> {
    let frequency = match params.frequency.as_deref() {
        Some(raw) => raw.parse::<Frequency>()?,
        None => Frequency::default(),
    };

    let category_id = match params.category_id.as_deref() {
        Some(raw) => {
            let id = parse_category_id(raw)?;
            storage.get_category(user_id, &id)?;
            Some(id)
        }
        None => None,
    };

    let habit = Habit::new(*user_id, &params.title, frequency, category_id)?;
    storage.create_habit(&habit)?;

    tracing::info!("Created habit '{}' ({}) for user {}", habit.title, habit.id, user_id);
    Ok(habit)
}
