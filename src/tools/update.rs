/// Tool for updating existing habits
///
/// This module implements the habit_update MCP tool to modify the title,
/// frequency or category of a habit.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::{Frequency, Habit, UserId};
use crate::storage::HabitStorage;
use crate::tools::{double_option, parse_category_id, parse_habit_id, ToolError};

/// Parameters for updating an existing habit
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateHabitParams {
    pub habit_id: String,
    #[serde(default)]
    pub title: Option<String>,
    /// "daily" or "weekly"
    #[serde(default)]
    pub frequency: Option<String>,
    /// New category; pass null to make the habit uncategorized
    #[serde(default, deserialize_with = "double_option")]
    #[schemars(with = "Option<String>")]
    pub category_id: Option<Option<String>>,
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: UpdateHabitParams,
) -> Result<Habit, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let mut habit = storage.get_habit(user_id, &habit_id)?;

    let frequency = params
        .frequency
        .as_deref()
        .map(str::parse::<Frequency>)
        .transpose()?;

    let category_id = match params.category_id {
        Some(Some(raw)) => {
            let id = parse_category_id(&raw)?;
            storage.get_category(user_id, &id)?;
            Some(Some(id))
        }
        Some(None) => Some(None),
        None => None,
    };

    habit.update(params.title.as_deref(), frequency, category_id)?;
    storage.update_habit(&habit)?;

    tracing::info!("Updated habit '{}' ({})", habit.title, habit.id);
    Ok(habit)
}
