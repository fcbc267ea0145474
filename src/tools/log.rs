/// Tools for recording and retracting habit completions
///
/// This module implements the habit_log and habit_unlog MCP tools.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::{CalendarDate, DomainError, Habit, UserId};
use crate::storage::HabitStorage;
use crate::tools::{parse_date_or, parse_habit_id, ToolError};

/// Parameters for logging or un-logging a completion
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompletionParams {
    pub habit_id: String,
    /// Day of the completion, YYYY-MM-DD (defaults to today)
    #[serde(default)]
    pub date: Option<String>,
}

/// Mark a habit as completed on a day
///
/// Logging a day that is already recorded leaves the habit unchanged.
/// Completions can't be logged for days after `today`.
pub fn log_habit<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: CompletionParams,
    today: CalendarDate,
) -> Result<Habit, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let date = parse_date_or(params.date.as_deref(), today)?;

    if date > today {
        return Err(DomainError::InvalidDate(format!(
            "Cannot log habits for future dates ({})",
            date
        ))
        .into());
    }

    let habit = storage.add_completion(user_id, &habit_id, date)?;
    tracing::info!("Logged completion of habit {} on {}", habit_id, date);
    Ok(habit)
}

/// Remove a recorded completion
pub fn unlog_habit<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: CompletionParams,
    today: CalendarDate,
) -> Result<Habit, ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    let date = parse_date_or(params.date.as_deref(), today)?;

    let habit = storage.remove_completion(user_id, &habit_id, date)?;
    tracing::info!("Removed completion of habit {} on {}", habit_id, date);
    Ok(habit)
}
