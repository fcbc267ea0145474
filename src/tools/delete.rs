/// Tool for deleting habits

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::UserId;
use crate::storage::HabitStorage;
use crate::tools::{parse_habit_id, ToolError};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteHabitParams {
    pub habit_id: String,
}

/// Permanently delete a habit together with its completion history
pub fn delete_habit<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: DeleteHabitParams,
) -> Result<(), ToolError> {
    let habit_id = parse_habit_id(&params.habit_id)?;
    storage.delete_habit(user_id, &habit_id)?;

    tracing::info!("Deleted habit {} for user {}", habit_id, user_id);
    Ok(())
}
