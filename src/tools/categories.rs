/// Tools for managing habit categories
///
/// This module implements category_create, category_list, category_update
/// and category_delete. Deleting a category keeps its habits and leaves them
/// uncategorized.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::domain::{Category, UserId};
use crate::storage::HabitStorage;
use crate::tools::{parse_category_id, ToolError};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateCategoryParams {
    /// Category name, 1-50 characters, unique per user
    pub name: String,
    /// Hex color such as "#4CAF50"
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateCategoryParams {
    pub category_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Parameters naming a single category
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CategoryRefParams {
    pub category_id: String,
}

/// No parameters besides the caller's identity
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListCategoriesParams {}

pub fn create_category<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: CreateCategoryParams,
) -> Result<Category, ToolError> {
    let category = Category::new(*user_id, &params.name, params.color.as_deref())?;
    storage.create_category(&category)?;

    tracing::info!("Created category '{}' ({}) for user {}", category.name, category.id, user_id);
    Ok(category)
}

/// The caller's categories ordered by name
pub fn list_categories<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    _params: ListCategoriesParams,
) -> Result<Vec<Category>, ToolError> {
    Ok(storage.list_categories(user_id)?)
}

pub fn update_category<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: UpdateCategoryParams,
) -> Result<Category, ToolError> {
    let category_id = parse_category_id(&params.category_id)?;
    let mut category = storage.get_category(user_id, &category_id)?;

    category.update(params.name.as_deref(), params.color.as_deref())?;
    storage.update_category(&category)?;

    tracing::info!("Updated category '{}' ({})", category.name, category.id);
    Ok(category)
}

/// Delete a category; its habits become uncategorized
pub fn delete_category<S: HabitStorage>(
    storage: &S,
    user_id: &UserId,
    params: CategoryRefParams,
) -> Result<(), ToolError> {
    let category_id = parse_category_id(&params.category_id)?;
    storage.delete_category(user_id, &category_id)?;

    tracing::info!("Deleted category {} for user {}", category_id, user_id);
    Ok(())
}
