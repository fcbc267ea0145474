/// User-defined categories for grouping habits

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, DomainError, UserId};

/// Color assigned when a category is created without one
pub const DEFAULT_COLOR: &str = "#4CAF50";

/// Longest name a category may have, in characters
pub const MAX_NAME_LEN: usize = 50;

/// A named, colored bucket a user can file habits under
///
/// Names are unique per user; the storage layer enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserId,
    pub name: String,
    /// `#RRGGBB` hex color
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category, falling back to the default color
    pub fn new(user_id: UserId, name: &str, color: Option<&str>) -> Result<Self, DomainError> {
        let name = Self::validate_name(name)?;
        let color = match color {
            Some(c) => Self::validate_color(c)?,
            None => DEFAULT_COLOR.to_string(),
        };

        Ok(Self {
            id: CategoryId::new(),
            user_id,
            name,
            color,
            created_at: Utc::now(),
        })
    }

    /// Create a category from existing data (used when loading from database)
    pub fn from_existing(
        id: CategoryId,
        user_id: UserId,
        name: String,
        color: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            color,
            created_at,
        }
    }

    /// Rename and/or recolor; nothing is applied if either value is invalid
    pub fn update(&mut self, name: Option<&str>, color: Option<&str>) -> Result<(), DomainError> {
        let name = name.map(Self::validate_name).transpose()?;
        let color = color.map(Self::validate_color).transpose()?;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_color) = color {
            self.color = new_color;
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();
        let len = trimmed.chars().count();

        if len == 0 || len > MAX_NAME_LEN {
            return Err(DomainError::InvalidCategoryName(format!(
                "Name must be between 1 and {} characters",
                MAX_NAME_LEN
            )));
        }
        Ok(trimmed.to_string())
    }

    fn validate_color(color: &str) -> Result<String, DomainError> {
        let trimmed = color.trim();
        let valid = trimmed.len() == 7
            && trimmed.starts_with('#')
            && trimmed[1..].chars().all(|c| c.is_ascii_hexdigit());

        if !valid {
            return Err(DomainError::InvalidColor(color.to_string()));
        }
        Ok(trimmed.to_uppercase())
    }
}
