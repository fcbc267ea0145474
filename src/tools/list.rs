/// Tool for listing habits
///
/// This module implements the habit_list MCP tool. Every listed habit carries
/// its statistics over the trailing 30-day window.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, CategoryId, Frequency, Habit, StatsEngine, StatsResult, UserId};
use crate::storage::{CategoryFilter, HabitFilter, HabitStorage, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::tools::{trailing_window, ToolError};

/// Parameters for listing habits
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListHabitsParams {
    /// Only habits in this category; "null" lists uncategorized habits
    #[serde(default)]
    pub category_id: Option<String>,
    /// "daily" or "weekly"
    #[serde(default)]
    pub frequency: Option<String>,
    /// Case-insensitive title search
    #[serde(default)]
    pub search: Option<String>,
    /// Page number starting at 1 (default 1)
    #[serde(default)]
    pub page: Option<u32>,
    /// Habits per page, 1-100 (default 10)
    #[serde(default)]
    pub limit: Option<u32>,
}

/// A habit together with its trailing-window statistics
#[derive(Debug, Serialize)]
pub struct HabitWithStats {
    #[serde(flatten)]
    pub habit: Habit,
    pub stats: StatsResult,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

/// Response from listing habits
#[derive(Debug, Serialize)]
pub struct ListHabitsResponse {
    pub habits: Vec<HabitWithStats>,
    pub pagination: Pagination,
}

/// List the caller's habits using the provided storage
pub fn list_habits<S: HabitStorage>(
    storage: &S,
    engine: &StatsEngine,
    user_id: &UserId,
    params: ListHabitsParams,
    today: CalendarDate,
) -> Result<ListHabitsResponse, ToolError> {
    let filter = build_filter(params)?;
    let page = storage.list_habits(user_id, &filter)?;
    let (start, end) = trailing_window(today);

    let habits = page
        .habits
        .into_iter()
        .map(|habit| {
            let stats = habit.stats(engine, start, end);
            HabitWithStats { habit, stats }
        })
        .collect();

    let limit = u64::from(filter.limit);
    Ok(ListHabitsResponse {
        habits,
        pagination: Pagination {
            total: page.total,
            page: filter.page,
            limit: filter.limit,
            pages: page.total.div_ceil(limit),
        },
    })
}

/// Turn raw tool arguments into a validated storage filter
fn build_filter(params: ListHabitsParams) -> Result<HabitFilter, ToolError> {
    let category = match params.category_id.as_deref().map(str::trim) {
        None | Some("") => CategoryFilter::Any,
        Some("null") | Some("none") => CategoryFilter::Uncategorized,
        Some(raw) => {
            let id = CategoryId::from_string(raw).map_err(|e| ToolError::InvalidArgument {
                name: "category_id",
                message: e.to_string(),
            })?;
            CategoryFilter::Only(id)
        }
    };

    let frequency = params
        .frequency
        .as_deref()
        .map(str::parse::<Frequency>)
        .transpose()?;

    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(ToolError::InvalidArgument {
            name: "page",
            message: "Page numbers start at 1".to_string(),
        });
    }

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ToolError::InvalidArgument {
            name: "limit",
            message: format!("Limit must be between 1 and {}", MAX_PAGE_SIZE),
        });
    }

    Ok(HabitFilter {
        category,
        frequency,
        search: params.search,
        page,
        limit,
    })
}
