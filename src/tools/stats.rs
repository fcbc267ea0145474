/// Tool for habit statistics over a reporting window
///
/// This module implements the habit_stats MCP tool: per-habit progress plus
/// totals across all of the caller's habits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, Frequency, HabitId, StatsEngine, StatsResult, StatsSummary, UserId};
use crate::storage::HabitStorage;
use crate::tools::{parse_date_or, trailing_window, ToolError};

/// Parameters for the statistics report
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct StatsParams {
    /// First day of the window, YYYY-MM-DD (defaults to 30 days ago)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last day of the window, YYYY-MM-DD (defaults to today)
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Statistics for one habit
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatsEntry {
    pub id: HabitId,
    pub title: String,
    pub frequency: Frequency,
    pub stats: StatsResult,
}

/// The inclusive window a report covers
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start: CalendarDate,
    pub end: CalendarDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub habits: Vec<HabitStatsEntry>,
    pub total: StatsSummary,
    pub period: ReportPeriod,
}

/// Build a statistics report for every habit the caller owns
pub fn habit_stats<S: HabitStorage>(
    storage: &S,
    engine: &StatsEngine,
    user_id: &UserId,
    params: StatsParams,
    today: CalendarDate,
) -> Result<StatsReport, ToolError> {
    let (default_start, default_end) = trailing_window(today);
    let start = parse_date_or(params.start_date.as_deref(), default_start)?;
    let end = parse_date_or(params.end_date.as_deref(), default_end)?;

    if start > end {
        tracing::debug!("Inverted stats window {}..{}, reporting zeros", start, end);
    }

    let habits: Vec<HabitStatsEntry> = storage
        .all_habits(user_id)?
        .into_iter()
        .map(|habit| {
            let stats = habit.stats(engine, start, end);
            HabitStatsEntry {
                id: habit.id,
                title: habit.title,
                frequency: habit.frequency,
                stats,
            }
        })
        .collect();

    let total = StatsSummary::from_results(habits.iter().map(|entry| &entry.stats));
    tracing::info!(
        "Computed stats for {} habits of user {} over {}..{}",
        habits.len(),
        user_id,
        start,
        end
    );

    Ok(StatsReport {
        habits,
        total,
        period: ReportPeriod { start, end },
    })
}
