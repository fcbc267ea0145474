/// Completion statistics for a habit over a reporting window
///
/// Given a habit's frequency, its completion dates and an inclusive
/// `[start, end]` window, the engine works out how many occurrences were
/// expected, how many were completed, the resulting percentage and the
/// streak ending at the latest completion. Results are derived on every
/// request and never stored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{CalendarDate, DomainError, Frequency};

/// Progress figures for one habit over one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResult {
    /// Occurrences expected in the window (days or 7-day periods)
    pub total: u32,
    /// Completions credited in the window
    pub completed: u32,
    /// `completed / total` as a half-up rounded percentage, 0 for an empty window
    pub percentage: u32,
    /// Length of the unbroken run ending at the latest completion in the window
    pub streak: u32,
}

/// How completions of a weekly habit are credited
///
/// `RawCount` credits every completed date in the window, so a habit done
/// twice in one week counts twice. `DistinctWeeks` splits the window into
/// 7-day buckets starting at `start` and credits at most one completion per
/// bucket, which keeps `completed <= total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeeklyCompletionPolicy {
    #[default]
    RawCount,
    DistinctWeeks,
}

/// Stateless statistics calculator
///
/// The engine only carries its configuration, so one instance can be shared
/// freely between callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsEngine {
    weekly_policy: WeeklyCompletionPolicy,
}

impl StatsEngine {
    /// Create an engine with the given weekly crediting policy
    pub fn new(weekly_policy: WeeklyCompletionPolicy) -> Self {
        Self { weekly_policy }
    }

    pub fn weekly_policy(&self) -> WeeklyCompletionPolicy {
        self.weekly_policy
    }

    /// Compute statistics for one habit over `[start, end]`
    ///
    /// Duplicate dates are tolerated and counted once. A window whose start
    /// lies after its end is empty: every figure is zero.
    pub fn compute_stats<'a, I>(
        &self,
        frequency: Frequency,
        completion_dates: I,
        start: CalendarDate,
        end: CalendarDate,
    ) -> StatsResult
    where
        I: IntoIterator<Item = &'a CalendarDate>,
    {
        let in_window: BTreeSet<CalendarDate> = completion_dates
            .into_iter()
            .filter(|date| start <= **date && **date <= end)
            .copied()
            .collect();

        let total = expected_occurrences(frequency, start, end);
        let completed = match (frequency, self.weekly_policy) {
            (Frequency::Weekly, WeeklyCompletionPolicy::DistinctWeeks) => in_window
                .iter()
                .map(|date| start.days_until(*date) / 7)
                .collect::<BTreeSet<_>>()
                .len() as u32,
            _ => in_window.len() as u32,
        };

        StatsResult {
            total,
            completed,
            percentage: rounded_percentage(u64::from(completed), u64::from(total)),
            streak: calculate_streak(&in_window, frequency),
        }
    }

    /// String-boundary variant of [`StatsEngine::compute_stats`]
    ///
    /// Parses every input first and fails on the first malformed value, so
    /// nothing is silently coerced.
    pub fn compute_stats_raw<S: AsRef<str>>(
        &self,
        frequency: &str,
        completion_dates: &[S],
        start: &str,
        end: &str,
    ) -> Result<StatsResult, DomainError> {
        let frequency: Frequency = frequency.parse()?;
        let start = CalendarDate::parse(start)?;
        let end = CalendarDate::parse(end)?;
        let dates = completion_dates
            .iter()
            .map(|raw| CalendarDate::parse(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.compute_stats(frequency, &dates, start, end))
    }
}

/// Number of occurrences a habit is expected to hit in `[start, end]`
///
/// Daily habits expect one per calendar day; weekly habits one per started
/// 7-day period.
pub fn expected_occurrences(frequency: Frequency, start: CalendarDate, end: CalendarDate) -> u32 {
    let span = start.days_until(end);
    if span < 0 {
        return 0;
    }

    let days = span + 1;
    let occurrences = match frequency {
        Frequency::Daily => days,
        Frequency::Weekly => (days + 6) / 7,
    };
    u32::try_from(occurrences).unwrap_or(u32::MAX)
}

/// Length of the run ending at the latest date in `dates`
///
/// Walking back from the latest date, a daily habit needs the previous date
/// to be exactly one day earlier; a weekly habit accepts any gap of up to
/// seven days. The run does not have to reach today.
pub fn calculate_streak<'a, I>(dates: I, frequency: Frequency) -> u32
where
    I: IntoIterator<Item = &'a CalendarDate>,
{
    let sorted: BTreeSet<CalendarDate> = dates.into_iter().copied().collect();

    let mut descending = sorted.iter().rev();
    let mut anchor = match descending.next() {
        Some(latest) => *latest,
        None => return 0,
    };

    let mut streak = 1;
    for previous in descending {
        let gap = previous.days_until(anchor);
        let extends = match frequency {
            Frequency::Daily => gap == 1,
            Frequency::Weekly => gap <= 7,
        };
        if !extends {
            break;
        }
        streak += 1;
        anchor = *previous;
    }

    streak
}

/// Whether a streak ending at `latest` is still alive on `today`
///
/// This is separate from [`calculate_streak`]: a daily streak stays alive if
/// the last completion was today or yesterday, a weekly one if it was within
/// the past seven days.
pub fn is_streak_active(latest: Option<CalendarDate>, frequency: Frequency, today: CalendarDate) -> bool {
    match latest {
        None => false,
        Some(last) => {
            let days_since = last.days_until(today);
            (0..=frequency.period_days()).contains(&days_since)
        }
    }
}

/// Half-up integer percentage of `part / whole`, 0 when `whole` is 0
pub fn rounded_percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part + whole) / (2 * whole);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Cross-habit totals for one user and one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_habits: u32,
    /// Mean of the per-habit percentages, half-up rounded
    pub average_completion: u32,
    pub best_streak: u32,
    pub total_completed: u32,
    pub total_possible: u32,
}

impl StatsSummary {
    /// Reduce a set of per-habit results into totals
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a StatsResult>,
    {
        let mut summary = Self::default();
        let mut percentage_sum: u64 = 0;

        for result in results {
            summary.total_habits += 1;
            summary.best_streak = summary.best_streak.max(result.streak);
            summary.total_completed += result.completed;
            summary.total_possible += result.total;
            percentage_sum += u64::from(result.percentage);
        }

        summary.average_completion = rounded_percentage(percentage_sum, u64::from(summary.total_habits) * 100);
        summary
    }
}
