/// Scenario and property checks for the statistics engine
use habit_stats_server::*;

fn date(raw: &str) -> CalendarDate {
    CalendarDate::parse(raw).expect("valid date")
}

/// Consecutive days ending at `end`, oldest first
fn run_ending(end: &str, days: u32) -> Vec<CalendarDate> {
    let end = date(end);
    (0..days).rev().map(|back| end.minus_days(back)).collect()
}

#[test]
fn test_consecutive_daily_run() {
    let engine = StatsEngine::default();
    let stats = engine
        .compute_stats_raw("daily", &["2024-01-01", "2024-01-02"], "2024-01-01", "2024-01-02")
        .unwrap();

    assert_eq!(stats, StatsResult { total: 2, completed: 2, percentage: 100, streak: 2 });
}

#[test]
fn test_gap_breaks_daily_streak() {
    let engine = StatsEngine::default();
    let stats = engine
        .compute_stats_raw("daily", &["2024-01-01", "2024-01-03"], "2024-01-01", "2024-01-03")
        .unwrap();

    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 2);
    assert_eq!(stats.percentage, 67);
    assert_eq!(stats.streak, 1);
}

#[test]
fn test_weekly_seven_day_gap_extends_streak() {
    let dates = [date("2024-01-01"), date("2024-01-08")];
    assert_eq!(calculate_streak(&dates, Frequency::Weekly), 2);

    let broken = [date("2024-01-01"), date("2024-01-09")];
    assert_eq!(calculate_streak(&broken, Frequency::Weekly), 1);
}

#[test]
fn test_unsupported_frequency_and_bad_dates_fail() {
    let engine = StatsEngine::default();
    let no_dates: [&str; 0] = [];

    assert!(matches!(
        engine.compute_stats_raw("monthly", &no_dates, "2024-01-01", "2024-01-31"),
        Err(DomainError::UnsupportedFrequency(_))
    ));
    assert!(matches!(
        engine.compute_stats_raw("daily", &["2024-13-01"], "2024-01-01", "2024-01-31"),
        Err(DomainError::InvalidDateFormat(_))
    ));
    assert!(matches!(
        engine.compute_stats_raw("daily", &no_dates, "2024-01-01", "Jan 31"),
        Err(DomainError::InvalidDateFormat(_))
    ));
}

#[test]
fn test_single_day_window() {
    let engine = StatsEngine::default();
    let stats = engine
        .compute_stats_raw("daily", &["2024-05-05"], "2024-05-05", "2024-05-05")
        .unwrap();

    assert_eq!(stats, StatsResult { total: 1, completed: 1, percentage: 100, streak: 1 });
}

#[test]
fn test_empty_completions_give_expected_totals() {
    let engine = StatsEngine::default();
    let none: Vec<CalendarDate> = Vec::new();

    for (frequency, expected_total) in [(Frequency::Daily, 31), (Frequency::Weekly, 5)] {
        let stats = engine.compute_stats(frequency, &none, date("2024-01-01"), date("2024-01-31"));
        assert_eq!(
            stats,
            StatsResult { total: expected_total, completed: 0, percentage: 0, streak: 0 }
        );
    }
}

#[test]
fn test_full_daily_run_is_complete() {
    let engine = StatsEngine::default();

    for days in [1, 7, 30, 366] {
        let dates = run_ending("2024-12-31", days);
        let start = dates[0];
        let stats = engine.compute_stats(Frequency::Daily, &dates, start, date("2024-12-31"));
        assert_eq!(stats.percentage, 100);
        assert_eq!(stats.streak, stats.total);
    }
}

#[test]
fn test_prepending_a_day_grows_streak_by_one() {
    let mut dates = run_ending("2024-06-30", 3);
    let before = calculate_streak(&dates, Frequency::Daily);

    dates.insert(0, date("2024-06-27"));
    assert_eq!(calculate_streak(&dates, Frequency::Daily), before + 1);
}

#[test]
fn test_duplicates_do_not_change_the_result() {
    let engine = StatsEngine::default();
    let start = date("2024-02-01");
    let end = date("2024-02-29");

    let dates = vec![date("2024-02-10"), date("2024-02-11")];
    let mut with_duplicates = dates.clone();
    with_duplicates.push(date("2024-02-11"));
    with_duplicates.push(date("2024-02-10"));

    assert_eq!(
        engine.compute_stats(Frequency::Daily, &dates, start, end),
        engine.compute_stats(Frequency::Daily, &with_duplicates, start, end)
    );
}

#[test]
fn test_weekly_policies_differ_only_on_shared_weeks() {
    let raw = StatsEngine::default();
    let distinct = StatsEngine::new(WeeklyCompletionPolicy::DistinctWeeks);
    let dates = [date("2024-01-01"), date("2024-01-03"), date("2024-01-09")];
    let start = date("2024-01-01");
    let end = date("2024-01-14");

    let raw_stats = raw.compute_stats(Frequency::Weekly, &dates, start, end);
    assert_eq!(raw_stats.completed, 3);
    assert_eq!(raw_stats.percentage, 150);

    let distinct_stats = distinct.compute_stats(Frequency::Weekly, &dates, start, end);
    assert_eq!(distinct_stats.completed, 2);
    assert_eq!(distinct_stats.percentage, 100);
    assert_eq!(distinct_stats.streak, raw_stats.streak);

    // Daily habits ignore the weekly policy
    assert_eq!(
        raw.compute_stats(Frequency::Daily, &dates, start, end),
        distinct.compute_stats(Frequency::Daily, &dates, start, end)
    );
}

#[test]
fn test_summary_over_habits() {
    let results = [
        StatsResult { total: 31, completed: 31, percentage: 100, streak: 31 },
        StatsResult { total: 31, completed: 10, percentage: 32, streak: 4 },
        StatsResult { total: 5, completed: 0, percentage: 0, streak: 0 },
    ];

    let summary = StatsSummary::from_results(&results);
    assert_eq!(summary.total_habits, 3);
    assert_eq!(summary.average_completion, 44);
    assert_eq!(summary.best_streak, 31);
    assert_eq!(summary.total_completed, 41);
    assert_eq!(summary.total_possible, 67);
}
