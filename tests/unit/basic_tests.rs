/// Basic unit tests to verify core functionality
use habit_stats_server::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn date(raw: &str) -> CalendarDate {
        CalendarDate::parse(raw).expect("valid date")
    }

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new(UserId::new(), "  Test Habit ", Frequency::Daily, None);

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.title, "Test Habit");
        assert!(habit.completion_dates.is_empty());
    }

    #[test]
    fn test_habit_title_bounds() {
        assert!(matches!(
            Habit::new(UserId::new(), "   ", Frequency::Daily, None),
            Err(DomainError::InvalidHabitTitle(_))
        ));
        assert!(Habit::new(UserId::new(), &"x".repeat(100), Frequency::Weekly, None).is_ok());
        assert!(Habit::new(UserId::new(), &"x".repeat(101), Frequency::Weekly, None).is_err());
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!(" Weekly ".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!(matches!(
            "monthly".parse::<Frequency>(),
            Err(DomainError::UnsupportedFrequency(_))
        ));
    }

    #[test]
    fn test_calendar_date_is_strict() {
        assert!(CalendarDate::parse("2024-02-29").is_ok());
        for raw in ["2023-02-29", "2024-1-01", "2024/01/01", "01-01-2024", "", "2024-01-01T00:00"] {
            assert!(
                matches!(CalendarDate::parse(raw), Err(DomainError::InvalidDateFormat(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_toggle_completion() {
        let mut habit = Habit::new(UserId::new(), "Stretch", Frequency::Daily, None).unwrap();

        assert!(habit.toggle_completion(date("2024-04-01")));
        assert!(habit.is_completed_on(date("2024-04-01")));
        assert!(!habit.toggle_completion(date("2024-04-01")));
        assert!(habit.completion_dates.is_empty());
    }

    #[test]
    fn test_category_defaults() {
        let category = Category::new(UserId::new(), "Health", None).unwrap();
        assert_eq!(category.color, "#4CAF50");
        assert!(Category::new(UserId::new(), "Health", Some("#12345")).is_err());
    }

    #[test]
    fn test_streak_liveness_is_separate() {
        let latest = Some(date("2024-03-10"));

        assert!(is_streak_active(latest, Frequency::Daily, date("2024-03-11")));
        assert!(!is_streak_active(latest, Frequency::Daily, date("2024-03-12")));
        assert!(is_streak_active(latest, Frequency::Weekly, date("2024-03-17")));
        assert!(!is_streak_active(None, Frequency::Weekly, date("2024-03-17")));
    }

    #[test]
    fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = tokio_test::block_on(HabitTrackerServer::new(
            temp_file.path().to_path_buf(),
            StatsEngine::default(),
        ));
        assert!(server.is_ok());
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path()).expect("Failed to create storage");

        let _: &dyn HabitStorage = &storage;
        assert!(storage.all_habits(&UserId::new()).unwrap().is_empty());
    }
}
