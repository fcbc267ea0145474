/// Basic integration tests against on-disk databases
use habit_stats_server::*;
use tempfile::{tempdir, NamedTempFile};

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    fn date(raw: &str) -> CalendarDate {
        CalendarDate::parse(raw).expect("valid date")
    }

    #[tokio::test]
    async fn test_server_exposes_configured_engine() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let engine = StatsEngine::new(WeeklyCompletionPolicy::DistinctWeeks);
        let server = HabitTrackerServer::new(temp_file.path().to_path_buf(), engine)
            .await
            .expect("Failed to create server");

        assert_eq!(server.engine().weekly_policy(), WeeklyCompletionPolicy::DistinctWeeks);
        assert!(server.storage().all_habits(&UserId::new()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let dir = tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("habits.db");
        let user = UserId::new();

        let habit_id = {
            let server = HabitTrackerServer::new(db_path.clone(), StatsEngine::default())
                .await
                .expect("Failed to create first server");
            let storage = server.storage();

            let category = Category::new(user, "Mind", Some("#673ab7")).unwrap();
            storage.create_category(&category).unwrap();

            let habit = Habit::new(user, "Meditate", Frequency::Daily, Some(category.id)).unwrap();
            storage.create_habit(&habit).unwrap();
            storage.add_completion(&user, &habit.id, date("2024-02-01")).unwrap();
            storage.add_completion(&user, &habit.id, date("2024-02-02")).unwrap();
            habit.id
        };

        let server = HabitTrackerServer::new(db_path, StatsEngine::default())
            .await
            .expect("Failed to create second server");
        let habit = server.storage().get_habit(&user, &habit_id).unwrap();

        assert_eq!(habit.title, "Meditate");
        assert_eq!(habit.completion_dates.len(), 2);
        assert_eq!(server.storage().list_categories(&user).unwrap()[0].color, "#673AB7");

        let stats = habit.stats(server.engine(), date("2024-02-01"), date("2024-02-07"));
        assert_eq!(stats, StatsResult { total: 7, completed: 2, percentage: 29, streak: 2 });
    }

    #[test]
    fn test_completion_changes_flow_into_stats() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path()).expect("Failed to create storage");
        let user = UserId::new();
        let engine = StatsEngine::default();

        let habit = Habit::new(user, "Walk", Frequency::Weekly, None).unwrap();
        storage.create_habit(&habit).unwrap();
        for day in ["2024-03-01", "2024-03-08", "2024-03-15"] {
            storage.add_completion(&user, &habit.id, date(day)).unwrap();
        }

        let start = date("2024-03-01");
        let end = date("2024-03-21");
        let full = storage.get_habit(&user, &habit.id).unwrap().stats(&engine, start, end);
        assert_eq!(full, StatsResult { total: 3, completed: 3, percentage: 100, streak: 3 });

        let habit = storage.remove_completion(&user, &habit.id, date("2024-03-08")).unwrap();
        let gapped = habit.stats(&engine, start, end);
        assert_eq!(gapped.completed, 2);
        assert_eq!(gapped.percentage, 67);
        assert_eq!(gapped.streak, 1);
    }
}
