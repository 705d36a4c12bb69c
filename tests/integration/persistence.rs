/// Database persistence across server restarts
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use habit_garden_mcp::tools::{verify_habit, VerifyHabitParams};
use habit_garden_mcp::*;
use tempfile::TempDir;

fn verify(garden: &HabitGardenServer, habit: &Habit) {
    verify_habit(
        garden.storage(),
        garden.evaluator(),
        garden.now(),
        VerifyHabitParams {
            habit_id: habit.id.to_string(),
            verification_type: "photo".to_string(),
            image_url: Some("https://photos.example.com/run.jpg".to_string()),
            text: None,
            note: Some("5k".to_string()),
        },
    )
    .expect("verification accepted");
}

#[test]
fn test_streaks_survive_restart_and_startup_sweep() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("garden.db");
    let offset = parse_utc_offset("-05:00").expect("valid offset");
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 15, 0, 0).unwrap()));

    let habit = Habit::new("Run".to_string(), None, clock.now()).expect("valid habit");
    {
        let garden = HabitGardenServer::new(&db_path, offset)
            .expect("Failed to create first server")
            .with_clock(clock.clone());
        garden.storage().create_habit(&habit).expect("habit stored");
        for _ in 0..3 {
            verify(&garden, &habit);
            clock.advance(Duration::days(1));
        }
    }

    // Reopen the same file the next morning: the streak is intact
    let garden = HabitGardenServer::new(&db_path, offset)
        .expect("Failed to create second server")
        .with_clock(clock.clone());
    let stored = garden.storage().get_habit(&habit.id).expect("habit persisted");
    assert_eq!(stored.current_streak, 3);
    assert_eq!(stored.stage().name, "Seedling");

    let logs = garden.storage().logs_for_habit(&habit.id, None).expect("logs");
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].kind(), VerificationKind::Photo);
    assert_eq!(logs[0].note.as_deref(), Some("5k"));

    let sweep = garden.refresh_streaks().expect("sweep");
    assert!(sweep.reset.is_empty());

    // Three days of silence later the startup sweep resets it
    clock.advance(Duration::days(3));
    let sweep = garden.refresh_streaks().expect("sweep");
    assert_eq!(sweep.reset.len(), 1);
    let stored = garden.storage().get_habit(&habit.id).expect("habit persisted");
    assert_eq!(stored.current_streak, 0);
    assert_eq!(stored.longest_streak, 3);
}

#[test]
fn test_reopening_under_another_offset_counts_days_in_the_new_offset() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("garden.db");
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 11, 0, 0).unwrap()));
    let habit = Habit::new("Stretch".to_string(), None, clock.now() - Duration::days(1))
        .expect("valid habit");

    // 11:00Z is already January 16th at +14:00
    {
        let garden = HabitGardenServer::new(&db_path, parse_utc_offset("+14:00").unwrap())
            .expect("Failed to create first server")
            .with_clock(clock.clone());
        garden.storage().create_habit(&habit).expect("habit stored");
        verify(&garden, &habit);
    }

    // At -10:00 that log falls on January 15th, so the 16th is still open
    clock.set(Utc.with_ymd_and_hms(2024, 1, 16, 12, 0, 0).unwrap());
    let garden = HabitGardenServer::new(&db_path, parse_utc_offset("-10:00").unwrap())
        .expect("Failed to reopen under a new offset")
        .with_clock(clock.clone());
    verify(&garden, &habit);

    let stored = garden.storage().get_habit(&habit.id).expect("habit persisted");
    assert_eq!(stored.current_streak, 2);
    assert_eq!(garden.storage().count_logs(&habit.id).expect("count"), 2);
}

#[test]
fn test_offset_change_that_would_merge_two_days_is_refused() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("garden.db");
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 14, 23, 30, 0).unwrap()));
    let habit = Habit::new("Journal".to_string(), None, clock.now() - Duration::days(1))
        .expect("valid habit");

    {
        let garden = HabitGardenServer::new(&db_path, parse_utc_offset("Z").unwrap())
            .expect("Failed to create first server")
            .with_clock(clock.clone());
        garden.storage().create_habit(&habit).expect("habit stored");
        verify(&garden, &habit);
        clock.advance(Duration::hours(1));
        verify(&garden, &habit);
    }

    // Both logs land on January 15th at +02:00
    let result = HabitGardenServer::new(&db_path, parse_utc_offset("+02:00").unwrap());
    assert!(matches!(
        result,
        Err(ServerError::Database(StorageError::OffsetConflict { .. }))
    ));

    let garden = HabitGardenServer::new(&db_path, parse_utc_offset("+00:00").unwrap())
        .expect("original offset still opens");
    assert_eq!(garden.storage().count_logs(&habit.id).expect("count"), 2);
}

#[test]
fn test_storage_interface() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = SqliteStorage::new(temp_dir.path().join("habits.db"))
        .expect("Failed to create storage");

    let _: &dyn HabitStorage = &storage;
    assert!(storage.list_habits().expect("list").is_empty());
}
