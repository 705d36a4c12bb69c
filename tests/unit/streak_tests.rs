/// Calendar-day streak rules through the public API
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use habit_garden_mcp::*;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

#[test]
fn test_nothing_completed_yet() {
    let evaluator = StreakEvaluator::utc();
    let now = at(2024, 1, 15, 12, 0);

    assert!(!evaluator.is_completed_on_date(None, now));
    assert!(!evaluator.is_completed_yesterday(None, now));
    assert!(!evaluator.is_streak_broken(None, now));
}

#[test]
fn test_two_hours_across_midnight() {
    let evaluator = StreakEvaluator::utc();
    let last = Some(at(2024, 1, 14, 23, 0));
    let now = at(2024, 1, 15, 1, 0);

    assert!(!evaluator.is_completed_on_date(last, now));
    assert!(evaluator.is_completed_yesterday(last, now));
    assert!(!evaluator.is_streak_broken(last, now));
}

#[test]
fn test_broken_after_a_skipped_day() {
    let evaluator = StreakEvaluator::utc();
    let now = at(2024, 1, 15, 12, 0);

    assert!(!evaluator.is_streak_broken(Some(at(2024, 1, 15, 0, 5)), now));
    assert!(!evaluator.is_streak_broken(Some(at(2024, 1, 14, 0, 5)), now));
    assert!(evaluator.is_streak_broken(Some(at(2024, 1, 13, 23, 59)), now));
    assert!(evaluator.is_streak_broken(Some(now - Duration::days(40)), now));
}

#[test]
fn test_reference_offset_moves_the_day_boundary() {
    let tokyo = StreakEvaluator::new(parse_utc_offset("+09:00").expect("valid offset"));
    let last = Some(at(2024, 1, 14, 14, 0)); // 23:00 in Tokyo
    let now = at(2024, 1, 14, 16, 0); // 01:00 the next day in Tokyo

    assert!(tokyo.is_completed_yesterday(last, now));
    assert!(StreakEvaluator::utc().is_completed_on_date(last, now));
}

#[test]
fn test_refresh_is_idempotent() {
    let evaluator = StreakEvaluator::new(FixedOffset::west_opt(5 * 3600).unwrap());
    let now = at(2024, 1, 20, 12, 0);
    let last = Some(at(2024, 1, 10, 12, 0));

    let first = evaluator.evaluate_list_refresh(last, 9, now);
    assert!(first.reset_needed);
    assert_eq!(first.new_streak, 0);

    let second = evaluator.evaluate_list_refresh(last, first.new_streak, now);
    assert!(!second.reset_needed);
    assert_eq!(second.new_streak, 0);
    assert_eq!(second.new_stage.value(), 0);
}

#[test]
fn test_seedling_grows_into_plant() {
    let evaluator = StreakEvaluator::utc();
    let created = at(2024, 1, 1, 8, 0);
    let now = at(2024, 1, 15, 8, 0);

    let mut habit = Habit::new("Meditate".to_string(), None, created).expect("valid habit");
    habit.current_streak = 6;
    habit.longest_streak = 6;
    assert_eq!(habit.stage().name, "Seedling");
    assert_eq!(habit.progress_to_next_stage(), 75);

    let update = match evaluator.evaluate_verification(
        Some(now - Duration::days(1)),
        habit.current_streak,
        habit.longest_streak,
        now,
    ) {
        VerificationOutcome::Accepted(update) => update,
        VerificationOutcome::RejectedAlreadyDone => panic!("verification should be accepted"),
    };
    habit.apply_streak_update(&update, now);

    assert_eq!(habit.current_streak, 7);
    assert_eq!(habit.longest_streak, 7);
    assert_eq!(habit.growth_stage().value(), 2);
    assert_eq!(habit.stage().name, "Plant");
    assert_eq!(habit.progress_to_next_stage(), 0);
}

#[test]
fn test_second_verification_same_day_rejected() {
    let evaluator = StreakEvaluator::utc();
    let now = at(2024, 1, 15, 21, 0);

    let outcome = evaluator.evaluate_verification(Some(at(2024, 1, 15, 6, 0)), 4, 4, now);
    assert_eq!(outcome, VerificationOutcome::RejectedAlreadyDone);
}
