/// Growth stage classification through the public API
use habit_garden_mcp::*;
use proptest::prelude::*;

#[test]
fn test_stage_thresholds() {
    let cases = [
        (0, 0), (2, 0), (3, 1), (6, 1), (7, 2),
        (13, 2), (14, 3), (29, 3), (30, 4), (1000, 4),
    ];
    for (streak, stage) in cases {
        assert_eq!(stage_for_streak(streak).value(), stage, "streak {}", streak);
    }
}

#[test]
fn test_progress_examples() {
    assert_eq!(progress_to_next_stage(0), 0);
    assert_eq!(progress_to_next_stage(6), 75);
    assert_eq!(progress_to_next_stage(10), 42);
    assert_eq!(progress_to_next_stage(30), 100);
}

#[test]
fn test_stage_metadata_lookup() {
    let plant = stage_metadata(2).expect("stage 2 exists");
    assert_eq!(plant.name, "Plant");
    assert_eq!(plant.min_streak, 7);

    assert!(matches!(stage_metadata(5), Err(DomainError::InvalidStageIndex(5))));
}

#[test]
fn test_taxonomy_is_strictly_increasing() {
    assert_eq!(GROWTH_STAGES[0].min_streak, 0);
    for pair in GROWTH_STAGES.windows(2) {
        assert!(pair[0].min_streak < pair[1].min_streak);
    }
}

proptest! {
    #[test]
    fn stage_never_decreases(a in 0u32..10_000, b in 0u32..10_000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(stage_for_streak(low) <= stage_for_streak(high));
    }

    #[test]
    fn verification_never_regresses_stage(streak in 0u32..100_000) {
        let before = stage_for_streak(streak);
        let after = stage_for_streak(StreakEvaluator::next_streak(streak));
        prop_assert!(after >= before);
    }
}
