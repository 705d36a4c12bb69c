/// Growth stage taxonomy and classification
///
/// A habit "grows" from a seed into a tree as its streak gets longer. The
/// stage is a pure function of the current streak, so it is computed on
/// demand instead of being stored next to the streak.

use serde::Serialize;

use crate::domain::DomainError;

/// Display data and threshold for one growth stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrowthStage {
    pub name: &'static str,
    pub description: &'static str,
    /// Hex color used for progress rings and badges
    pub color: &'static str,
    pub icon: &'static str,
    /// Smallest streak that reaches this stage
    pub min_streak: u32,
}

/// The five growth stages, ordered by strictly increasing `min_streak`
pub static GROWTH_STAGES: [GrowthStage; 5] = [
    GrowthStage {
        name: "Seed",
        description: "Just getting started! Keep going to see growth.",
        color: "#8B4513",
        icon: "🌱",
        min_streak: 0,
    },
    GrowthStage {
        name: "Seedling",
        description: "Your habit is starting to take root!",
        color: "#90EE90",
        icon: "🌿",
        min_streak: 3,
    },
    GrowthStage {
        name: "Plant",
        description: "Growing steadily! You're building consistency.",
        color: "#32CD32",
        icon: "🪴",
        min_streak: 7,
    },
    GrowthStage {
        name: "Growing Plant",
        description: "Your habit is flourishing! Keep nurturing it.",
        color: "#228B22",
        icon: "🌳",
        min_streak: 14,
    },
    GrowthStage {
        name: "Tree",
        description: "Congratulations! Your habit is fully established.",
        color: "#006400",
        icon: "🌲",
        min_streak: 30,
    },
];

/// Index into `GROWTH_STAGES`
///
/// Only this module can build one from a raw integer, so every `StageIndex`
/// in circulation points at a real stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StageIndex(u8);

impl StageIndex {
    pub const SEED: StageIndex = StageIndex(0);
    pub const TREE: StageIndex = StageIndex(4);

    /// Checked conversion from a raw index
    pub fn new(index: usize) -> Result<Self, DomainError> {
        if index < GROWTH_STAGES.len() {
            Ok(Self(index as u8))
        } else {
            Err(DomainError::InvalidStageIndex(index))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The following stage, or None at the last one
    pub fn next(self) -> Option<StageIndex> {
        StageIndex::new(usize::from(self.0) + 1).ok()
    }

    pub fn metadata(self) -> &'static GrowthStage {
        &GROWTH_STAGES[usize::from(self.0)]
    }
}

/// Highest stage whose threshold the streak has reached
///
/// Stage 0 starts at zero, so every streak maps to a stage.
pub fn stage_for_streak(streak: u32) -> StageIndex {
    let index = GROWTH_STAGES
        .iter()
        .rposition(|stage| stage.min_streak <= streak)
        .unwrap_or(0);
    StageIndex(index as u8)
}

/// Percent progress from the current stage's threshold to the next one
///
/// Returns 100 once the last stage is reached.
pub fn progress_to_next_stage(streak: u32) -> u8 {
    let stage = stage_for_streak(streak);
    let Some(next) = stage.next() else {
        return 100;
    };

    let floor = stage.metadata().min_streak;
    let range = u64::from(next.metadata().min_streak - floor);
    let done = u64::from(streak - floor);

    (done * 100 / range).min(100) as u8
}

/// Days still needed to reach the next stage, None at the last stage
pub fn days_to_next_stage(streak: u32) -> Option<u32> {
    stage_for_streak(streak)
        .next()
        .map(|next| next.metadata().min_streak - streak)
}

/// Look up display data for a raw stage index
pub fn stage_metadata(index: usize) -> Result<&'static GrowthStage, DomainError> {
    GROWTH_STAGES
        .get(index)
        .ok_or(DomainError::InvalidStageIndex(index))
}
