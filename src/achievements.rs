use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::catalog::{self, Tier};
use crate::types::LearnerProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementId {
    FirstRound,
    FirstSession,
    StreakFive,
    StreakTen,
    PerfectSession,
    TenSessions,
    ComplexTierUnlocked,
    SubtleTierUnlocked,
    LevelTwo,
    LevelThree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AchievementCondition {
    TotalQuestions(u64),
    TotalSessions(u64),
    BestStreak(u32),
    PerfectSession,
    TierUnlocked(Tier),
    Level(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct AchievementDefinition {
    pub id: AchievementId,
    pub title: &'static str,
    pub condition: AchievementCondition,
}

const fn def(id: AchievementId, title: &'static str, condition: AchievementCondition) -> AchievementDefinition {
    AchievementDefinition { id, title, condition }
}

pub static DEFINITIONS: [AchievementDefinition; 10] = [
    def(AchievementId::FirstRound, "First Steps", AchievementCondition::TotalQuestions(1)),
    def(AchievementId::FirstSession, "Session Complete", AchievementCondition::TotalSessions(1)),
    def(AchievementId::StreakFive, "On a Roll", AchievementCondition::BestStreak(5)),
    def(AchievementId::StreakTen, "Unstoppable", AchievementCondition::BestStreak(10)),
    def(AchievementId::PerfectSession, "Perfect Session", AchievementCondition::PerfectSession),
    def(AchievementId::TenSessions, "Dedicated Learner", AchievementCondition::TotalSessions(10)),
    def(AchievementId::ComplexTierUnlocked, "Feelings Explorer", AchievementCondition::TierUnlocked(Tier::Complex)),
    def(AchievementId::SubtleTierUnlocked, "Feelings Expert", AchievementCondition::TierUnlocked(Tier::Subtle)),
    def(AchievementId::LevelTwo, "Level 2", AchievementCondition::Level(2)),
    def(AchievementId::LevelThree, "Level 3", AchievementCondition::Level(3)),
];

pub fn definition(id: AchievementId) -> &'static AchievementDefinition {
    // DEFINITIONS is indexed in AchievementId declaration order
    &DEFINITIONS[id as usize]
}

fn is_eligible(condition: AchievementCondition, progress: &LearnerProgress) -> bool {
    match condition {
        AchievementCondition::TotalQuestions(n) => progress.total_questions >= n,
        AchievementCondition::TotalSessions(n) => progress.total_sessions >= n,
        AchievementCondition::BestStreak(n) => progress.best_streak >= n,
        AchievementCondition::PerfectSession => {
            progress.session_history.iter().any(|summary| summary.is_perfect())
        }
        AchievementCondition::TierUnlocked(tier) => {
            catalog::tier_members(tier).all(|e| progress.unlocked_emotions.contains(&e))
        }
        AchievementCondition::Level(level) => progress.current_level >= level,
    }
}

/// Achievements the learner qualifies for but has not yet been awarded.
pub fn newly_earned(progress: &LearnerProgress) -> BTreeSet<AchievementId> {
    DEFINITIONS
        .iter()
        .filter(|d| !progress.achievements_unlocked.contains(&d.id))
        .filter(|d| is_eligible(d.condition, progress))
        .map(|d| d.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EmotionId;

    #[test]
    fn test_definitions_indexed_by_id() {
        for d in DEFINITIONS.iter() {
            assert_eq!(definition(d.id).id, d.id);
        }
    }

    #[test]
    fn test_fresh_learner_has_nothing() {
        assert!(newly_earned(&LearnerProgress::new()).is_empty());
    }

    #[test]
    fn test_streak_and_tier_conditions() {
        let mut progress = LearnerProgress::new();
        progress.total_questions = 6;
        progress.best_streak = 5;
        progress.unlocked_emotions.extend([EmotionId::Surprised, EmotionId::Fear, EmotionId::Disgusted]);
        let earned = newly_earned(&progress);
        assert!(earned.contains(&AchievementId::FirstRound));
        assert!(earned.contains(&AchievementId::StreakFive));
        assert!(earned.contains(&AchievementId::ComplexTierUnlocked));
        assert!(!earned.contains(&AchievementId::StreakTen));
        assert!(!earned.contains(&AchievementId::SubtleTierUnlocked));
    }

    #[test]
    fn test_already_awarded_not_repeated() {
        let mut progress = LearnerProgress::new();
        progress.total_questions = 1;
        progress.achievements_unlocked.insert(AchievementId::FirstRound);
        assert!(newly_earned(&progress).is_empty());
    }
}
