//! Progression Policy
//!
//! Tier-gated unlocks and monotonic learner levels. Mastery gates whole
//! tiers only: once a tier is open every member is selectable.

use std::collections::BTreeSet;

use crate::catalog::{self, EmotionId, Tier};
use crate::config::ProgressionParams;
use crate::types::LearnerProgress;

#[derive(Debug, Clone, Default)]
pub struct ProgressionPolicy {
    params: ProgressionParams,
}

impl ProgressionPolicy {
    pub fn new(params: ProgressionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ProgressionParams {
        &self.params
    }

    /// Unlocked emotions after applying tier gates. Always a superset of
    /// `current_unlocked`.
    pub fn next_unlock_set(
        &self,
        mastered: &BTreeSet<EmotionId>,
        current_unlocked: &BTreeSet<EmotionId>,
    ) -> BTreeSet<EmotionId> {
        let mut unlocked = current_unlocked.clone();
        unlocked.extend(catalog::tier_members(Tier::Basic));

        for tier in Tier::ALL {
            let gates_open = tier
                .prerequisites()
                .iter()
                .all(|prereq| catalog::tier_members(*prereq).all(|e| mastered.contains(&e)));
            if gates_open {
                unlocked.extend(catalog::tier_members(tier));
            }
        }

        unlocked
    }

    /// Level earned by the given totals, ignoring any level already reached.
    pub fn computed_level(&self, overall_accuracy: f64, total_sessions: u64) -> u32 {
        let p = &self.params;
        if overall_accuracy >= p.level_three_accuracy && total_sessions >= p.level_three_sessions {
            3
        } else if overall_accuracy >= p.level_two_accuracy && total_sessions >= p.level_two_sessions {
            2
        } else {
            1
        }
    }

    /// Level for the learner; never lower than the level already held.
    pub fn level_for(&self, progress: &LearnerProgress) -> u32 {
        progress
            .current_level
            .max(self.computed_level(progress.overall_accuracy, progress.total_sessions))
    }

    /// Tiers with at least one member still locked, easiest first.
    pub fn locked_tiers(&self, unlocked: &BTreeSet<EmotionId>) -> Vec<Tier> {
        Tier::ALL
            .into_iter()
            .filter(|tier| catalog::tier_members(*tier).any(|e| !unlocked.contains(&e)))
            .collect()
    }

    pub fn is_tier_unlocked(&self, tier: Tier, unlocked: &BTreeSet<EmotionId>) -> bool {
        catalog::tier_members(tier).all(|e| unlocked.contains(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[EmotionId]) -> BTreeSet<EmotionId> {
        items.iter().copied().collect()
    }

    fn basic() -> BTreeSet<EmotionId> {
        catalog::tier_members(Tier::Basic).collect()
    }

    #[test]
    fn test_basic_mastery_unlocks_complex_only() {
        let policy = ProgressionPolicy::default();
        let unlocked = policy.next_unlock_set(&basic(), &basic());
        assert!(unlocked.contains(&EmotionId::Surprised));
        assert!(unlocked.contains(&EmotionId::Fear));
        assert!(unlocked.contains(&EmotionId::Disgusted));
        assert!(!unlocked.contains(&EmotionId::Proud));
        assert!(!unlocked.contains(&EmotionId::Confused));
    }

    #[test]
    fn test_partial_basic_mastery_keeps_complex_locked() {
        let policy = ProgressionPolicy::default();
        let mastered = set(&[EmotionId::Happy, EmotionId::Sad]);
        let unlocked = policy.next_unlock_set(&mastered, &basic());
        assert_eq!(unlocked, basic());
    }

    #[test]
    fn test_subtle_needs_basic_and_complex() {
        let policy = ProgressionPolicy::default();
        let complex_only: BTreeSet<_> = catalog::tier_members(Tier::Complex).collect();
        let unlocked = policy.next_unlock_set(&complex_only, &basic());
        assert!(!unlocked.contains(&EmotionId::Excited));
        assert!(!unlocked.contains(&EmotionId::Fear));

        let mut all_lower = basic();
        all_lower.extend(complex_only);
        let unlocked = policy.next_unlock_set(&all_lower, &basic());
        assert_eq!(unlocked.len(), EmotionId::ALL.len());
    }

    #[test]
    fn test_unlocks_are_never_revoked() {
        let policy = ProgressionPolicy::default();
        let current: BTreeSet<_> = EmotionId::ALL.into_iter().collect();
        let unlocked = policy.next_unlock_set(&BTreeSet::new(), &current);
        assert_eq!(unlocked, current);
    }

    #[test]
    fn test_level_thresholds() {
        let policy = ProgressionPolicy::default();
        assert_eq!(policy.computed_level(0.82, 21), 3);
        assert_eq!(policy.computed_level(0.82, 19), 2);
        assert_eq!(policy.computed_level(0.65, 10), 2);
        assert_eq!(policy.computed_level(0.59, 50), 1);
        assert_eq!(policy.computed_level(0.0, 0), 1);
    }

    #[test]
    fn test_level_is_monotonic() {
        let policy = ProgressionPolicy::default();
        let mut progress = LearnerProgress::new();
        progress.overall_accuracy = 0.82;
        progress.total_sessions = 21;
        assert_eq!(policy.level_for(&progress), 3);

        progress.current_level = 3;
        progress.overall_accuracy = 0.5;
        assert_eq!(policy.level_for(&progress), 3);
    }

    #[test]
    fn test_locked_tiers() {
        let policy = ProgressionPolicy::default();
        assert_eq!(policy.locked_tiers(&basic()), vec![Tier::Complex, Tier::Subtle]);
        let all: BTreeSet<_> = EmotionId::ALL.into_iter().collect();
        assert!(policy.locked_tiers(&all).is_empty());
        assert!(policy.is_tier_unlocked(Tier::Basic, &basic()));
    }
}
