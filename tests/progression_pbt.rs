//! Property-Based Tests for the progress merge
//!
//! Invariants:
//! - Counters: total_correct_answers <= total_questions, best_streak >= current_streak
//! - Accuracy: overall_accuracy == correct / questions (0 with no questions)
//! - Unlocks: the unlocked set never shrinks and always contains the basic tier
//! - Levels: never decrease
//! - History: bounded to 20, total_sessions counts every session
//! - Mastery: classify is deterministic

use proptest::prelude::*;
use std::collections::BTreeSet;

use emotion_curriculum::catalog::{self, EmotionId, Tier};
use emotion_curriculum::{
    CurriculumSelector, MasteryTracker, Modality, ProgressionPolicy, RoundOutcome, SessionReport,
    LearnerProgress,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_emotion() -> impl Strategy<Value = EmotionId> {
    (0usize..EmotionId::ALL.len()).prop_map(|i| EmotionId::ALL[i])
}

fn arb_modality() -> impl Strategy<Value = Modality> {
    prop_oneof![
        Just(Modality::Visual),
        Just(Modality::Speech),
        Just(Modality::Mimicry),
        Just(Modality::Conversation),
    ]
}

fn arb_outcome() -> impl Strategy<Value = RoundOutcome> {
    (arb_emotion(), any::<bool>(), 0u32..=20_000u32, arb_modality()).prop_map(
        |(emotion, is_correct, millis, modality)| {
            RoundOutcome::new(emotion, is_correct, millis as f64 / 1000.0).with_modality(modality)
        },
    )
}

fn arb_report() -> impl Strategy<Value = SessionReport> {
    (arb_modality(), prop::collection::vec(arb_outcome(), 1..8))
        .prop_map(|(modality, outcomes)| SessionReport { modality, outcomes })
}

#[derive(Debug, Clone)]
enum Step {
    Round(RoundOutcome),
    Report(SessionReport),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => arb_outcome().prop_map(Step::Round),
        1 => arb_report().prop_map(Step::Report),
    ]
}

fn check_invariants(progress: &LearnerProgress) -> Result<(), TestCaseError> {
    prop_assert!(progress.total_correct_answers <= progress.total_questions);
    prop_assert!(progress.best_streak >= progress.current_streak);
    prop_assert!(progress.current_level >= 1 && progress.current_level <= 3);
    prop_assert!(progress.session_history.len() <= 20);
    prop_assert!((0.0..=1.0).contains(&progress.overall_accuracy));
    if progress.total_questions == 0 {
        prop_assert_eq!(progress.overall_accuracy, 0.0);
    } else {
        let expected = progress.total_correct_answers as f64 / progress.total_questions as f64;
        prop_assert!((progress.overall_accuracy - expected).abs() < 1e-12);
    }
    for emotion in catalog::tier_members(Tier::Basic) {
        prop_assert!(progress.unlocked_emotions.contains(&emotion));
    }
    Ok(())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn merge_preserves_invariants(steps in prop::collection::vec(arb_step(), 0..80)) {
        let selector = CurriculumSelector::default();
        let mut progress = LearnerProgress::new();
        let mut sessions = 0u64;

        for step in steps {
            let before_unlocked = progress.unlocked_emotions.clone();
            let before_level = progress.current_level;

            progress = match step {
                Step::Round(outcome) => selector.record_round(&progress, &outcome).unwrap(),
                Step::Report(report) => {
                    sessions += 1;
                    selector.record_report(&progress, &report).unwrap()
                }
            };

            check_invariants(&progress)?;
            prop_assert!(progress.unlocked_emotions.is_superset(&before_unlocked));
            prop_assert!(progress.current_level >= before_level);
        }

        prop_assert_eq!(progress.total_sessions, sessions);
    }

    #[test]
    fn classify_is_deterministic(emotion in arb_emotion(), history in prop::collection::vec(arb_outcome(), 0..40)) {
        let tracker = MasteryTracker::default();
        let first = tracker.classify(emotion, &history);
        let second = tracker.classify(emotion, &history);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.attempts <= 10);
        prop_assert!((0.0..=1.0).contains(&first.accuracy));
    }

    #[test]
    fn unlock_set_is_superset(
        mastered in prop::collection::btree_set(arb_emotion(), 0..10),
        current in prop::collection::btree_set(arb_emotion(), 0..10),
    ) {
        let policy = ProgressionPolicy::default();
        let next = policy.next_unlock_set(&mastered, &current);
        prop_assert!(next.is_superset(&current));

        // tiers are unlocked whole
        for tier in Tier::ALL {
            let members: BTreeSet<_> = catalog::tier_members(tier).collect();
            let newly: BTreeSet<_> = next.difference(&current).copied().filter(|e| members.contains(e)).collect();
            if !newly.is_empty() {
                prop_assert!(members.iter().all(|e| next.contains(e)));
            }
        }
    }

    #[test]
    fn level_never_downgrades(level in 1u32..=3, accuracy in 0.0f64..=1.0, sessions in 0u64..50) {
        let policy = ProgressionPolicy::default();
        let mut progress = LearnerProgress::new();
        progress.current_level = level;
        progress.overall_accuracy = accuracy;
        progress.total_sessions = sessions;
        prop_assert!(policy.level_for(&progress) >= level);
    }
}
