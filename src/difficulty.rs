use std::collections::BTreeSet;

use crate::catalog::{self, EmotionId, Tier};
use crate::config::DifficultyParams;
use crate::progression::ProgressionPolicy;
use crate::types::{
    AffectState, DifficultyAdjustment, DifficultyDelta, EmotionalState, InterventionKind,
    RoundOutcome,
};

/// Moment-to-moment round tuning.
///
/// The base rule reads the caller's rolling accuracy; the affect rule reads
/// an optional inferred emotional state. Affect interventions always add to
/// the result, and an affect-driven delta replaces the base delta only when
/// the two disagree.
#[derive(Debug, Clone, Default)]
pub struct DifficultyAdapter {
    params: DifficultyParams,
    policy: ProgressionPolicy,
}

impl DifficultyAdapter {
    pub fn new(params: DifficultyParams, policy: ProgressionPolicy) -> Self {
        Self { params, policy }
    }

    pub fn adjust(
        &self,
        outcome: &RoundOutcome,
        rolling_accuracy: f64,
        unlocked: &BTreeSet<EmotionId>,
        emotional_state: Option<&EmotionalState>,
    ) -> DifficultyAdjustment {
        let mut adjustment = self.base_rule(outcome, rolling_accuracy, unlocked);

        if let Some(state) = emotional_state {
            if state.confidence >= self.params.min_affect_confidence {
                self.apply_affect(&mut adjustment, state);
            } else {
                tracing::debug!(
                    confidence = state.confidence,
                    "Skipping low-confidence affect reading"
                );
            }
        }

        tracing::debug!(
            rolling_accuracy,
            delta = ?adjustment.difficulty_delta,
            time_delta = adjustment.time_limit_delta_seconds,
            interventions = adjustment.interventions.len(),
            "Computed difficulty adjustment"
        );
        adjustment
    }

    fn base_rule(
        &self,
        outcome: &RoundOutcome,
        rolling_accuracy: f64,
        unlocked: &BTreeSet<EmotionId>,
    ) -> DifficultyAdjustment {
        if rolling_accuracy < self.params.decrease_below {
            DifficultyAdjustment {
                difficulty_delta: DifficultyDelta::Decrease,
                time_limit_delta_seconds: self.params.ease_time_delta_seconds,
                emotion_focus: catalog::clearest(self.params.clear_focus_count),
                interventions: Vec::new(),
            }
        } else if rolling_accuracy > self.params.increase_above {
            DifficultyAdjustment {
                difficulty_delta: DifficultyDelta::Increase,
                time_limit_delta_seconds: self.params.challenge_time_delta_seconds,
                emotion_focus: self.challenge_focus(unlocked),
                interventions: Vec::new(),
            }
        } else {
            DifficultyAdjustment::maintain(vec![outcome.emotion_target])
        }
    }

    /// Members of the next locked tier, or the hardest tier once all are open.
    fn challenge_focus(&self, unlocked: &BTreeSet<EmotionId>) -> Vec<EmotionId> {
        let tier = self
            .policy
            .locked_tiers(unlocked)
            .first()
            .copied()
            .unwrap_or(Tier::Subtle);
        catalog::tier_members(tier).collect()
    }

    fn apply_affect(&self, adjustment: &mut DifficultyAdjustment, state: &EmotionalState) {
        match state.primary {
            AffectState::Frustrated => {
                adjustment.push_intervention(InterventionKind::BreakTime);
                adjustment.push_intervention(InterventionKind::CalmingExercise);
            }
            AffectState::Confident => {
                if adjustment.difficulty_delta != DifficultyDelta::Increase {
                    adjustment.difficulty_delta = DifficultyDelta::Increase;
                    adjustment.time_limit_delta_seconds = self.params.challenge_time_delta_seconds;
                }
            }
            AffectState::Confused => {
                adjustment.push_intervention(InterventionKind::ClearerInstructions);
                adjustment.push_intervention(InterventionKind::VisualHints);
            }
            AffectState::Engaged | AffectState::Neutral => {}
        }
    }
}
