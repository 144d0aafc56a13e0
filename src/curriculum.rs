//! Curriculum Selector
//!
//! Orchestrates the mastery tracker, progression policy, difficulty adapter
//! and scorer. This is the only place a `LearnerProgress` changes: every
//! operation takes a snapshot and returns a new one, leaving persistence to
//! the caller.
//!
//! Next-emotion selection is weighted toward weak areas (struggling x3,
//! learning x2, proficient x1, mastered x0.5) so mastered emotions still come
//! back for spaced repetition.

use chrono::Utc;
use rand::Rng;
use std::collections::BTreeSet;

use crate::achievements;
use crate::catalog::EmotionId;
use crate::config::{EngineConfig, SelectionParams};
use crate::difficulty::DifficultyAdapter;
use crate::error::ValidationError;
use crate::mastery::MasteryTracker;
use crate::progression::ProgressionPolicy;
use crate::scoring::Scorer;
use crate::types::{
    DifficultyAdjustment, EmotionalState, LearnerProgress, MasteryClassification, RoundOutcome,
    RoundSummary, SessionReport,
};

#[derive(Debug, Clone, Default)]
pub struct CurriculumSelector {
    tracker: MasteryTracker,
    policy: ProgressionPolicy,
    adapter: DifficultyAdapter,
    scorer: Scorer,
    selection: SelectionParams,
}

impl CurriculumSelector {
    pub fn new(config: &EngineConfig) -> Self {
        let policy = ProgressionPolicy::new(config.progression.clone());
        Self {
            tracker: MasteryTracker::new(config.mastery.clone()),
            adapter: DifficultyAdapter::new(config.difficulty.clone(), policy.clone()),
            policy,
            scorer: Scorer::new(config.scoring.clone()),
            selection: config.selection.clone(),
        }
    }

    pub fn tracker(&self) -> &MasteryTracker {
        &self.tracker
    }

    pub fn policy(&self) -> &ProgressionPolicy {
        &self.policy
    }

    pub fn selection_weight(&self, classification: MasteryClassification) -> f64 {
        match classification {
            MasteryClassification::Struggling => self.selection.struggling_weight,
            MasteryClassification::Learning => self.selection.learning_weight,
            MasteryClassification::Proficient => self.selection.proficient_weight,
            MasteryClassification::Mastered => self.selection.mastered_weight,
        }
    }

    /// Selection weight for every unlocked emotion, in catalog order.
    pub fn candidate_weights(&self, progress: &LearnerProgress) -> Vec<(EmotionId, f64)> {
        progress
            .unlocked_emotions
            .iter()
            .map(|&emotion| {
                let state = self.tracker.classify_progress(progress, emotion);
                (emotion, self.selection_weight(state.classification))
            })
            .collect()
    }

    pub fn select_next<R: Rng + ?Sized>(
        &self,
        progress: &LearnerProgress,
        rng: &mut R,
    ) -> Result<EmotionId, ValidationError> {
        let candidates = self.candidate_weights(progress);
        let roll: f64 = rng.gen();
        let selected = weighted_pick(&candidates, roll).ok_or(ValidationError::NoCandidates)?;
        tracing::debug!(emotion = %selected, candidates = candidates.len(), "Selected next emotion");
        Ok(selected)
    }

    pub fn record_round(
        &self,
        progress: &LearnerProgress,
        outcome: &RoundOutcome,
    ) -> Result<LearnerProgress, ValidationError> {
        if let Err(err) = outcome.validate() {
            tracing::warn!(error = %err, "Rejected round outcome");
            return Err(err);
        }

        let mut next = progress.clone();
        next.total_questions += 1;
        if outcome.is_correct {
            next.total_correct_answers += 1;
            next.current_streak += 1;
            next.best_streak = next.best_streak.max(next.current_streak);
        } else {
            next.current_streak = 0;
        }
        next.total_score += self.scorer.round_points(outcome);
        next.recompute_accuracy();

        next.emotion_stats
            .entry(outcome.emotion_target)
            .or_default()
            .push(outcome.clone(), self.tracker.params().window_size);

        let mastery = self.tracker.classify_progress(&next, outcome.emotion_target);
        tracing::debug!(
            emotion = %outcome.emotion_target,
            correct = outcome.is_correct,
            accuracy = mastery.accuracy,
            classification = mastery.classification.as_str(),
            "Recorded round"
        );

        self.refresh_progression(&mut next);
        Ok(next)
    }

    pub fn record_session(
        &self,
        progress: &LearnerProgress,
        summary: &RoundSummary,
    ) -> Result<LearnerProgress, ValidationError> {
        summary.validate()?;

        let mut next = progress.clone();
        next.session_history.insert(0, summary.clone());
        next.session_history
            .truncate(self.policy.params().session_history_limit);
        next.total_sessions += 1;

        tracing::debug!(
            session_id = %summary.session_id,
            rounds = summary.rounds,
            accuracy = summary.accuracy,
            total_sessions = next.total_sessions,
            "Recorded session"
        );

        self.refresh_progression(&mut next);
        Ok(next)
    }

    /// Merge a whole session: every round, then its summary. Nothing is
    /// applied unless every outcome is valid.
    pub fn record_report(
        &self,
        progress: &LearnerProgress,
        report: &SessionReport,
    ) -> Result<LearnerProgress, ValidationError> {
        if report.outcomes.is_empty() {
            return Err(ValidationError::EmptySession);
        }
        for outcome in &report.outcomes {
            outcome.validate()?;
        }

        let mut next = progress.clone();
        for outcome in &report.outcomes {
            next = self.record_round(&next, outcome)?;
        }
        let summary = self
            .scorer
            .summarize(report.modality, &report.outcomes, Utc::now())?;
        self.record_session(&next, &summary)
    }

    /// Parameters for the round after `outcome`, driven by the most recent
    /// session's accuracy.
    pub fn next_round(
        &self,
        progress: &LearnerProgress,
        outcome: &RoundOutcome,
        emotional_state: Option<&EmotionalState>,
    ) -> Result<DifficultyAdjustment, ValidationError> {
        outcome.validate()?;
        if let Some(state) = emotional_state {
            state.validate()?;
        }
        Ok(self.adapter.adjust(
            outcome,
            progress.last_session_accuracy(),
            &progress.unlocked_emotions,
            emotional_state,
        ))
    }

    fn refresh_progression(&self, progress: &mut LearnerProgress) {
        let mastered = self.tracker.mastered_set(progress);
        let unlocked = self
            .policy
            .next_unlock_set(&mastered, &progress.unlocked_emotions);
        if unlocked.len() > progress.unlocked_emotions.len() {
            let added: BTreeSet<_> = unlocked
                .difference(&progress.unlocked_emotions)
                .copied()
                .collect();
            tracing::info!(?added, "Unlocked new emotions");
        }
        progress.unlocked_emotions = unlocked;

        let level = self.policy.level_for(progress);
        if level > progress.current_level {
            tracing::info!(from = progress.current_level, to = level, "Learner levelled up");
        }
        progress.current_level = level;

        let earned = achievements::newly_earned(progress);
        progress.achievements_unlocked.extend(earned);
        progress.updated_at = Utc::now();
    }
}

/// Pick from weighted candidates with a uniform `roll` in `[0, 1)`.
///
/// Candidates are laid end to end in the given order; the roll lands in one
/// of them proportionally to its weight. Non-positive weights are never
/// picked unless every weight is non-positive, in which case the first
/// candidate wins.
pub fn weighted_pick(candidates: &[(EmotionId, f64)], roll: f64) -> Option<EmotionId> {
    let first = candidates.first()?.0;
    let total: f64 = candidates.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return Some(first);
    }

    let target = roll.clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    let mut last_positive = first;
    for &(emotion, weight) in candidates {
        let weight = weight.max(0.0);
        if weight == 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = emotion;
        if target < cumulative {
            return Some(emotion);
        }
    }
    Some(last_positive)
}
