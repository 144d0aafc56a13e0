//! Mastery Tracker
//!
//! Classifies how well a learner knows one emotion from a rolling window of
//! their most recent attempts on it.
//!
//! Classification, first match wins:
//! - accuracy >= 0.9 with a consistent window -> `Mastered`
//! - accuracy >= 0.7 with an improving trend -> `Proficient`
//! - accuracy >= 0.5 -> `Learning`
//! - otherwise -> `Struggling`
//!
//! A window is consistent when it holds enough attempts and the population
//! variance of its 0/1 outcomes stays below the configured bound.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::EmotionId;
use crate::config::MasteryParams;
use crate::types::{EmotionMasteryState, LearnerProgress, MasteryClassification, RoundOutcome, Trend};

#[derive(Debug, Clone, Default)]
pub struct MasteryTracker {
    params: MasteryParams,
}

impl MasteryTracker {
    pub fn new(params: MasteryParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MasteryParams {
        &self.params
    }

    /// Classify `emotion` from a chronological (oldest first) outcome history.
    /// Outcomes for other emotions are ignored.
    pub fn classify(&self, emotion: EmotionId, history: &[RoundOutcome]) -> EmotionMasteryState {
        let relevant: Vec<bool> = history
            .iter()
            .filter(|outcome| outcome.emotion_target == emotion)
            .map(|outcome| outcome.is_correct)
            .collect();
        let start = relevant.len().saturating_sub(self.params.window_size);
        let window = &relevant[start..];

        if window.is_empty() {
            return EmotionMasteryState {
                emotion,
                accuracy: 0.0,
                trend: Trend::Flat,
                classification: MasteryClassification::Struggling,
                attempts: 0,
            };
        }

        let accuracy = ratio(window);
        let trend = self.trend(window);
        let classification = if accuracy >= self.params.mastered_accuracy && self.is_consistent(window) {
            MasteryClassification::Mastered
        } else if accuracy >= self.params.proficient_accuracy && trend == Trend::Improving {
            MasteryClassification::Proficient
        } else if accuracy >= self.params.learning_accuracy {
            MasteryClassification::Learning
        } else {
            MasteryClassification::Struggling
        };

        EmotionMasteryState {
            emotion,
            accuracy,
            trend,
            classification,
            attempts: window.len(),
        }
    }

    /// Classify from the rolling window stored on the learner record.
    pub fn classify_progress(&self, progress: &LearnerProgress, emotion: EmotionId) -> EmotionMasteryState {
        self.classify(emotion, progress.recent_outcomes(emotion))
    }

    /// Mastery state for every unlocked emotion.
    pub fn classify_all(&self, progress: &LearnerProgress) -> BTreeMap<EmotionId, EmotionMasteryState> {
        progress
            .unlocked_emotions
            .iter()
            .map(|&emotion| (emotion, self.classify_progress(progress, emotion)))
            .collect()
    }

    /// Emotions currently classified as mastered, across the whole catalog.
    pub fn mastered_set(&self, progress: &LearnerProgress) -> BTreeSet<EmotionId> {
        progress
            .emotion_stats
            .keys()
            .copied()
            .filter(|&emotion| {
                self.classify_progress(progress, emotion).classification
                    == MasteryClassification::Mastered
            })
            .collect()
    }

    fn trend(&self, window: &[bool]) -> Trend {
        if window.len() < 2 {
            return Trend::Flat;
        }
        let (earlier, later) = window.split_at(window.len() / 2);
        let delta = ratio(later) - ratio(earlier);
        if delta > self.params.trend_tolerance {
            Trend::Improving
        } else if delta < -self.params.trend_tolerance {
            Trend::Declining
        } else {
            Trend::Flat
        }
    }

    fn is_consistent(&self, window: &[bool]) -> bool {
        if window.len() < self.params.consistency_min_attempts {
            return false;
        }
        let mean = ratio(window);
        let variance = window
            .iter()
            .map(|&correct| {
                let x = if correct { 1.0 } else { 0.0 };
                (x - mean).powi(2)
            })
            .sum::<f64>()
            / window.len() as f64;
        variance < self.params.consistency_max_variance
    }
}

fn ratio(window: &[bool]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    window.iter().filter(|&&correct| correct).count() as f64 / window.len() as f64
}
