//! Common Types
//!
//! Data model shared by every engine module. All types serialize as camelCase
//! JSON so every front end reads and writes the same learner record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::achievements::AchievementId;
use crate::catalog::{self, EmotionId, Tier};
use crate::error::ValidationError;

// ==================== Round Input ====================

/// Practice surface that produced an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Visual,
    Speech,
    Mimicry,
    Conversation,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Speech => "speech",
            Self::Mimicry => "mimicry",
            Self::Conversation => "conversation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "visual" => Some(Self::Visual),
            "speech" => Some(Self::Speech),
            "mimicry" => Some(Self::Mimicry),
            "conversation" => Some(Self::Conversation),
            _ => None,
        }
    }
}

/// Result of a single practice round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub emotion_target: EmotionId,
    pub emotion_recognized: Option<EmotionId>,
    pub is_correct: bool,
    pub response_time_seconds: f64,
    pub modality: Modality,
}

impl RoundOutcome {
    pub fn new(emotion_target: EmotionId, is_correct: bool, response_time_seconds: f64) -> Self {
        Self {
            emotion_target,
            emotion_recognized: is_correct.then_some(emotion_target),
            is_correct,
            response_time_seconds,
            modality: Modality::Visual,
        }
    }

    pub fn with_modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.response_time_seconds.is_finite() || self.response_time_seconds < 0.0 {
            return Err(ValidationError::InvalidResponseTime(self.response_time_seconds));
        }
        Ok(())
    }
}

/// Untyped outcome as handed over by a practice screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcomeInput {
    pub emotion_target: String,
    #[serde(default)]
    pub emotion_recognized: Option<String>,
    pub is_correct: bool,
    pub response_time_seconds: f64,
    pub modality: String,
}

impl TryFrom<RoundOutcomeInput> for RoundOutcome {
    type Error = ValidationError;

    fn try_from(input: RoundOutcomeInput) -> Result<Self, Self::Error> {
        let emotion_target = catalog::lookup(&input.emotion_target)
            .ok_or_else(|| ValidationError::UnknownEmotion(input.emotion_target.clone()))?;

        // Blank recognitions mean the classifier returned nothing
        let emotion_recognized = match input.emotion_recognized.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => Some(
                catalog::lookup(label)
                    .ok_or_else(|| ValidationError::UnknownEmotion(label.to_string()))?,
            ),
        };

        let modality = Modality::parse(&input.modality)
            .ok_or_else(|| ValidationError::UnknownModality(input.modality.clone()))?;

        let outcome = RoundOutcome {
            emotion_target,
            emotion_recognized,
            is_correct: input.is_correct,
            response_time_seconds: input.response_time_seconds,
            modality,
        };
        outcome.validate()?;
        Ok(outcome)
    }
}

// ==================== Affect ====================

/// Inferred learner affect, reported by an external monitoring collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffectState {
    Frustrated,
    Confident,
    Confused,
    Engaged,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalState {
    pub primary: AffectState,
    pub intensity: f64,
    pub confidence: f64,
}

impl EmotionalState {
    pub fn new(primary: AffectState, intensity: f64, confidence: f64) -> Self {
        Self {
            primary,
            intensity,
            confidence,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [("intensity", self.intensity), ("confidence", self.confidence)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::InvalidAffectReading(format!(
                    "{name} {value} outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

// ==================== Mastery ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Flat,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryClassification {
    Struggling,
    Learning,
    Proficient,
    Mastered,
}

impl MasteryClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Struggling => "struggling",
            Self::Learning => "learning",
            Self::Proficient => "proficient",
            Self::Mastered => "mastered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionMasteryState {
    pub emotion: EmotionId,
    pub accuracy: f64,
    pub trend: Trend,
    pub classification: MasteryClassification,
    /// Attempts inside the evaluated window
    pub attempts: usize,
}

// ==================== Difficulty ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyDelta {
    Increase,
    Decrease,
    Maintain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterventionKind {
    BreakTime,
    CalmingExercise,
    ClearerInstructions,
    VisualHints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAdjustment {
    pub difficulty_delta: DifficultyDelta,
    pub time_limit_delta_seconds: i32,
    pub emotion_focus: Vec<EmotionId>,
    pub interventions: Vec<InterventionKind>,
}

impl DifficultyAdjustment {
    pub fn maintain(focus: Vec<EmotionId>) -> Self {
        Self {
            difficulty_delta: DifficultyDelta::Maintain,
            time_limit_delta_seconds: 0,
            emotion_focus: focus,
            interventions: Vec::new(),
        }
    }

    pub fn push_intervention(&mut self, kind: InterventionKind) {
        if !self.interventions.contains(&kind) {
            self.interventions.push(kind);
        }
    }
}

// ==================== Sessions ====================

/// A completed session as stored in the learner's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub session_id: Uuid,
    pub modality: Modality,
    pub rounds: u32,
    pub correct: u32,
    pub accuracy: f64,
    pub score: u64,
    pub emotions_practiced: BTreeSet<EmotionId>,
    pub completed_at: DateTime<Utc>,
}

impl RoundSummary {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.correct > self.rounds {
            return Err(ValidationError::InvalidSummary(format!(
                "{} correct out of {} rounds",
                self.correct, self.rounds
            )));
        }
        if !self.accuracy.is_finite() || !(0.0..=1.0).contains(&self.accuracy) {
            return Err(ValidationError::InvalidSummary(format!(
                "accuracy {} outside [0, 1]",
                self.accuracy
            )));
        }
        let expected = if self.rounds == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.rounds)
        };
        if (self.accuracy - expected).abs() > 1e-9 {
            return Err(ValidationError::InvalidSummary(format!(
                "accuracy {} does not match {} correct out of {} rounds",
                self.accuracy, self.correct, self.rounds
            )));
        }
        Ok(())
    }

    pub fn is_perfect(&self) -> bool {
        self.rounds > 0 && self.correct == self.rounds
    }
}

/// A batch of rounds from one session, merged atomically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub modality: Modality,
    pub outcomes: Vec<RoundOutcome>,
}

// ==================== Learner Record ====================

/// Lifetime counters and rolling attempt window for one emotion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionStats {
    pub attempts: u64,
    pub correct: u64,
    /// Most recent outcomes, oldest first
    pub recent: Vec<RoundOutcome>,
}

impl EmotionStats {
    pub fn push(&mut self, outcome: RoundOutcome, window: usize) {
        self.attempts += 1;
        if outcome.is_correct {
            self.correct += 1;
        }
        self.recent.push(outcome);
        if self.recent.len() > window {
            let excess = self.recent.len() - window;
            self.recent.drain(..excess);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProgress {
    pub current_level: u32,
    pub total_sessions: u64,
    pub total_score: u64,
    pub total_correct_answers: u64,
    pub total_questions: u64,
    pub overall_accuracy: f64,
    pub current_streak: u32,
    pub best_streak: u32,
    pub unlocked_emotions: BTreeSet<EmotionId>,
    pub session_history: Vec<RoundSummary>,
    pub achievements_unlocked: BTreeSet<AchievementId>,
    #[serde(default)]
    pub emotion_stats: BTreeMap<EmotionId, EmotionStats>,
    pub updated_at: DateTime<Utc>,
}

impl LearnerProgress {
    /// Fresh record for a new account: level 1 with the basic tier open
    pub fn new() -> Self {
        Self {
            current_level: 1,
            total_sessions: 0,
            total_score: 0,
            total_correct_answers: 0,
            total_questions: 0,
            overall_accuracy: 0.0,
            current_streak: 0,
            best_streak: 0,
            unlocked_emotions: catalog::tier_members(Tier::Basic).collect(),
            session_history: Vec::new(),
            achievements_unlocked: BTreeSet::new(),
            emotion_stats: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn recompute_accuracy(&mut self) {
        self.overall_accuracy = if self.total_questions == 0 {
            0.0
        } else {
            self.total_correct_answers as f64 / self.total_questions as f64
        };
    }

    /// Accuracy of the most recent session, falling back to lifetime accuracy
    pub fn last_session_accuracy(&self) -> f64 {
        self.session_history
            .first()
            .map(|summary| summary.accuracy)
            .unwrap_or(self.overall_accuracy)
    }

    pub fn recent_outcomes(&self, emotion: EmotionId) -> &[RoundOutcome] {
        self.emotion_stats
            .get(&emotion)
            .map(|stats| stats.recent.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_unlocked(&self, emotion: EmotionId) -> bool {
        self.unlocked_emotions.contains(&emotion)
    }
}

impl Default for LearnerProgress {
    fn default() -> Self {
        Self::new()
    }
}
