//! Round scoring and session summaries.
//!
//! A correct round earns the base points plus a speed bonus: answers under
//! 2s earn the fast bonus, under 5s the quick bonus. Incorrect rounds earn 0.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::config::ScoringParams;
use crate::error::ValidationError;
use crate::types::{Modality, RoundOutcome, RoundSummary};

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    params: ScoringParams,
}

impl Scorer {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn round_points(&self, outcome: &RoundOutcome) -> u64 {
        if !outcome.is_correct {
            return 0;
        }
        self.params.base_points + self.speed_bonus(outcome.response_time_seconds)
    }

    fn speed_bonus(&self, seconds: f64) -> u64 {
        if seconds < self.params.fast_bonus_seconds {
            self.params.fast_bonus_points
        } else if seconds < self.params.quick_bonus_seconds {
            self.params.quick_bonus_points
        } else {
            0
        }
    }

    /// Build the history entry for a finished session.
    pub fn summarize(
        &self,
        modality: Modality,
        outcomes: &[RoundOutcome],
        completed_at: DateTime<Utc>,
    ) -> Result<RoundSummary, ValidationError> {
        if outcomes.is_empty() {
            return Err(ValidationError::EmptySession);
        }
        let rounds = outcomes.len() as u32;
        let correct = outcomes.iter().filter(|o| o.is_correct).count() as u32;
        let emotions_practiced: BTreeSet<_> = outcomes.iter().map(|o| o.emotion_target).collect();

        Ok(RoundSummary {
            session_id: Uuid::new_v4(),
            modality,
            rounds,
            correct,
            accuracy: correct as f64 / rounds as f64,
            score: outcomes.iter().map(|o| self.round_points(o)).sum(),
            emotions_practiced,
            completed_at,
        })
    }
}
