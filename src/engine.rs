use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::EmotionId;
use crate::config::EngineConfig;
use crate::curriculum::CurriculumSelector;
use crate::error::{EngineError, ValidationError};
use crate::events::{
    diff_events, ObserverRegistry, ProgressEvent, ProgressObserver, RoundRecordedPayload,
    SessionRecordedPayload,
};
use crate::store::ProgressStore;
use crate::types::{
    DifficultyAdjustment, EmotionMasteryState, EmotionalState, LearnerProgress, RoundOutcome,
    RoundSummary, SessionReport,
};

/// Input accepted by [`Engine::apply`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum PracticeEvent {
    Round(RoundOutcome),
    Session(RoundSummary),
    Report(SessionReport),
}

/// Result of one state transition
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub progress: LearnerProgress,
    pub events: Vec<ProgressEvent>,
}

/// Explicit `(LearnerProgress, PracticeEvent) -> LearnerProgress` transition
/// function, with observers notified after each successful merge.
///
/// The engine holds configuration and observers only; learner state is
/// always passed in and handed back.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    selector: CurriculumSelector,
    observers: ObserverRegistry,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let selector = CurriculumSelector::new(&config);
        Self {
            config,
            selector,
            observers: ObserverRegistry::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(EngineConfig::from_env())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn selector(&self) -> &CurriculumSelector {
        &self.selector
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ProgressObserver>) {
        self.observers.subscribe(observer);
    }

    pub fn apply(
        &self,
        progress: &LearnerProgress,
        event: &PracticeEvent,
    ) -> Result<Transition, ValidationError> {
        let (next, mut events) = match event {
            PracticeEvent::Round(outcome) => {
                let next = self.selector.record_round(progress, outcome)?;
                let recorded = ProgressEvent::RoundRecorded(RoundRecordedPayload {
                    emotion: outcome.emotion_target,
                    is_correct: outcome.is_correct,
                    current_streak: next.current_streak,
                    overall_accuracy: next.overall_accuracy,
                });
                (next, vec![recorded])
            }
            PracticeEvent::Session(summary) => {
                let next = self.selector.record_session(progress, summary)?;
                let recorded = session_recorded(&next, summary);
                (next, vec![recorded])
            }
            PracticeEvent::Report(report) => {
                let next = self.selector.record_report(progress, report)?;
                let recorded = next
                    .session_history
                    .first()
                    .map(|summary| session_recorded(&next, summary));
                (next, recorded.into_iter().collect())
            }
        };

        events.extend(diff_events(progress, &next, self.selector.tracker()));
        self.observers.publish(&events);

        Ok(Transition {
            progress: next,
            events,
        })
    }

    /// Load (or create) the learner record, apply `event` and persist the result.
    pub fn commit<S: ProgressStore + ?Sized>(
        &self,
        store: &S,
        learner_id: &str,
        event: &PracticeEvent,
    ) -> Result<Transition, EngineError> {
        let progress = store.load_or_default(learner_id)?;
        let transition = self.apply(&progress, event)?;
        store.save(learner_id, &transition.progress)?;
        tracing::debug!(learner_id, events = transition.events.len(), "Committed progress");
        Ok(transition)
    }

    /// Deterministic when a selection seed is configured.
    pub fn selection_rng(&self) -> ChaCha8Rng {
        match self.config.selection.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    pub fn select_next<R: Rng + ?Sized>(
        &self,
        progress: &LearnerProgress,
        rng: &mut R,
    ) -> Result<EmotionId, ValidationError> {
        self.selector.select_next(progress, rng)
    }

    pub fn next_round(
        &self,
        progress: &LearnerProgress,
        outcome: &RoundOutcome,
        emotional_state: Option<&EmotionalState>,
    ) -> Result<DifficultyAdjustment, ValidationError> {
        self.selector.next_round(progress, outcome, emotional_state)
    }

    pub fn mastery_overview(&self, progress: &LearnerProgress) -> BTreeMap<EmotionId, EmotionMasteryState> {
        self.selector.tracker().classify_all(progress)
    }
}

fn session_recorded(progress: &LearnerProgress, summary: &RoundSummary) -> ProgressEvent {
    ProgressEvent::SessionRecorded(SessionRecordedPayload {
        session_id: summary.session_id,
        accuracy: summary.accuracy,
        total_sessions: progress.total_sessions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::store::MemoryStore;

    #[test]
    fn test_apply_round_emits_round_recorded() {
        let engine = Engine::default();
        let transition = engine
            .apply(
                &LearnerProgress::new(),
                &PracticeEvent::Round(RoundOutcome::new(EmotionId::Happy, true, 1.0)),
            )
            .unwrap();
        assert_eq!(transition.progress.total_questions, 1);
        assert_eq!(transition.events[0].event_type(), "ROUND_RECORDED");
    }

    #[test]
    fn test_observers_see_unlock_events() {
        let log = Arc::new(EventLog::new());
        let mut engine = Engine::default();
        engine.subscribe(log.clone());

        let mut progress = LearnerProgress::new();
        for emotion in [EmotionId::Happy, EmotionId::Sad, EmotionId::Angry] {
            for _ in 0..10 {
                let event = PracticeEvent::Round(RoundOutcome::new(emotion, true, 1.0));
                progress = engine.apply(&progress, &event).unwrap().progress;
            }
        }

        let events = log.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::EmotionsUnlocked(p) if p.emotions.contains(&EmotionId::Fear))));
        assert!(events.iter().any(|e| e.event_type() == "MASTERY_CHANGED"));
    }

    #[test]
    fn test_rejected_input_publishes_nothing() {
        let log = Arc::new(EventLog::new());
        let mut engine = Engine::default();
        engine.subscribe(log.clone());
        let bad = PracticeEvent::Round(RoundOutcome::new(EmotionId::Happy, true, -1.0));
        assert!(engine.apply(&LearnerProgress::new(), &bad).is_err());
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_commit_persists() {
        let engine = Engine::default();
        let store = MemoryStore::new();
        let event = PracticeEvent::Round(RoundOutcome::new(EmotionId::Sad, true, 1.0));
        engine.commit(&store, "learner-1", &event).unwrap();
        engine.commit(&store, "learner-1", &event).unwrap();
        let saved = store.load("learner-1").unwrap().unwrap();
        assert_eq!(saved.total_questions, 2);
        assert_eq!(saved.current_streak, 2);
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let mut config = EngineConfig::default();
        config.selection.seed = Some(99);
        let engine = Engine::new(config);
        let progress = LearnerProgress::new();

        let mut a = engine.selection_rng();
        let mut b = engine.selection_rng();
        let picks_a: Vec<_> = (0..20).map(|_| engine.select_next(&progress, &mut a).unwrap()).collect();
        let picks_b: Vec<_> = (0..20).map(|_| engine.select_next(&progress, &mut b).unwrap()).collect();
        assert_eq!(picks_a, picks_b);
    }

    #[test]
    fn test_select_next_accepts_host_rng() {
        let engine = Engine::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let pick = engine.select_next(&LearnerProgress::new(), &mut rng).unwrap();
        assert!(LearnerProgress::new().is_unlocked(pick));
    }

    #[test]
    fn test_mastery_overview_tracks_unlocks() {
        let engine = Engine::default();
        let mut progress = LearnerProgress::new();
        assert_eq!(
            engine.mastery_overview(&progress).keys().copied().collect::<Vec<_>>(),
            progress.unlocked_emotions.iter().copied().collect::<Vec<_>>()
        );

        for emotion in [EmotionId::Happy, EmotionId::Sad, EmotionId::Angry] {
            for _ in 0..10 {
                let event = PracticeEvent::Round(RoundOutcome::new(emotion, true, 1.0));
                progress = engine.apply(&progress, &event).unwrap().progress;
            }
        }
        let overview = engine.mastery_overview(&progress);
        assert_eq!(overview.len(), 6);
        assert!(overview.keys().all(|emotion| progress.unlocked_emotions.contains(emotion)));
        assert_eq!(overview[&EmotionId::Fear].attempts, 0);
    }

    #[test]
    fn test_session_with_overstated_accuracy_is_rejected() {
        let engine = Engine::default();
        let outcomes: Vec<_> = (0..10)
            .map(|i| RoundOutcome::new(EmotionId::Happy, i == 0, 2.0))
            .collect();
        let mut summary = crate::scoring::Scorer::default()
            .summarize(crate::types::Modality::Visual, &outcomes, chrono::Utc::now())
            .unwrap();
        summary.accuracy = 0.95;

        let result = engine.apply(&LearnerProgress::new(), &PracticeEvent::Session(summary));
        assert!(matches!(
            result.map_err(EngineError::from),
            Err(EngineError::Validation(ValidationError::InvalidSummary(_)))
        ));
    }

    #[test]
    fn test_practice_event_json_shape() {
        let event = PracticeEvent::Round(RoundOutcome::new(EmotionId::Proud, false, 2.5));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "round");
        assert_eq!(json["data"]["emotionTarget"], "proud");
    }
}
