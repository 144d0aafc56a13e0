use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::achievements::AchievementId;
use crate::catalog::EmotionId;
use crate::mastery::MasteryTracker;
use crate::types::{LearnerProgress, MasteryClassification};

/// State changes announced after a successful merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ProgressEvent {
    #[serde(rename = "ROUND_RECORDED")]
    RoundRecorded(RoundRecordedPayload),

    #[serde(rename = "SESSION_RECORDED")]
    SessionRecorded(SessionRecordedPayload),

    #[serde(rename = "LEVEL_UP")]
    LevelUp(LevelUpPayload),

    #[serde(rename = "EMOTIONS_UNLOCKED")]
    EmotionsUnlocked(EmotionsUnlockedPayload),

    #[serde(rename = "MASTERY_CHANGED")]
    MasteryChanged(MasteryChangedPayload),

    #[serde(rename = "ACHIEVEMENT_UNLOCKED")]
    AchievementUnlocked(AchievementUnlockedPayload),
}

impl ProgressEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ProgressEvent::RoundRecorded(_) => "ROUND_RECORDED",
            ProgressEvent::SessionRecorded(_) => "SESSION_RECORDED",
            ProgressEvent::LevelUp(_) => "LEVEL_UP",
            ProgressEvent::EmotionsUnlocked(_) => "EMOTIONS_UNLOCKED",
            ProgressEvent::MasteryChanged(_) => "MASTERY_CHANGED",
            ProgressEvent::AchievementUnlocked(_) => "ACHIEVEMENT_UNLOCKED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecordedPayload {
    pub emotion: EmotionId,
    pub is_correct: bool,
    pub current_streak: u32,
    pub overall_accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecordedPayload {
    pub session_id: Uuid,
    pub accuracy: f64,
    pub total_sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelUpPayload {
    pub from: u32,
    pub to: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionsUnlockedPayload {
    pub emotions: Vec<EmotionId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryChangedPayload {
    pub emotion: EmotionId,
    pub from: MasteryClassification,
    pub to: MasteryClassification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementUnlockedPayload {
    pub achievement: AchievementId,
}

/// Level, unlock, mastery and achievement changes between two snapshots.
pub fn diff_events(
    before: &LearnerProgress,
    after: &LearnerProgress,
    tracker: &MasteryTracker,
) -> Vec<ProgressEvent> {
    let mut events = Vec::new();

    for &emotion in after.emotion_stats.keys() {
        let from = tracker.classify_progress(before, emotion).classification;
        let to = tracker.classify_progress(after, emotion).classification;
        if from != to {
            events.push(ProgressEvent::MasteryChanged(MasteryChangedPayload { emotion, from, to }));
        }
    }

    let unlocked: Vec<_> = after
        .unlocked_emotions
        .difference(&before.unlocked_emotions)
        .copied()
        .collect();
    if !unlocked.is_empty() {
        events.push(ProgressEvent::EmotionsUnlocked(EmotionsUnlockedPayload { emotions: unlocked }));
    }

    if after.current_level > before.current_level {
        events.push(ProgressEvent::LevelUp(LevelUpPayload {
            from: before.current_level,
            to: after.current_level,
        }));
    }

    for &achievement in after.achievements_unlocked.difference(&before.achievements_unlocked) {
        events.push(ProgressEvent::AchievementUnlocked(AchievementUnlockedPayload { achievement }));
    }

    events
}

// ==================== Observers ====================

pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Fan-out of events to registered observers, in registration order
#[derive(Default, Clone)]
pub struct ObserverRegistry {
    observers: Vec<Arc<dyn ProgressObserver>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&self, events: &[ProgressEvent]) {
        for event in events {
            tracing::debug!(event_type = event.event_type(), "Publishing progress event");
            for observer in &self.observers {
                observer.on_event(event);
            }
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Observer that keeps every event it sees
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ProgressEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn drain(&self) -> Vec<ProgressEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl ProgressObserver for EventLog {
    fn on_event(&self, event: &ProgressEvent) {
        self.events.lock().push(event.clone());
    }
}
