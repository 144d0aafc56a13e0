//! # emotion-curriculum - adaptive progression engine for emotion practice
//!
//! Turns raw practice results (picture games, speech attempts, facial
//! mimicry, conversations) into a learner's cumulative mastery state and
//! decides what to practice next.
//!
//! ## Module structure
//!
//! - [`catalog`] - emotion registry and mastery tiers
//! - [`mastery`] - per-emotion classification over a rolling window
//! - [`progression`] - tier-gated unlocks and monotonic levels
//! - [`difficulty`] - per-round difficulty and supportive interventions
//! - [`curriculum`] - next-emotion selection and the progress merge boundary
//! - [`scoring`], [`achievements`] - points, session summaries, awards
//! - [`engine`] - state-transition façade with observer notification
//! - [`events`] - progress events and observers
//! - [`store`] - learner record persistence adapters
//! - [`config`], [`logging`], [`error`] - ambient plumbing
//!
//! ## Example
//!
//! ```rust
//! use emotion_curriculum::{Engine, EmotionId, LearnerProgress, PracticeEvent, RoundOutcome};
//!
//! let engine = Engine::default();
//! let progress = LearnerProgress::new();
//!
//! let outcome = RoundOutcome::new(EmotionId::Happy, true, 1.4);
//! let transition = engine.apply(&progress, &PracticeEvent::Round(outcome.clone())).unwrap();
//! assert_eq!(transition.progress.current_streak, 1);
//!
//! let mut rng = engine.selection_rng();
//! let next = engine.select_next(&transition.progress, &mut rng).unwrap();
//! assert!(transition.progress.is_unlocked(next));
//!
//! let adjustment = engine.next_round(&transition.progress, &outcome, None).unwrap();
//! println!("{:?}", adjustment.difficulty_delta);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod achievements;
pub mod catalog;
pub mod config;
pub mod curriculum;
pub mod difficulty;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod mastery;
pub mod progression;
pub mod scoring;
pub mod store;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use achievements::AchievementId;
pub use catalog::{EmotionId, Tier};
pub use config::EngineConfig;
pub use curriculum::{weighted_pick, CurriculumSelector};
pub use difficulty::DifficultyAdapter;
pub use engine::{Engine, PracticeEvent, Transition};
pub use error::{EngineError, StoreError, ValidationError};
pub use events::{EventLog, ProgressEvent, ProgressObserver};
pub use mastery::MasteryTracker;
pub use progression::ProgressionPolicy;
pub use scoring::Scorer;
pub use store::{JsonFileStore, MemoryStore, ProgressStore};
pub use types::*;
