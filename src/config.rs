use serde::{Deserialize, Serialize};
use std::str::FromStr;

const ENV_PREFIX: &str = "EMOTION_CURRICULUM_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MasteryParams {
    /// Most recent attempts considered per emotion
    pub window_size: usize,
    /// Minimum half-window accuracy gap to call a trend
    pub trend_tolerance: f64,
    pub mastered_accuracy: f64,
    pub proficient_accuracy: f64,
    pub learning_accuracy: f64,
    /// Attempts required before a window can count as consistent
    pub consistency_min_attempts: usize,
    /// Outcome variance must stay strictly below this to count as consistent
    pub consistency_max_variance: f64,
}

impl Default for MasteryParams {
    fn default() -> Self {
        Self {
            window_size: 10,
            trend_tolerance: 0.1,
            mastered_accuracy: 0.9,
            proficient_accuracy: 0.7,
            learning_accuracy: 0.5,
            consistency_min_attempts: 5,
            consistency_max_variance: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressionParams {
    pub level_two_accuracy: f64,
    pub level_two_sessions: u64,
    pub level_three_accuracy: f64,
    pub level_three_sessions: u64,
    pub session_history_limit: usize,
}

impl Default for ProgressionParams {
    fn default() -> Self {
        Self {
            level_two_accuracy: 0.6,
            level_two_sessions: 10,
            level_three_accuracy: 0.8,
            level_three_sessions: 20,
            session_history_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DifficultyParams {
    pub decrease_below: f64,
    pub increase_above: f64,
    pub ease_time_delta_seconds: i32,
    pub challenge_time_delta_seconds: i32,
    pub clear_focus_count: usize,
    /// Affect readings below this confidence are ignored
    pub min_affect_confidence: f64,
}

impl Default for DifficultyParams {
    fn default() -> Self {
        Self {
            decrease_below: 0.6,
            increase_above: 0.85,
            ease_time_delta_seconds: 10,
            challenge_time_delta_seconds: -5,
            clear_focus_count: 2,
            min_affect_confidence: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionParams {
    pub struggling_weight: f64,
    pub learning_weight: f64,
    pub proficient_weight: f64,
    pub mastered_weight: f64,
    /// Fixed seed for reproducible selection (tests, demos)
    pub seed: Option<u64>,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            struggling_weight: 3.0,
            learning_weight: 2.0,
            proficient_weight: 1.0,
            mastered_weight: 0.5,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringParams {
    pub base_points: u64,
    pub fast_bonus_seconds: f64,
    pub fast_bonus_points: u64,
    pub quick_bonus_seconds: f64,
    pub quick_bonus_points: u64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_points: 10,
            fast_bonus_seconds: 2.0,
            fast_bonus_points: 5,
            quick_bonus_seconds: 5.0,
            quick_bonus_points: 2,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub mastery: MasteryParams,
    pub progression: ProgressionParams,
    pub difficulty: DifficultyParams,
    pub selection: SelectionParams,
    pub scoring: ScoringParams,
}

impl EngineConfig {
    /// Defaults overridden by `EMOTION_CURRICULUM_*` variables (a `.env` file
    /// is loaded first when present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        override_from_env("MASTERY_WINDOW", &mut config.mastery.window_size);
        override_from_env("TREND_TOLERANCE", &mut config.mastery.trend_tolerance);
        override_from_env("CONSISTENCY_MIN_ATTEMPTS", &mut config.mastery.consistency_min_attempts);
        override_from_env("CONSISTENCY_MAX_VARIANCE", &mut config.mastery.consistency_max_variance);
        override_from_env("HISTORY_LIMIT", &mut config.progression.session_history_limit);
        override_from_env("DECREASE_BELOW", &mut config.difficulty.decrease_below);
        override_from_env("INCREASE_ABOVE", &mut config.difficulty.increase_above);
        override_from_env("MIN_AFFECT_CONFIDENCE", &mut config.difficulty.min_affect_confidence);

        if let Ok(val) = std::env::var(format!("{ENV_PREFIX}SELECTION_SEED")) {
            match val.parse::<u64>() {
                Ok(seed) => config.selection.seed = Some(seed),
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid selection seed"),
            }
        }

        config
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

fn override_from_env<T: FromStr>(key: &str, target: &mut T) {
    let name = format!("{ENV_PREFIX}{key}");
    if let Ok(val) = std::env::var(&name) {
        match val.parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(variable = %name, value = %val, "Ignoring unparseable config override"),
        }
    }
}
