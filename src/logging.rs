//! Subscriber setup for hosts embedding the engine.
//!
//! The engine itself only emits `tracing` events; nothing is printed until a
//! host installs a subscriber. [`init_tracing`] installs one that scopes the
//! requested level to this crate (dependencies stay at `warn`) and can mirror
//! output into a daily rolling file.

use std::io;
use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "emotion-curriculum.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Level for `emotion_curriculum` targets (`trace` .. `error`, or `off`)
    pub level: String,
    /// Also write to a daily rolling file in this directory
    pub file_dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_dir: None,
        }
    }
}

impl LogSettings {
    /// Read `EMOTION_CURRICULUM_LOG_LEVEL` and `EMOTION_CURRICULUM_LOG_DIR`.
    /// Setting the directory is what turns file output on.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut settings = Self::default();
        if let Ok(level) = std::env::var("EMOTION_CURRICULUM_LOG_LEVEL") {
            settings.level = level;
        }
        settings.file_dir = std::env::var("EMOTION_CURRICULUM_LOG_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        settings
    }

    fn crate_level(&self) -> String {
        let level = self.level.trim().to_ascii_lowercase();
        if level == "off" || level.parse::<Level>().is_ok() {
            level
        } else {
            "info".to_string()
        }
    }

    pub fn filter(&self) -> EnvFilter {
        EnvFilter::new(format!("warn,emotion_curriculum={}", self.crate_level()))
    }
}

/// Returned by [`init_tracing`]; drop it on shutdown to flush the log file.
pub struct LogGuard {
    file: Option<WorkerGuard>,
    installed: bool,
}

impl LogGuard {
    /// False when another global subscriber was already in place.
    pub fn installed(&self) -> bool {
        self.installed
    }

    pub fn writes_to_file(&self) -> bool {
        self.installed && self.file.is_some()
    }
}

/// Install the global subscriber.
///
/// A second call leaves the first subscriber in place and reports
/// `installed() == false`.
pub fn init_tracing(settings: &LogSettings) -> io::Result<LogGuard> {
    let stdout_layer = fmt::layer().with_target(true);

    let (file_layer, file) = match &settings.file_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .with(settings.filter())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            level = %settings.crate_level(),
            file_dir = ?settings.file_dir,
            "Logging initialised"
        );
    }

    Ok(LogGuard { file, installed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_scopes_level_to_crate() {
        let settings = LogSettings {
            level: "DEBUG".to_string(),
            file_dir: None,
        };
        assert_eq!(settings.crate_level(), "debug");
        assert!(settings.filter().to_string().contains("emotion_curriculum=debug"));
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let settings = LogSettings {
            level: "chatty".to_string(),
            file_dir: None,
        };
        assert_eq!(settings.crate_level(), "info");
    }

    // Only test in this binary that installs a global subscriber.
    #[test]
    fn test_init_writes_file_and_tolerates_second_call() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let settings = LogSettings {
            level: "info".to_string(),
            file_dir: Some(log_dir.clone()),
        };

        let guard = init_tracing(&settings).unwrap();
        assert!(guard.installed());
        assert!(guard.writes_to_file());

        tracing::info!("learner progress merged");
        let again = init_tracing(&LogSettings::default()).unwrap();
        assert!(!again.installed());
        assert!(!again.writes_to_file());
        drop(guard);

        let contents: String = std::fs::read_dir(&log_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX))
            })
            .map(|path| std::fs::read_to_string(path).unwrap())
            .collect();
        assert!(contents.contains("learner progress merged"));
    }
}
