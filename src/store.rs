//! Learner record persistence.
//!
//! The engine never performs I/O itself; hosts load a snapshot, run it
//! through the engine and save the result. These adapters cover tests,
//! demos and single-device installs.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::LearnerProgress;

pub trait ProgressStore {
    fn load(&self, learner_id: &str) -> Result<Option<LearnerProgress>, StoreError>;

    fn save(&self, learner_id: &str, progress: &LearnerProgress) -> Result<(), StoreError>;

    fn load_or_default(&self, learner_id: &str) -> Result<LearnerProgress, StoreError> {
        Ok(self.load(learner_id)?.unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, LearnerProgress>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ProgressStore for MemoryStore {
    fn load(&self, learner_id: &str) -> Result<Option<LearnerProgress>, StoreError> {
        Ok(self.records.read().get(learner_id).cloned())
    }

    fn save(&self, learner_id: &str, progress: &LearnerProgress) -> Result<(), StoreError> {
        self.records
            .write()
            .insert(learner_id.to_string(), progress.clone());
        Ok(())
    }
}

/// One pretty-printed JSON file per learner under a base directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, learner_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !learner_id.is_empty()
            && learner_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidLearnerId(learner_id.to_string()));
        }
        Ok(self.dir.join(format!("{learner_id}.json")))
    }
}

impl ProgressStore for JsonFileStore {
    fn load(&self, learner_id: &str) -> Result<Option<LearnerProgress>, StoreError> {
        let path = self.path_for(learner_id)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, learner_id: &str, progress: &LearnerProgress) -> Result<(), StoreError> {
        let path = self.path_for(learner_id)?;
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename keeps a crash from leaving a truncated record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(progress)?)?;
        if let Err(err) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        tracing::debug!(learner_id, path = %path.display(), "Saved learner progress");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load("a").unwrap().is_none());

        let mut progress = LearnerProgress::new();
        progress.total_questions = 3;
        store.save("a", &progress).unwrap();
        assert_eq!(store.load("a").unwrap(), Some(progress));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_or_default_creates_fresh_record() {
        let store = MemoryStore::new();
        let progress = store.load_or_default("new-learner").unwrap();
        assert_eq!(progress.current_level, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_json_store_rejects_path_like_ids() {
        let store = JsonFileStore::new("/tmp/unused");
        assert!(matches!(
            store.load("../etc/passwd"),
            Err(StoreError::InvalidLearnerId(_))
        ));
        assert!(matches!(store.load(""), Err(StoreError::InvalidLearnerId(_))));
    }

    #[test]
    fn test_failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory at the record path makes the rename fail
        let blocker = dir.path().join("bob.json");
        fs::create_dir_all(&blocker).unwrap();
        fs::write(blocker.join("keep"), b"x").unwrap();

        let store = JsonFileStore::new(dir.path());
        let result = store.save("bob", &LearnerProgress::new());
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(!dir.path().join("bob.json.tmp").exists());
    }
}
