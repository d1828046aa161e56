use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Habit, SettingsFile};

const HABITS_FILE: &str = "habits.json";
const SETTINGS_FILE: &str = "settings.json";
const APP_DIR: &str = "habit-tracker";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("habit snapshot is read-only for this session")]
    ReadOnly,
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Io(err) if err.kind() == ErrorKind::NotFound)
    }
}

/// Where the habit snapshot lives. The whole list is read and written as one unit.
pub trait SnapshotBackend: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<Habit>>, StorageError>;

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError>;

    /// Moves an unreadable snapshot out of the way so the next save does not clobber it.
    fn quarantine(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Default data directory, e.g. `~/.local/share/habit-tracker`.
pub fn default_root() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// JSON files in a single data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn load_habits(&self) -> Result<Option<Vec<Habit>>, StorageError> {
        match self.load_json(self.root.join(HABITS_FILE)) {
            Ok(habits) => Ok(Some(habits)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub fn save_habits(&self, habits: &[Habit]) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(HABITS_FILE), &habits)
    }

    pub fn load_settings(&self) -> Result<SettingsFile, StorageError> {
        self.load_json(self.root.join(SETTINGS_FILE))
    }

    pub fn save_settings(&self, data: &SettingsFile) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(SETTINGS_FILE), data)
    }

    /// Renames the current habit snapshot to `habits-corrupt-<timestamp>.json`, adding a
    /// counter when that name is already taken.
    pub fn quarantine_habits(&self) -> Result<Option<PathBuf>, StorageError> {
        let path = self.root.join(HABITS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%3f").to_string();
        let mut target = self.root.join(format!("habits-corrupt-{timestamp}.json"));
        let mut attempt = 1;
        while target.exists() {
            target = self
                .root
                .join(format!("habits-corrupt-{timestamp}-{attempt}.json"));
            attempt += 1;
        }
        fs::rename(&path, &target)?;
        Ok(Some(target))
    }

    fn load_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, StorageError> {
        let mut file = File::open(path)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic<T: Serialize + ?Sized>(
        &self,
        path: PathBuf,
        data: &T,
    ) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl SnapshotBackend for Storage {
    fn load(&self) -> Result<Option<Vec<Habit>>, StorageError> {
        self.load_habits()
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        self.save_habits(habits)
    }

    fn quarantine(&self) -> Result<(), StorageError> {
        if let Some(path) = self.quarantine_habits()? {
            log::warn!("moved unreadable habit snapshot to {}", path.display());
        }
        Ok(())
    }
}

/// Keeps the serialized snapshot in memory. Useful for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slot: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an already-serialized snapshot, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl SnapshotBackend for MemoryBackend {
    fn load(&self) -> Result<Option<Vec<Habit>>, StorageError> {
        match self.raw() {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, habits: &[Habit]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(habits)?;
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(raw);
        Ok(())
    }

    fn quarantine(&self) -> Result<(), StorageError> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
