use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Habit, NewHabit};
use crate::storage::{SnapshotBackend, StorageError};

/// The authoritative habit list. Cloning yields another handle to the same list.
///
/// Every mutation is applied to a copy, the copy is saved through the backend,
/// and only then does it replace the in-memory list. A failed save leaves the
/// list untouched.
#[derive(Clone)]
pub struct HabitStore {
    habits: Arc<Mutex<Vec<Habit>>>,
    backend: Arc<dyn SnapshotBackend>,
    read_only: Arc<AtomicBool>,
}

impl HabitStore {
    pub fn new(habits: Vec<Habit>, backend: Arc<dyn SnapshotBackend>) -> Self {
        Self {
            habits: Arc::new(Mutex::new(habits)),
            backend,
            read_only: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reads the persisted snapshot. A missing snapshot starts an empty list; an
    /// unreadable one is quarantined and also starts empty.
    ///
    /// If the unreadable snapshot cannot be moved aside, the store refuses every
    /// save for the rest of the session so the original file is never overwritten.
    pub fn load(backend: Arc<dyn SnapshotBackend>) -> Self {
        let mut read_only = false;
        let habits = match backend.load() {
            Ok(Some(habits)) => habits,
            Ok(None) => Vec::new(),
            Err(err) => {
                log::warn!("habit snapshot unreadable, starting empty: {err}");
                if let Err(err) = backend.quarantine() {
                    log::error!("failed to quarantine habit snapshot, saving disabled: {err}");
                    read_only = true;
                }
                Vec::new()
            }
        };
        log::info!("loaded {} habits", habits.len());
        let store = Self::new(habits, backend);
        store.read_only.store(read_only, Ordering::SeqCst);
        store
    }

    /// True when saves are refused because an unreadable snapshot is still in place.
    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.lock().clone()
    }

    pub fn get(&self, habit_id: &str) -> Option<Habit> {
        self.lock().iter().find(|h| h.id == habit_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Writes the current list, including an empty one.
    pub fn save(&self) -> Result<(), StorageError> {
        if self.is_read_only() {
            return Err(StorageError::ReadOnly);
        }
        let guard = self.lock();
        self.backend.save(&guard)
    }

    /// Returns `Ok(None)` without touching anything when the trimmed name is blank.
    pub fn add_habit(
        &self,
        draft: NewHabit,
        now: DateTime<Utc>,
    ) -> Result<Option<Habit>, StorageError> {
        let name = draft.name.trim();
        if name.is_empty() {
            log::debug!("ignoring habit with blank name");
            return Ok(None);
        }
        let habit = Habit {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            emoji: draft.emoji,
            color: draft.color,
            completed_dates: Default::default(),
            reminder: draft.reminder,
            created_at: now,
        };

        let mut guard = self.lock();
        let mut next = guard.clone();
        next.push(habit.clone());
        self.commit(&mut guard, next)?;
        log::info!("habit added id={} reminder={:?}", habit.id, habit.reminder);
        Ok(Some(habit))
    }

    /// Marks `today` done, or undone if it already was. Returns the new state,
    /// or `Ok(None)` for an unknown id.
    pub fn toggle_today(
        &self,
        habit_id: &str,
        today: NaiveDate,
    ) -> Result<Option<bool>, StorageError> {
        let mut guard = self.lock();
        let Some(index) = guard.iter().position(|h| h.id == habit_id) else {
            log::debug!("toggle ignored, unknown habit id={habit_id}");
            return Ok(None);
        };
        let mut next = guard.clone();
        let completed = next[index].toggle_day(today);
        self.commit(&mut guard, next)?;
        log::debug!("habit toggled id={habit_id} day={today} completed={completed}");
        Ok(Some(completed))
    }

    /// Returns whether a habit was removed.
    pub fn delete_habit(&self, habit_id: &str) -> Result<bool, StorageError> {
        let mut guard = self.lock();
        if !guard.iter().any(|h| h.id == habit_id) {
            log::debug!("delete ignored, unknown habit id={habit_id}");
            return Ok(false);
        }
        let next: Vec<Habit> = guard.iter().filter(|h| h.id != habit_id).cloned().collect();
        self.commit(&mut guard, next)?;
        log::info!("habit deleted id={habit_id}");
        Ok(true)
    }

    fn commit(
        &self,
        guard: &mut MutexGuard<'_, Vec<Habit>>,
        next: Vec<Habit>,
    ) -> Result<(), StorageError> {
        if self.is_read_only() {
            log::warn!("habit change not saved, snapshot is read-only");
            return Err(StorageError::ReadOnly);
        }
        if let Err(err) = self.backend.save(&next) {
            log::error!("failed to save habit snapshot: {err}");
            return Err(err);
        }
        **guard = next;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Habit>> {
        self.habits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
