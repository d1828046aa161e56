//! Operations a UI shell calls. Each returns a `CommandResult` so failures reach
//! the caller as data instead of panics.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};

use crate::dates::day_of;
use crate::events::{HabitView, StatePayload};
use crate::models::{NewHabit, Settings, SettingsFile};
use crate::notifier::Notifier;
use crate::state::AppState;
use crate::storage::{Storage, StorageError};

#[derive(Debug, serde::Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

pub trait CommandCtx {
    fn now(&self) -> DateTime<Local>;
    fn save_settings(&self, file: &SettingsFile) -> Result<(), StorageError>;
    fn emit_state_updated(&self, payload: StatePayload);
    fn request_notification_permission(&self) -> bool;
}

/// Production context: the local clock, settings on disk, and a notifier.
pub struct AppCtx {
    storage: Storage,
    notifier: Arc<dyn Notifier>,
}

impl AppCtx {
    pub fn new(storage: Storage, notifier: Arc<dyn Notifier>) -> Self {
        Self { storage, notifier }
    }
}

impl CommandCtx for AppCtx {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn save_settings(&self, file: &SettingsFile) -> Result<(), StorageError> {
        self.storage.save_settings(file)
    }

    fn emit_state_updated(&self, payload: StatePayload) {
        log::debug!("state updated habits={}", payload.habits.len());
    }

    fn request_notification_permission(&self) -> bool {
        self.notifier.request_permission()
    }
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn publish(ctx: &impl CommandCtx, state: &AppState) {
    let today = day_of(&ctx.now());
    ctx.emit_state_updated(state.payload(today));
}

fn view_of(ctx: &impl CommandCtx, state: &AppState, habit_id: &str) -> Option<HabitView> {
    let today = day_of(&ctx.now());
    let mode = state.settings().streak_mode;
    state
        .store()
        .get(habit_id)
        .map(|habit| HabitView::new(habit, today, mode))
}

pub fn load_state(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<StatePayload> {
    let today = day_of(&ctx.now());
    ok(state.payload(today))
}

/// Creates a habit. A blank name yields `ok(None)`. The first habit with a
/// reminder triggers the one-time notification permission request.
pub fn create_habit(
    ctx: &impl CommandCtx,
    state: &AppState,
    draft: NewHabit,
) -> CommandResult<Option<HabitView>> {
    let wants_reminder = draft.reminder.is_some();
    let now = ctx.now().with_timezone(&Utc);
    let habit = match state.store().add_habit(draft, now) {
        Ok(Some(habit)) => habit,
        Ok(None) => return ok(None),
        Err(error) => return err(&format!("storage error: {error}")),
    };

    if wants_reminder {
        ensure_notification_permission(ctx, state);
    }

    publish(ctx, state);
    ok(view_of(ctx, state, &habit.id))
}

/// Asks for notification permission at startup when stored habits already carry
/// reminders but no grant was saved, e.g. a snapshot copied from another install.
/// Returns whether reminders may fire.
pub fn ensure_reminder_permission(ctx: &impl CommandCtx, state: &AppState) -> bool {
    let has_reminders = state
        .store()
        .habits()
        .iter()
        .any(|habit| habit.reminder.is_some());
    if has_reminders {
        ensure_notification_permission(ctx, state);
    }
    state.settings().notifications_granted
}

fn ensure_notification_permission(ctx: &impl CommandCtx, state: &AppState) {
    let mut settings = state.settings();
    if settings.notifications_granted {
        return;
    }
    if !ctx.request_notification_permission() {
        log::info!("notification permission denied");
        return;
    }
    settings.notifications_granted = true;
    state.update_settings(settings);
    // The grant is still in effect for this session even if it could not be saved.
    if let Err(error) = ctx.save_settings(&state.settings_file()) {
        log::warn!("failed to save notification grant: {error}");
    }
}

/// Toggles today's completion. Unknown ids yield `ok(None)`.
pub fn toggle_habit_today(
    ctx: &impl CommandCtx,
    state: &AppState,
    habit_id: String,
) -> CommandResult<Option<HabitView>> {
    let today = day_of(&ctx.now());
    match state.store().toggle_today(&habit_id, today) {
        Ok(Some(_)) => {}
        Ok(None) => return ok(None),
        Err(error) => return err(&format!("storage error: {error}")),
    }
    publish(ctx, state);
    ok(view_of(ctx, state, &habit_id))
}

/// Deletes a habit; `ok(false)` when the id is unknown.
pub fn delete_habit(
    ctx: &impl CommandCtx,
    state: &AppState,
    habit_id: String,
) -> CommandResult<bool> {
    match state.store().delete_habit(&habit_id) {
        Ok(true) => {
            publish(ctx, state);
            ok(true)
        }
        Ok(false) => ok(false),
        Err(error) => err(&format!("storage error: {error}")),
    }
}

pub fn update_settings(
    ctx: &impl CommandCtx,
    state: &AppState,
    mut settings: Settings,
) -> CommandResult<Settings> {
    let previous = state.settings();
    settings.reminder_interval_secs = settings.reminder_interval_secs.max(1);

    state.update_settings(settings.clone());
    if let Err(error) = ctx.save_settings(&state.settings_file()) {
        // Keep the running app consistent with what is on disk.
        state.update_settings(previous);
        return err(&format!("storage error: {error}"));
    }
    publish(ctx, state);
    ok(settings)
}
