pub mod commands;
pub mod dates;
pub mod events;
pub mod logging;
pub mod models;
pub mod notifier;
pub mod scheduler;
pub mod state;
pub mod storage;
pub mod store;
pub mod streak;

use std::sync::Arc;

use crate::commands::{ensure_reminder_permission, AppCtx};
#[cfg(all(feature = "app", not(test)))]
use crate::dates::{day_of, local_now};
#[cfg(all(feature = "app", not(test)))]
use crate::logging::init_logging;
#[cfg(all(feature = "app", not(test)))]
use crate::notifier::LogNotifier;
use crate::notifier::Notifier;
#[cfg(all(feature = "app", not(test)))]
use crate::scheduler::start_scheduler;
use crate::state::AppState;
#[cfg(all(feature = "app", not(test)))]
use crate::storage::default_root;
use crate::storage::Storage;
use crate::store::HabitStore;

/// Startup sequence: settings (defaults if missing or unreadable), then the habit
/// snapshot, then the notification grant for habits that already have reminders.
pub fn load_app_state(storage: &Storage, notifier: Arc<dyn Notifier>) -> AppState {
    let settings = match storage.load_settings() {
        Ok(data) => data.settings,
        Err(error) => {
            if !error.is_not_found() {
                log::warn!("settings unreadable, using defaults: {error}");
            }
            Default::default()
        }
    };
    let store = HabitStore::load(Arc::new(storage.clone()));
    let state = AppState::new(store, settings);

    let ctx = AppCtx::new(storage.clone(), notifier);
    if !ensure_reminder_permission(&ctx, &state) {
        log::info!("reminders will not fire until notifications are allowed");
    }
    state
}

/// Loads habits and settings from the data directory and runs the reminder
/// scheduler until Ctrl-C.
#[cfg(all(feature = "app", not(test)))]
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let root = default_root();
    let _logger = init_logging(&root)?;

    let storage = Storage::new(root);
    storage.ensure_dirs()?;
    log::info!("data dir={}", storage.root().display());

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let state = load_app_state(&storage, notifier.clone());

    let today = day_of(&chrono::Local::now());
    for view in state.views(today) {
        log::info!(
            "{} {} streak={} done_today={} reminder={}",
            view.habit.emoji,
            view.habit.name,
            view.streak,
            view.completed_today,
            view.habit
                .reminder
                .map(|time| time.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let scheduler = start_scheduler(state, notifier, local_now);
        tokio::signal::ctrl_c().await?;
        log::info!("shutting down");
        scheduler.stop();
        Ok::<(), std::io::Error>(())
    })?;
    Ok(())
}
