use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::task::JoinHandle;

use crate::dates::minute_of;
use crate::events::ReminderNotification;
use crate::models::{Habit, Settings};
use crate::notifier::Notifier;
use crate::state::AppState;
use crate::streak::{current_streak, is_completed_today};

/// Habit id -> day its reminder last fired. Kept in memory only.
pub type FiredLog = HashMap<String, NaiveDate>;

/// Stops the reminder loop when stopped or dropped.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the periodic reminder check on the current tokio runtime. `clock`
/// returns the local wall-clock time.
pub fn start_scheduler<C>(
    state: AppState,
    notifier: Arc<dyn Notifier>,
    clock: C,
) -> SchedulerHandle
where
    C: Fn() -> NaiveDateTime + Send + 'static,
{
    let period = Duration::from_secs(state.settings().reminder_interval_secs.max(1));
    log::info!("reminder scheduler started period_secs={}", period.as_secs());
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut fired = FiredLog::new();
        loop {
            interval.tick().await;
            let due = collect_due_reminders(
                &state.store().habits(),
                &state.settings(),
                clock(),
                &mut fired,
            );
            for notification in &due {
                notifier.notify(notification);
            }
        }
    });
    SchedulerHandle { task }
}

/// Reminders whose time matches `now`'s minute, for habits not yet done today.
/// Each habit fires at most once per day; `fired` records what already went out.
pub fn collect_due_reminders(
    habits: &[Habit],
    settings: &Settings,
    now: NaiveDateTime,
    fired: &mut FiredLog,
) -> Vec<ReminderNotification> {
    if !settings.notifications_granted {
        return Vec::new();
    }
    let today = now.date();
    let minute = minute_of(now);
    fired.retain(|_, day| *day == today);

    let mut due = Vec::new();
    for habit in habits {
        if habit.reminder != Some(minute) {
            continue;
        }
        if is_completed_today(habit, today) {
            continue;
        }
        if fired.get(&habit.id) == Some(&today) {
            continue;
        }
        let streak = current_streak(habit, today, settings.streak_mode);
        log::debug!("reminder due id={} streak={streak}", habit.id);
        fired.insert(habit.id.clone(), today);
        due.push(ReminderNotification::for_habit(habit, streak));
    }
    due
}
