use crate::events::ReminderNotification;

/// Delivers reminder notifications to the user.
pub trait Notifier: Send + Sync {
    /// Asks the user once for permission to show notifications.
    fn request_permission(&self) -> bool;

    fn notify(&self, notification: &ReminderNotification);
}

/// Writes notifications to the log. Used by the headless runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn request_permission(&self) -> bool {
        true
    }

    fn notify(&self, notification: &ReminderNotification) {
        log::info!(
            target: "reminder",
            "{} {} (habit {})",
            notification.title,
            notification.body,
            notification.habit_id
        );
    }
}
