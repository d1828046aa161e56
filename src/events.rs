use chrono::NaiveDate;

use crate::models::{Habit, Settings, StreakMode};
use crate::streak::{current_streak, is_completed_today};

/// A habit together with the values a list row displays.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub streak: u32,
    pub completed_today: bool,
}

impl HabitView {
    pub fn new(habit: Habit, today: NaiveDate, mode: StreakMode) -> Self {
        let streak = current_streak(&habit, today, mode);
        let completed_today = is_completed_today(&habit, today);
        Self {
            habit,
            streak,
            completed_today,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatePayload {
    pub habits: Vec<HabitView>,
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReminderNotification {
    pub habit_id: String,
    pub title: String,
    pub body: String,
}

impl ReminderNotification {
    pub fn for_habit(habit: &Habit, streak: u32) -> Self {
        Self {
            habit_id: habit.id.clone(),
            title: format!("Time to {}!", habit.name),
            body: format!("Don't break your {streak} day streak!"),
        }
    }
}
