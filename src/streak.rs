//! Streak computation over a habit's completion records.
//!
//! Everything here is pure: "today" is always passed in by the caller.

use chrono::NaiveDate;

use crate::dates::{days_before, previous_day};
use crate::models::{Habit, StreakMode};

pub fn is_completed_today(habit: &Habit, today: NaiveDate) -> bool {
    habit.is_done_on(today)
}

/// Number of consecutive completed days ending today or yesterday.
///
/// A streak whose most recent completion is older than yesterday is broken and
/// reads as 0. Completions after `today` are ignored.
pub fn current_streak(habit: &Habit, today: NaiveDate, mode: StreakMode) -> u32 {
    let sorted: Vec<NaiveDate> = habit
        .completed_dates
        .iter()
        .rev()
        .copied()
        .filter(|day| *day <= today)
        .collect();
    let Some(&most_recent) = sorted.first() else {
        return 0;
    };
    if most_recent != today && most_recent != previous_day(today) {
        return 0;
    }

    let anchor = match mode {
        StreakMode::Anchored => most_recent,
        StreakMode::Literal => today,
    };
    count_back_from(&sorted, anchor)
}

fn count_back_from(sorted_desc: &[NaiveDate], anchor: NaiveDate) -> u32 {
    let mut streak = 0;
    for (offset, completed) in sorted_desc.iter().enumerate() {
        match days_before(anchor, offset as u64) {
            Some(expected) if expected == *completed => streak += 1,
            _ => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const TODAY: (i32, u32, u32) = (2024, 3, 1);

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(TODAY.0, TODAY.1, TODAY.2).unwrap()
    }

    fn ago(days: u64) -> NaiveDate {
        days_before(today(), days).unwrap()
    }

    fn habit_with(days: &[NaiveDate]) -> Habit {
        Habit {
            id: "h".into(),
            name: "Meditate".into(),
            emoji: "🧘".into(),
            color: "#8b5cf6".into(),
            completed_dates: days.iter().copied().collect(),
            reminder: None,
            created_at: Utc::now(),
        }
    }

    fn both_modes(habit: &Habit) -> (u32, u32) {
        (
            current_streak(habit, today(), StreakMode::Anchored),
            current_streak(habit, today(), StreakMode::Literal),
        )
    }

    #[test]
    fn empty_history_has_no_streak() {
        let habit = habit_with(&[]);
        assert_eq!(both_modes(&habit), (0, 0));
        assert!(!is_completed_today(&habit, today()));
    }

    #[test]
    fn only_today_is_a_one_day_streak() {
        let habit = habit_with(&[today()]);
        assert_eq!(both_modes(&habit), (1, 1));
        assert!(is_completed_today(&habit, today()));
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let habit = habit_with(&[today(), ago(1), ago(2)]);
        assert_eq!(both_modes(&habit), (3, 3));
        assert!(is_completed_today(&habit, today()));
    }

    #[test]
    fn streak_ending_yesterday_depends_on_anchor() {
        let habit = habit_with(&[ago(2), ago(1)]);
        assert_eq!(current_streak(&habit, today(), StreakMode::Anchored), 2);
        assert_eq!(current_streak(&habit, today(), StreakMode::Literal), 0);
        assert!(!is_completed_today(&habit, today()));
    }

    #[test]
    fn gap_before_yesterday_breaks_the_streak() {
        let habit = habit_with(&[ago(3)]);
        assert_eq!(both_modes(&habit), (0, 0));

        let habit = habit_with(&[ago(5), ago(4), ago(3), ago(2)]);
        assert_eq!(both_modes(&habit), (0, 0));
    }

    #[test]
    fn walk_stops_at_first_missing_day() {
        let habit = habit_with(&[today(), ago(1), ago(3), ago(4)]);
        assert_eq!(both_modes(&habit), (2, 2));
    }

    #[test]
    fn streak_crosses_month_boundary() {
        // 2024-03-01 back through the leap day.
        let habit = habit_with(&[today(), ago(1), ago(2)]);
        assert_eq!(ago(1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(current_streak(&habit, today(), StreakMode::Anchored), 3);
    }

    #[test]
    fn future_completions_are_ignored() {
        let tomorrow = today().succ_opt().unwrap();
        let habit = habit_with(&[tomorrow, today(), ago(1)]);
        assert_eq!(both_modes(&habit), (2, 2));

        let habit = habit_with(&[tomorrow]);
        assert_eq!(both_modes(&habit), (0, 0));
    }
}
