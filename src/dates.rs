use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::models::ReminderTime;

/// The calendar day of `now` in its own time zone.
pub fn day_of<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

/// `day` minus `count` days, or `None` before the start of the calendar.
pub fn days_before(day: NaiveDate, count: u64) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(count))
}

pub fn minute_of(now: NaiveDateTime) -> ReminderTime {
    ReminderTime::from_time(now.time())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::{America, Asia};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_of_follows_the_clock_time_zone() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        assert_eq!(day_of(&instant), day(2024, 1, 1));
        assert_eq!(day_of(&instant.with_timezone(&Asia::Shanghai)), day(2024, 1, 2));
        assert_eq!(
            day_of(&instant.with_timezone(&America::Los_Angeles)),
            day(2024, 1, 1)
        );
    }

    #[test]
    fn previous_day_crosses_month_and_year_boundaries() {
        assert_eq!(previous_day(day(2024, 3, 1)), day(2024, 2, 29));
        assert_eq!(previous_day(day(2024, 1, 1)), day(2023, 12, 31));
        assert_eq!(previous_day(NaiveDate::MIN), NaiveDate::MIN);
    }

    #[test]
    fn days_before_counts_calendar_days() {
        assert_eq!(days_before(day(2024, 1, 3), 0), Some(day(2024, 1, 3)));
        assert_eq!(days_before(day(2024, 1, 3), 3), Some(day(2023, 12, 31)));
        assert_eq!(days_before(NaiveDate::MIN, 1), None);
    }

    #[test]
    fn minute_of_drops_date_and_seconds() {
        let now = day(2024, 5, 6).and_hms_opt(6, 45, 30).unwrap();
        assert_eq!(minute_of(now).to_string(), "06:45");
    }
}
