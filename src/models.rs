use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DEFAULT_EMOJI: &str = "⭐";
pub const DEFAULT_COLOR: &str = "#3b82f6";

pub const EMOJI_PALETTE: [&str; 12] = [
    "⭐", "💪", "📚", "🏃", "🧘", "💧", "🎯", "✍️", "🎨", "🎵", "🌱", "🔥",
];

pub const COLOR_PALETTE: [&str; 8] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4", "#84cc16",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid reminder time {0:?}, expected HH:MM")]
pub struct ReminderParseError(pub String);

/// Time of day (minute precision) at which a habit reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderTime {
    hour: u8,
    minute: u8,
}

impl ReminderTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Truncates a wall-clock time to its minute.
    pub fn from_time(time: NaiveTime) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ReminderTime {
    type Err = ReminderParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ReminderParseError(value.to_string());
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl Serialize for ReminderTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReminderTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// Older snapshots may carry `"reminder": ""` for "no reminder".
fn deserialize_reminder<'de, D>(deserializer: D) -> Result<Option<ReminderTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// A tracked habit. The set of habits is persisted as a bare JSON array using
/// camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub color: String,
    #[serde(default)]
    pub completed_dates: BTreeSet<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_reminder"
    )]
    pub reminder: Option<ReminderTime>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn is_done_on(&self, day: NaiveDate) -> bool {
        self.completed_dates.contains(&day)
    }

    /// Flips the completion record for `day` and returns whether the day is now completed.
    pub fn toggle_day(&mut self, day: NaiveDate) -> bool {
        if self.completed_dates.remove(&day) {
            false
        } else {
            self.completed_dates.insert(day);
            true
        }
    }
}

/// Input for creating a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default = "default_emoji")]
    pub emoji: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default, deserialize_with = "deserialize_reminder")]
    pub reminder: Option<ReminderTime>,
}

impl NewHabit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for NewHabit {
    fn default() -> Self {
        Self {
            name: String::new(),
            emoji: default_emoji(),
            color: default_color(),
            reminder: None,
        }
    }
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Which day the streak walk counts back from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreakMode {
    /// Count back from the most recent completed day (today or yesterday).
    #[default]
    Anchored,
    /// Always count back from today, so a streak whose last completion was
    /// yesterday reads as 0.
    Literal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    #[serde(default)]
    pub streak_mode: StreakMode,
    #[serde(default = "default_reminder_interval_secs")]
    pub reminder_interval_secs: u64,
    #[serde(default)]
    pub notifications_granted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            streak_mode: StreakMode::default(),
            reminder_interval_secs: default_reminder_interval_secs(),
            notifications_granted: false,
        }
    }
}

fn default_reminder_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SettingsFile {
    pub schema_version: u32,
    pub settings: Settings,
}
