use crate::date_stamp::DateStamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Health,
    Work,
    #[serde(rename = "Personal Growth")]
    PersonalGrowth,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Health, Category::Work, Category::PersonalGrowth];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Health => "Health",
            Category::Work => "Work",
            Category::PersonalGrowth => "Personal Growth",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s.trim())
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    Custom,
}

impl ReminderFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderFrequency::Daily => "daily",
            ReminderFrequency::Weekly => "weekly",
            ReminderFrequency::Custom => "custom",
        }
    }
}

impl fmt::Display for ReminderFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "daily" => Ok(ReminderFrequency::Daily),
            "weekly" => Ok(ReminderFrequency::Weekly),
            "custom" => Ok(ReminderFrequency::Custom),
            other => Err(format!("unknown reminder frequency '{other}'")),
        }
    }
}

/// A tracked habit as persisted under the habits key.
///
/// `history` is chronological and holds at most one entry per day;
/// `last_completed_date` mirrors its last element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredHabit")]
pub struct Habit {
    pub name: String,
    pub streak: u32,
    pub category: Category,
    pub reminder_frequency: ReminderFrequency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_interval: Option<u32>,
    pub reminder_time: Option<DateTime<Utc>>,
    pub history: Vec<DateStamp>,
    pub last_completed_date: Option<DateStamp>,
}

/// Interval given to habits stored with the retired `monthly` frequency.
pub const MONTHLY_INTERVAL_DAYS: u32 = 30;

/// Frequencies that may appear in stored data, including retired ones.
#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum StoredFrequency {
    Daily,
    Weekly,
    Custom,
    Monthly,
}

/// Read-side shape of [`Habit`]; tolerates fields older clients omitted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredHabit {
    name: String,
    #[serde(default)]
    streak: u32,
    category: Category,
    reminder_frequency: StoredFrequency,
    #[serde(default)]
    custom_interval: Option<u32>,
    #[serde(default)]
    reminder_time: Option<DateTime<Utc>>,
    #[serde(default)]
    history: Vec<DateStamp>,
    #[serde(default)]
    last_completed_date: Option<DateStamp>,
}

impl From<StoredHabit> for Habit {
    fn from(stored: StoredHabit) -> Self {
        let (reminder_frequency, custom_interval) = match stored.reminder_frequency {
            StoredFrequency::Daily => (ReminderFrequency::Daily, stored.custom_interval),
            StoredFrequency::Weekly => (ReminderFrequency::Weekly, stored.custom_interval),
            StoredFrequency::Custom => (ReminderFrequency::Custom, stored.custom_interval),
            StoredFrequency::Monthly => (
                ReminderFrequency::Custom,
                Some(stored.custom_interval.unwrap_or(MONTHLY_INTERVAL_DAYS)),
            ),
        };
        Self {
            name: stored.name,
            streak: stored.streak,
            category: stored.category,
            reminder_frequency,
            custom_interval,
            reminder_time: stored.reminder_time,
            history: stored.history,
            last_completed_date: stored.last_completed_date,
        }
    }
}

impl Habit {
    /// Repairs records written by older clients: unsorted or repeated
    /// history entries and a missing or stale `last_completed_date`.
    pub fn normalize(&mut self) {
        self.history.sort();
        self.history.dedup();
        self.last_completed_date = self.history.last().copied();
    }

    pub fn completed_on(&self, day: DateStamp) -> bool {
        self.history.binary_search(&day).is_ok()
    }
}

/// Raw input for creating a habit. Fields stay optional text so that
/// missing, null or unknown values surface as validation errors rather than
/// decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub reminder_frequency: Option<String>,
    #[serde(default)]
    pub custom_interval: Option<i64>,
    #[serde(default)]
    pub reminder_time: Option<DateTime<Utc>>,
}

impl NewHabit {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        reminder_frequency: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            category: Some(category.into()),
            reminder_frequency: Some(reminder_frequency.into()),
            ..Self::default()
        }
    }

    pub fn with_custom_interval(mut self, days: i64) -> Self {
        self.custom_interval = Some(days);
        self
    }

    pub fn with_reminder_time(mut self, at: DateTime<Utc>) -> Self {
        self.reminder_time = Some(at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDay {
    pub day: DateStamp,
    pub habits_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitStatus {
    NeverStarted,
    OnStreak,
    Broken,
}

/// Outcome of completing a habit. A repeat on the same day is reported,
/// not treated as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Completed(Habit),
    AlreadyCompletedToday(Habit),
}

impl Completion {
    pub fn habit(&self) -> &Habit {
        match self {
            Completion::Completed(habit) | Completion::AlreadyCompletedToday(habit) => habit,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Completion::Completed(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitFilter {
    #[default]
    All,
    Active,
    Completed,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: HabitFilter,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    #[serde(default)]
    pub date: Option<DateStamp>,
}

#[derive(Debug, Serialize)]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub status: HabitStatus,
}

#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub status: &'static str,
    pub habit: Habit,
}

impl From<Completion> for CompletionResponse {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Completed(habit) => Self {
                status: "completed",
                habit,
            },
            Completion::AlreadyCompletedToday(habit) => Self {
                status: "already_completed_today",
                habit,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub habits_completed: u32,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub habits_completed: u32,
}

#[derive(Debug, Serialize)]
pub struct WeeklyAveragePoint {
    pub week: String,
    pub days_counted: u8,
    pub avg_completed: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub last_7_days: Vec<DailyPoint>,
    pub weekly_totals: Vec<WeeklyPoint>,
    pub weekly_averages: Vec<WeeklyAveragePoint>,
    pub total_completions: u64,
    pub best_day: Option<DailyPoint>,
}
