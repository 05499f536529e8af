//! Pure rules for creating, completing and classifying habits.
//!
//! Nothing here touches storage; the store feeds these functions a snapshot
//! and commits whatever they return.

use crate::date_stamp::DateStamp;
use crate::errors::HabitError;
use crate::models::{Category, Habit, HabitStatus, NewHabit, ReminderFrequency};
use std::str::FromStr;

/// How a completion after a gap affects the streak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreakPolicy {
    /// Every completion adds one, whatever the gap.
    Counter,
    /// A completion later than the habit's cadence restarts the streak at 1.
    #[default]
    Cadence,
}

impl FromStr for StreakPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counter" => Ok(StreakPolicy::Counter),
            "cadence" => Ok(StreakPolicy::Cadence),
            other => Err(format!("unknown streak policy '{other}', expected 'counter' or 'cadence'")),
        }
    }
}

/// Expected number of days between two completions.
pub fn cadence_days(habit: &Habit) -> i64 {
    match habit.reminder_frequency {
        ReminderFrequency::Daily => 1,
        ReminderFrequency::Weekly => 7,
        ReminderFrequency::Custom => i64::from(habit.custom_interval.unwrap_or(1).max(1)),
    }
}

pub fn validate_new_habit(input: &NewHabit, existing: &[Habit]) -> Result<Habit, HabitError> {
    let name = input.name.as_deref().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(HabitError::validation("habit name must not be empty"));
    }
    if existing.iter().any(|habit| habit.name == name) {
        return Err(HabitError::validation(format!("a habit named '{name}' already exists")));
    }

    let category = input
        .category
        .as_deref()
        .ok_or_else(|| HabitError::validation("category is required"))
        .and_then(|raw| Category::from_str(raw).map_err(HabitError::Validation))?;
    let reminder_frequency = input
        .reminder_frequency
        .as_deref()
        .ok_or_else(|| HabitError::validation("reminderFrequency is required"))
        .and_then(|raw| ReminderFrequency::from_str(raw).map_err(HabitError::Validation))?;

    let custom_interval = match (reminder_frequency, input.custom_interval) {
        (ReminderFrequency::Custom, None) => {
            return Err(HabitError::validation("custom frequency requires customInterval"));
        }
        (ReminderFrequency::Custom, Some(days)) => match u32::try_from(days) {
            Ok(days) if days > 0 => Some(days),
            _ => {
                return Err(HabitError::validation(format!(
                    "customInterval must be a positive number of days, got {days}"
                )));
            }
        },
        (_, Some(_)) => {
            return Err(HabitError::validation(
                "customInterval is only allowed with custom frequency",
            ));
        }
        (_, None) => None,
    };

    Ok(Habit {
        name: name.to_string(),
        streak: 0,
        category,
        reminder_frequency,
        custom_interval,
        reminder_time: input.reminder_time,
        history: Vec::new(),
        last_completed_date: None,
    })
}

/// Applies one completion on `day`.
///
/// Returns `Ok(None)` when the habit already has a completion for that day.
/// A day earlier than the last completion is rejected because history only
/// ever grows forward.
pub fn apply_completion(
    habit: &Habit,
    day: DateStamp,
    policy: StreakPolicy,
) -> Result<Option<Habit>, HabitError> {
    if habit.completed_on(day) {
        return Ok(None);
    }

    let streak = match habit.last_completed_date {
        Some(last) if day < last => {
            return Err(HabitError::validation(format!(
                "cannot complete '{}' on {day}: it was last completed on {last}",
                habit.name
            )));
        }
        Some(last) if policy == StreakPolicy::Cadence && day.days_since(last) > cadence_days(habit) => 1,
        _ => habit.streak.saturating_add(1),
    };

    let mut updated = habit.clone();
    updated.history.push(day);
    updated.streak = streak;
    updated.last_completed_date = Some(day);
    Ok(Some(updated))
}

pub fn status(habit: &Habit, today: DateStamp) -> HabitStatus {
    match habit.last_completed_date {
        None => HabitStatus::NeverStarted,
        Some(last) if today.days_since(last) > cadence_days(habit) => HabitStatus::Broken,
        Some(_) => HabitStatus::OnStreak,
    }
}

/// Active habits are the ones waiting on the user: never started, or lapsed.
pub fn is_active(habit: &Habit, today: DateStamp) -> bool {
    status(habit, today) != HabitStatus::OnStreak
}
