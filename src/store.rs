use crate::date_stamp::DateStamp;
use crate::errors::HabitError;
use crate::models::{Completion, Habit, NewHabit};
use crate::progress::ProgressAggregator;
use crate::rules::{self, StreakPolicy};
use crate::storage::{Document, HABITS_KEY, KeyValueStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// The canonical habit collection.
///
/// Mutations queue on one lock and only touch memory once the new
/// collection has been written, so callers see either the state before a
/// call or the state after it.
pub struct HabitStore<S> {
    storage: Arc<S>,
    habits: Mutex<Document<Vec<Habit>>>,
    progress: ProgressAggregator<S>,
    policy: StreakPolicy,
}

impl<S: KeyValueStore> HabitStore<S> {
    pub async fn load(storage: Arc<S>, policy: StreakPolicy) -> Result<Self, HabitError> {
        let mut habits: Document<Vec<Habit>> = Document::load(storage.as_ref(), HABITS_KEY).await?;
        habits.repair(|habits| habits.iter_mut().for_each(Habit::normalize));
        let progress = ProgressAggregator::load(Arc::clone(&storage)).await?;
        info!(habits = habits.get().len(), ?policy, "habit store loaded");

        Ok(Self {
            storage,
            habits: Mutex::new(habits),
            progress,
            policy,
        })
    }

    pub fn progress(&self) -> &ProgressAggregator<S> {
        &self.progress
    }

    pub async fn create(&self, input: NewHabit) -> Result<Habit, HabitError> {
        let mut doc = self.habits.lock().await;
        let habit = rules::validate_new_habit(&input, doc.get())?;

        let mut next = doc.get().clone();
        next.push(habit.clone());
        doc.commit(self.storage.as_ref(), next).await?;

        info!(
            name = %habit.name,
            category = %habit.category,
            frequency = %habit.reminder_frequency,
            "habit created"
        );
        Ok(habit)
    }

    /// Removes the named habit. Returns whether anything was removed.
    pub async fn delete(&self, name: &str) -> Result<bool, HabitError> {
        let mut doc = self.habits.lock().await;
        if !doc.get().iter().any(|habit| habit.name == name) {
            return Ok(false);
        }

        let next = doc.get().iter().filter(|habit| habit.name != name).cloned().collect();
        doc.commit(self.storage.as_ref(), next).await?;
        info!(name, "habit deleted");
        Ok(true)
    }

    pub async fn complete_today(&self, name: &str) -> Result<Completion, HabitError> {
        self.complete(name, DateStamp::today()).await
    }

    pub async fn complete(&self, name: &str, day: DateStamp) -> Result<Completion, HabitError> {
        let mut doc = self.habits.lock().await;
        let index = doc
            .get()
            .iter()
            .position(|habit| habit.name == name)
            .ok_or_else(|| HabitError::NotFound(name.to_string()))?;
        let previous = doc.get().clone();

        let Some(updated) = rules::apply_completion(&previous[index], day, self.policy)? else {
            info!(name, %day, "habit already completed today");
            return Ok(Completion::AlreadyCompletedToday(previous[index].clone()));
        };

        let mut next = previous.clone();
        next[index] = updated.clone();
        doc.commit(self.storage.as_ref(), next).await?;

        if let Err(first) = self.progress.record_completion(day).await {
            warn!(name, %day, error = %first, "progress not recorded, retrying once");
            if let Err(err) = self.progress.record_completion(day).await {
                warn!(name, %day, error = %err, "progress not recorded, rolling back completion");
                if let Err(rollback) = doc.commit(self.storage.as_ref(), previous).await {
                    error!(name, %day, error = %rollback, "rollback of completion failed");
                    return Err(HabitError::ProgressNotRecorded {
                        name: name.to_string(),
                        day,
                        source: Box::new(err),
                    });
                }
                return Err(err);
            }
        }

        info!(name, %day, streak = updated.streak, "habit completed");
        Ok(Completion::Completed(updated))
    }

    pub async fn get(&self, name: &str) -> Option<Habit> {
        self.habits.lock().await.get().iter().find(|habit| habit.name == name).cloned()
    }

    pub async fn list(&self) -> Vec<Habit> {
        self.habits.lock().await.get().clone()
    }

    /// Habits that are waiting on the user as of `today`: never started, or
    /// lapsed past their cadence.
    pub async fn list_active(&self, today: DateStamp) -> Vec<Habit> {
        self.filtered(|habit| rules::is_active(habit, today)).await
    }

    /// Habits currently kept up within their cadence.
    pub async fn list_completed(&self, today: DateStamp) -> Vec<Habit> {
        self.filtered(|habit| !rules::is_active(habit, today)).await
    }

    async fn filtered(&self, keep: impl Fn(&Habit) -> bool) -> Vec<Habit> {
        self.habits
            .lock()
            .await
            .get()
            .iter()
            .filter(|habit| keep(habit))
            .cloned()
            .collect()
    }
}
