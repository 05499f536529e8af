use crate::date_stamp::DateStamp;
use crate::errors::HabitError;
use crate::models::ProgressDay;
use crate::storage::{Document, KeyValueStore, PROGRESS_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Completion counts keyed by day. Persisted as a JSON array of
/// `{day, habitsCompleted}` objects in day order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ProgressDay>", into = "Vec<ProgressDay>")]
pub struct ProgressSeries {
    days: BTreeMap<DateStamp, u32>,
}

impl ProgressSeries {
    pub fn count_on(&self, day: DateStamp) -> u32 {
        self.days.get(&day).copied().unwrap_or_default()
    }

    pub fn days(&self) -> Vec<ProgressDay> {
        self.days
            .iter()
            .map(|(&day, &habits_completed)| ProgressDay { day, habits_completed })
            .collect()
    }

    fn incremented(&self, day: DateStamp) -> Self {
        let mut next = self.clone();
        let entry = next.days.entry(day).or_default();
        *entry = entry.saturating_add(1);
        next
    }
}

impl From<Vec<ProgressDay>> for ProgressSeries {
    fn from(days: Vec<ProgressDay>) -> Self {
        let mut series = BTreeMap::new();
        // Older data may repeat a day; the counts belong together.
        for ProgressDay { day, habits_completed } in days {
            let entry: &mut u32 = series.entry(day).or_default();
            *entry = entry.saturating_add(habits_completed);
        }
        Self { days: series }
    }
}

impl From<ProgressSeries> for Vec<ProgressDay> {
    fn from(series: ProgressSeries) -> Self {
        series.days()
    }
}

/// Owns the daily completion series and its persistence.
pub struct ProgressAggregator<S> {
    storage: Arc<S>,
    series: Mutex<Document<ProgressSeries>>,
}

impl<S: KeyValueStore> ProgressAggregator<S> {
    pub async fn load(storage: Arc<S>) -> Result<Self, HabitError> {
        let series = Document::load(storage.as_ref(), PROGRESS_KEY).await?;
        Ok(Self {
            storage,
            series: Mutex::new(series),
        })
    }

    /// Counts one completion event on `day`.
    pub async fn record_completion(&self, day: DateStamp) -> Result<u32, HabitError> {
        let mut doc = self.series.lock().await;
        let next = doc.get().incremented(day);
        let count = next.count_on(day);
        doc.commit(self.storage.as_ref(), next).await?;
        info!(%day, habits_completed = count, "progress recorded");
        Ok(count)
    }

    pub async fn series(&self) -> Vec<ProgressDay> {
        self.series.lock().await.get().days()
    }

    pub async fn snapshot(&self) -> ProgressSeries {
        self.series.lock().await.get().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn day(d: u32) -> DateStamp {
        DateStamp::from_ymd(2024, 1, d).unwrap()
    }

    #[tokio::test]
    async fn creates_and_increments_days() {
        let storage = Arc::new(MemoryStore::new());
        let progress = ProgressAggregator::load(Arc::clone(&storage)).await.unwrap();

        assert_eq!(progress.record_completion(day(2)).await.unwrap(), 1);
        assert_eq!(progress.record_completion(day(2)).await.unwrap(), 2);
        assert_eq!(progress.record_completion(day(1)).await.unwrap(), 1);

        let series = progress.series().await;
        assert_eq!(
            series,
            vec![
                ProgressDay { day: day(1), habits_completed: 1 },
                ProgressDay { day: day(2), habits_completed: 2 },
            ]
        );

        let reloaded = ProgressAggregator::load(storage).await.unwrap();
        assert_eq!(reloaded.series().await, series);
    }

    #[test]
    fn wire_format_is_an_array_of_days() {
        let raw = r#"[{"day":"2024-01-02","habitsCompleted":2},{"day":"2024-01-01","habitsCompleted":1},{"day":"2024-01-02","habitsCompleted":1}]"#;
        let series: ProgressSeries = serde_json::from_str(raw).unwrap();
        assert_eq!(series.count_on(day(1)), 1);
        assert_eq!(series.count_on(day(2)), 3);

        let value = serde_json::to_value(&series).unwrap();
        assert_eq!(value[0]["day"], "2024-01-01");
        assert_eq!(value[1]["habitsCompleted"], 3);
    }
}
