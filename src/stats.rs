use crate::date_stamp::DateStamp;
use crate::models::{DailyPoint, ProgressDay, StatsResponse, WeeklyAveragePoint, WeeklyPoint};
use crate::progress::ProgressSeries;
use chrono::{Datelike, Duration, NaiveDate};

pub fn build_stats(series: &ProgressSeries) -> StatsResponse {
    build_stats_at(DateStamp::today().date(), series)
}

pub fn build_stats_at(today: NaiveDate, series: &ProgressSeries) -> StatsResponse {
    const WEEK_COUNT: usize = 8;

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset as i64);
        last_7_days.push(DailyPoint {
            date: date.to_string(),
            habits_completed: count_on(series, date),
        });
    }

    let current_week_start = week_start(today);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);
    let mut weekly_averages = Vec::with_capacity(WEEK_COUNT);

    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let mut sum = 0u32;
        for day_offset in 0..7 {
            sum = sum.saturating_add(count_on(series, start + Duration::days(day_offset)));
        }

        let days_counted = if today < start {
            0
        } else if today > end {
            7
        } else {
            (today - start).num_days() as u8 + 1
        };

        let denom = if days_counted == 0 { 1.0 } else { f64::from(days_counted) };

        weekly_totals.push(WeeklyPoint {
            week: week_label(start),
            start_date: start.to_string(),
            end_date: end.to_string(),
            habits_completed: sum,
        });

        weekly_averages.push(WeeklyAveragePoint {
            week: week_label(start),
            days_counted,
            avg_completed: f64::from(sum) / denom,
        });
    }

    let days = series.days();
    let total_completions = days.iter().map(|day| u64::from(day.habits_completed)).sum();
    // Earliest day wins a tie.
    let best_day = days
        .iter()
        .fold(None, |best: Option<&ProgressDay>, day| match best {
            Some(current) if current.habits_completed >= day.habits_completed => Some(current),
            _ => Some(day),
        })
        .map(|day| DailyPoint {
            date: day.day.to_string(),
            habits_completed: day.habits_completed,
        });

    StatsResponse {
        last_7_days,
        weekly_totals,
        weekly_averages,
        total_completions,
        best_day,
    }
}

fn count_on(series: &ProgressSeries, date: NaiveDate) -> u32 {
    series.count_on(DateStamp::new(date))
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(days: &[(NaiveDate, u32)]) -> ProgressSeries {
        days.iter()
            .map(|&(day, habits_completed)| ProgressDay {
                day: DateStamp::new(day),
                habits_completed,
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn stats_last_7_days_includes_each_day() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let two_days_ago = today - Duration::days(2);
        let data = series(&[(two_days_ago, 3)]);

        let stats = build_stats_at(today, &data);
        assert_eq!(stats.last_7_days.len(), 7);
        let point = stats
            .last_7_days
            .iter()
            .find(|day| day.date == two_days_ago.to_string())
            .expect("missing day");
        assert_eq!(point.habits_completed, 3);
        assert_eq!(stats.last_7_days[6].date, "2026-01-05");
        assert_eq!(stats.last_7_days[6].habits_completed, 0);
    }

    #[test]
    fn stats_weekly_series_lengths() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let stats = build_stats_at(today, &ProgressSeries::default());
        assert_eq!(stats.weekly_totals.len(), 8);
        assert_eq!(stats.weekly_averages.len(), 8);
        assert_eq!(stats.last_7_days.len(), 7);
        assert_eq!(stats.total_completions, 0);
        assert!(stats.best_day.is_none());
    }

    #[test]
    fn current_week_average_uses_days_so_far() {
        // Wednesday; the week started on Monday 2026-01-05.
        let today = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let data = series(&[(monday, 2), (today, 4)]);

        let stats = build_stats_at(today, &data);
        let current = stats.weekly_totals.last().unwrap();
        assert_eq!(current.week, "2026-W02");
        assert_eq!(current.start_date, "2026-01-05");
        assert_eq!(current.habits_completed, 6);

        let average = stats.weekly_averages.last().unwrap();
        assert_eq!(average.days_counted, 3);
        assert!((average.avg_completed - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn totals_and_best_day_cover_the_whole_series() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let old = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let later = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let data = series(&[(old, 5), (later, 5), (today, 1)]);

        let stats = build_stats_at(today, &data);
        assert_eq!(stats.total_completions, 11);
        let best = stats.best_day.unwrap();
        assert_eq!(best.date, "2025-06-01");
        assert_eq!(best.habits_completed, 5);
    }
}
