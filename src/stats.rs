use crate::dates::{
    self, day_of_week, format_date, last_n_days_from, month_prefix, short_day_name, year_prefix,
    year_week_grid,
};
use crate::habits::HabitDefinition;
use crate::models::{
    DailyPoint, DayRecord, Days, HabitStat, HeatCell, MonthCalendar, MonthLabel, MonthlyStats,
    YearHeatmap, YearlyStats,
};
use crate::storage::range_with_prefix;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

pub fn count_completed(record: &DayRecord) -> u32 {
    record.values().filter(|done| **done).count() as u32
}

/// Share of the catalog completed in `record`, 0 to 100. An empty catalog
/// yields 0.
pub fn completion_percentage(record: &DayRecord, catalog_size: usize) -> f64 {
    completion_fraction(record, catalog_size) * 100.0
}

fn completion_fraction(record: &DayRecord, catalog_size: usize) -> f64 {
    ratio(count_completed(record), catalog_size as u32).min(1.0)
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

/// Only days present in `days` count as tracked; untracked days do not
/// lower the percentage.
pub fn monthly_stats(
    days: &Days,
    year: i32,
    month0: u32,
    catalog: &[HabitDefinition],
) -> MonthlyStats {
    let month = range_with_prefix(days, &month_prefix(year, month0));
    let days_tracked = month.len() as u32;
    let total_possible = days_tracked * catalog.len() as u32;

    let mut per_habit: BTreeMap<String, HabitStat> = catalog
        .iter()
        .map(|habit| {
            (
                habit.id.to_string(),
                HabitStat {
                    completed: 0,
                    total: days_tracked,
                },
            )
        })
        .collect();

    let mut total_completed = 0u32;
    for record in month.values() {
        for (habit_id, done) in record {
            if !done {
                continue;
            }
            total_completed += 1;
            if let Some(stat) = per_habit.get_mut(habit_id) {
                stat.completed += 1;
            }
        }
    }

    MonthlyStats {
        days_tracked,
        total_completed,
        total_possible,
        percentage: ratio(total_completed, total_possible) * 100.0,
        per_habit,
    }
}

pub fn yearly_stats(days: &Days, year: i32, catalog: &[HabitDefinition]) -> YearlyStats {
    let catalog_size = catalog.len() as u32;
    let mut completed_by_month = [0u32; 12];
    let mut tracked_by_month = [0u32; 12];

    for (key, record) in range_with_prefix(days, &year_prefix(year)) {
        let Some(month0) = month_index(&key) else {
            continue;
        };
        completed_by_month[month0] += count_completed(&record);
        tracked_by_month[month0] += 1;
    }

    let days_tracked: u32 = tracked_by_month.iter().sum();
    let total_completed: u32 = completed_by_month.iter().sum();
    let total_possible = days_tracked * catalog_size;

    let mut monthly_percentages = [0.0; 12];
    for (month0, percentage) in monthly_percentages.iter_mut().enumerate() {
        *percentage = ratio(
            completed_by_month[month0],
            tracked_by_month[month0] * catalog_size,
        ) * 100.0;
    }

    YearlyStats {
        days_tracked,
        total_completed,
        total_possible,
        percentage: ratio(total_completed, total_possible) * 100.0,
        monthly_percentages,
    }
}

fn month_index(key: &str) -> Option<usize> {
    let month: usize = key.get(5..7)?.parse().ok()?;
    (1..=12).contains(&month).then(|| month - 1)
}

/// Buckets a completion fraction into 0..=5 for calendar and heatmap
/// shading.
pub fn heat_level(fraction: f64) -> u8 {
    if fraction <= 0.0 {
        0
    } else if fraction < 0.25 {
        1
    } else if fraction < 0.5 {
        2
    } else if fraction < 0.75 {
        3
    } else if fraction < 1.0 {
        4
    } else {
        5
    }
}

fn heat_cell(days: &Days, key: String, catalog_size: usize) -> HeatCell {
    let completion = days
        .get(&key)
        .map(|record| completion_fraction(record, catalog_size))
        .unwrap_or(0.0);
    HeatCell {
        is_today: dates::is_today(&key),
        is_future: dates::is_future(&key),
        date: key,
        completion,
        level: heat_level(completion),
    }
}

/// The seven days ending at `today`.
pub fn daily_chart(days: &Days, today: NaiveDate, catalog: &[HabitDefinition]) -> Vec<DailyPoint> {
    let today_key = format_date(today);
    last_n_days_from(today, 7)
        .into_iter()
        .map(|key| {
            let record = days.get(&key).cloned().unwrap_or_default();
            let weekday = day_of_week(&key).unwrap_or(0);
            DailyPoint {
                day_name: short_day_name(weekday).unwrap_or(""),
                completed: count_completed(&record),
                percentage: completion_percentage(&record, catalog.len()),
                is_today: key == today_key,
                date: key,
            }
        })
        .collect()
}

pub fn month_calendar(
    days: &Days,
    year: i32,
    month0: u32,
    catalog: &[HabitDefinition],
) -> MonthCalendar {
    let leading_blanks = NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .map(|first| first.weekday().num_days_from_sunday())
        .unwrap_or(0);
    let cells = dates::dates_in_month(year, month0)
        .into_iter()
        .map(|key| heat_cell(days, key, catalog.len()))
        .collect();

    MonthCalendar {
        year,
        month: month0,
        leading_blanks,
        days: cells,
    }
}

pub fn year_heatmap(days: &Days, year: i32, catalog: &[HabitDefinition]) -> YearHeatmap {
    let mut month_labels: Vec<MonthLabel> = Vec::with_capacity(12);
    let weeks = year_week_grid(year)
        .into_iter()
        .enumerate()
        .map(|(week_index, week)| {
            week.map(|cell| {
                let key = cell?;
                if let Some(month0) = month_index(&key).map(|m| m as u32) {
                    if month_labels.last().map(|label| label.month) != Some(month0) {
                        month_labels.push(MonthLabel {
                            month: month0,
                            week_index,
                        });
                    }
                }
                Some(heat_cell(days, key, catalog.len()))
            })
        })
        .collect();

    YearHeatmap {
        year,
        weeks,
        month_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habits::catalog;

    fn record(pairs: &[(&str, bool)]) -> DayRecord {
        pairs
            .iter()
            .map(|(id, done)| (id.to_string(), *done))
            .collect()
    }

    fn half_day() -> DayRecord {
        record(&[
            ("sleep", true),
            ("clean-food", true),
            ("water", true),
            ("gym", true),
            ("boxing", false),
        ])
    }

    #[test]
    fn percentage_of_empty_record_is_zero() {
        assert_eq!(completion_percentage(&DayRecord::new(), 8), 0.0);
    }

    #[test]
    fn percentage_counts_true_values() {
        let day = record(&[("a", true), ("b", true), ("c", false)]);
        assert_eq!(completion_percentage(&day, 8), 25.0);
    }

    #[test]
    fn percentage_with_empty_catalog_is_zero() {
        let day = record(&[("a", true)]);
        assert_eq!(completion_percentage(&day, 0), 0.0);
    }

    #[test]
    fn monthly_stats_counts_tracked_days_only() {
        let mut days = Days::new();
        days.insert("2025-03-01".into(), half_day());
        days.insert("2025-03-20".into(), half_day());
        days.insert("2025-04-01".into(), record(&[("sleep", true)]));

        let stats = monthly_stats(&days, 2025, 2, catalog());
        assert_eq!(stats.days_tracked, 2);
        assert_eq!(stats.total_possible, 16);
        assert_eq!(stats.total_completed, 8);
        assert_eq!(stats.percentage, 50.0);
        assert_eq!(
            stats.per_habit["sleep"],
            HabitStat {
                completed: 2,
                total: 2
            }
        );
        assert_eq!(stats.per_habit["boxing"].completed, 0);
        assert_eq!(stats.per_habit["gym"].percentage(), 100.0);
        assert_eq!(stats.per_habit.len(), 8);
    }

    #[test]
    fn monthly_stats_without_days_is_zero() {
        let stats = monthly_stats(&Days::new(), 2025, 2, catalog());
        assert_eq!(stats.days_tracked, 0);
        assert_eq!(stats.total_possible, 0);
        assert_eq!(stats.percentage, 0.0);
        assert_eq!(stats.per_habit["sleep"].percentage(), 0.0);
    }

    #[test]
    fn monthly_stats_with_empty_catalog_is_zero() {
        let mut days = Days::new();
        days.insert("2025-03-01".into(), half_day());
        let stats = monthly_stats(&days, 2025, 2, &[]);
        assert_eq!(stats.days_tracked, 1);
        assert_eq!(stats.total_possible, 0);
        assert_eq!(stats.percentage, 0.0);
        assert!(stats.per_habit.is_empty());
    }

    #[test]
    fn empty_record_still_counts_as_tracked() {
        let mut days = Days::new();
        days.insert("2025-03-01".into(), DayRecord::new());
        let stats = monthly_stats(&days, 2025, 2, catalog());
        assert_eq!(stats.days_tracked, 1);
        assert_eq!(stats.total_possible, 8);
        assert_eq!(stats.percentage, 0.0);
    }

    #[test]
    fn yearly_stats_without_days_is_zero() {
        for year in [1999, 2024, 2025] {
            let stats = yearly_stats(&Days::new(), year, catalog());
            assert_eq!(stats.percentage, 0.0);
            assert_eq!(stats.days_tracked, 0);
            assert!(stats.monthly_percentages.iter().all(|value| *value == 0.0));
        }
    }

    #[test]
    fn yearly_stats_rolls_up_months() {
        let mut days = Days::new();
        days.insert("2025-01-10".into(), half_day());
        days.insert("2025-03-01".into(), half_day());
        days.insert(
            "2025-03-02".into(),
            catalog().iter().map(|h| (h.id.to_string(), true)).collect(),
        );
        days.insert("2024-03-02".into(), half_day());

        let stats = yearly_stats(&days, 2025, catalog());
        assert_eq!(stats.days_tracked, 3);
        assert_eq!(stats.total_completed, 16);
        assert_eq!(stats.total_possible, 24);
        assert_eq!(stats.monthly_percentages[0], 50.0);
        assert_eq!(stats.monthly_percentages[2], 75.0);
        assert_eq!(stats.monthly_percentages[1], 0.0);
        assert!((stats.percentage - 16.0 / 24.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn heat_levels_bucket_fractions() {
        assert_eq!(heat_level(0.0), 0);
        assert_eq!(heat_level(0.125), 1);
        assert_eq!(heat_level(0.25), 2);
        assert_eq!(heat_level(0.5), 3);
        assert_eq!(heat_level(0.75), 4);
        assert_eq!(heat_level(1.0), 5);
    }

    #[test]
    fn daily_chart_covers_last_week() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut days = Days::new();
        days.insert("2026-01-03".into(), half_day());

        let chart = daily_chart(&days, today, catalog());
        assert_eq!(chart.len(), 7);
        assert_eq!(chart[0].date, "2025-12-30");
        assert!(chart[6].is_today);
        assert_eq!(chart[6].day_name, "Mon");
        let point = chart.iter().find(|p| p.date == "2026-01-03").unwrap();
        assert_eq!(point.completed, 4);
        assert_eq!(point.percentage, 50.0);
    }

    #[test]
    fn month_calendar_aligns_first_day() {
        let mut days = Days::new();
        days.insert("2025-02-14".into(), half_day());
        let calendar = month_calendar(&days, 2025, 1, catalog());
        // 2025-02-01 is a Saturday
        assert_eq!(calendar.leading_blanks, 6);
        assert_eq!(calendar.days.len(), 28);
        assert_eq!(calendar.days[13].level, 3);
        assert_eq!(calendar.days[0].level, 0);
    }

    #[test]
    fn year_heatmap_labels_each_month_once() {
        let mut days = Days::new();
        days.insert("2025-01-01".into(), half_day());
        let heatmap = year_heatmap(&days, 2025, catalog());

        assert_eq!(heatmap.weeks.len(), 53);
        assert_eq!(heatmap.month_labels.len(), 12);
        assert_eq!(heatmap.month_labels[0], MonthLabel { month: 0, week_index: 0 });
        let first = heatmap.weeks[0][3].as_ref().unwrap();
        assert_eq!(first.date, "2025-01-01");
        assert_eq!(first.completion, 0.5);
        assert!(heatmap.weeks[0][0].is_none());
    }

    #[test]
    fn cells_flag_today_and_future_days() {
        let past = month_calendar(&Days::new(), 2025, 1, catalog());
        assert!(past.days.iter().all(|cell| !cell.is_today && !cell.is_future));

        let future = month_calendar(&Days::new(), 9999, 0, catalog());
        assert!(future.days.iter().all(|cell| cell.is_future));

        let now = dates::today();
        let current = month_calendar(&Days::new(), now.year(), now.month0(), catalog());
        let today_cell = &current.days[now.day0() as usize];
        assert!(today_cell.is_today);
        assert!(!today_cell.is_future);
        assert_eq!(current.days.iter().filter(|cell| cell.is_today).count(), 1);
    }
}
