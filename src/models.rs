use crate::dates::DateKey;
use crate::habits::HabitDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Habit id to completion. A missing id means not completed.
pub type DayRecord = BTreeMap<String, bool>;

pub type Days = BTreeMap<DateKey, DayRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HabitStat {
    pub completed: u32,
    pub total: u32,
}

impl HabitStat {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.completed) / f64::from(self.total) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MonthlyStats {
    pub days_tracked: u32,
    pub total_completed: u32,
    pub total_possible: u32,
    pub percentage: f64,
    pub per_habit: BTreeMap<String, HabitStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct YearlyStats {
    pub days_tracked: u32,
    pub total_completed: u32,
    pub total_possible: u32,
    pub percentage: f64,
    pub monthly_percentages: [f64; 12],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub habit_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub habit_id: String,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub date: String,
    pub habits: DayRecord,
    pub completed_count: u32,
    pub total_count: u32,
    pub completion_percentage: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    #[serde(flatten)]
    pub snapshot: DaySnapshot,
    pub display_date: String,
    pub quote: String,
}

#[derive(Debug, Serialize)]
pub struct MonthlyStatsResponse {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub days_in_month: u32,
    #[serde(flatten)]
    pub stats: MonthlyStats,
}

#[derive(Debug, Serialize)]
pub struct YearlyStatsResponse {
    pub year: i32,
    #[serde(flatten)]
    pub stats: YearlyStats,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub habits: &'static [HabitDefinition],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub day_name: &'static str,
    pub completed: u32,
    pub percentage: f64,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub date: String,
    pub completion: f64,
    pub level: u8,
    pub is_today: bool,
    pub is_future: bool,
}

#[derive(Debug, Serialize)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub days: Vec<HeatCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    pub month: u32,
    pub week_index: usize,
}

#[derive(Debug, Serialize)]
pub struct YearHeatmap {
    pub year: i32,
    pub weeks: Vec<[Option<HeatCell>; 7]>,
    pub month_labels: Vec<MonthLabel>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub days_synced: usize,
}
