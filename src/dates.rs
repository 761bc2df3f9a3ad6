use chrono::{Datelike, Duration, Local, NaiveDate};
use thiserror::Error;

/// Canonical `YYYY-MM-DD` key of a calendar day.
pub type DateKey = String;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const SHORT_DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date key '{0}', expected YYYY-MM-DD")]
    InvalidKey(String),
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn today_key() -> DateKey {
    format_date(today())
}

/// Formats the date's own calendar fields, never going through UTC.
pub fn format_date(date: NaiveDate) -> DateKey {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(key: &str) -> Result<NaiveDate, DateError> {
    let invalid = || DateError::InvalidKey(key.to_string());
    let date = NaiveDate::parse_from_str(key, "%Y-%m-%d").map_err(|_| invalid())?;
    // chrono accepts unpadded fields, keys must stay canonical
    if format_date(date) != key {
        return Err(invalid());
    }
    Ok(date)
}

/// Number of days in a 0-based month, computed as the day before the
/// first of the following month. Months past 11 roll into later years.
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    let next = i64::from(year) * 12 + i64::from(month0) + 1;
    let next_year = next.div_euclid(12) as i32;
    let next_month = next.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(0)
}

pub fn dates_in_month(year: i32, month0: u32) -> Vec<DateKey> {
    (1..=days_in_month(year, month0))
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month0 + 1, day))
        .map(format_date)
        .collect()
}

pub fn month_prefix(year: i32, month0: u32) -> String {
    format!("{year:04}-{:02}", month0 + 1)
}

pub fn year_prefix(year: i32) -> String {
    format!("{year:04}-")
}

pub fn last_n_days(n: usize) -> Vec<DateKey> {
    last_n_days_from(today(), n)
}

/// Oldest first, ending at `today` inclusive.
pub fn last_n_days_from(today: NaiveDate, n: usize) -> Vec<DateKey> {
    (0..n)
        .rev()
        .map(|offset| format_date(today - Duration::days(offset as i64)))
        .collect()
}

/// Weeks of `year`, Sunday first. `None` cells pad the first and last
/// week so that every column is one weekday.
pub fn year_week_grid(year: i32) -> Vec<[Option<DateKey>; 7]> {
    let mut weeks = Vec::with_capacity(54);
    let Some(mut current) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return weeks;
    };

    let mut week: [Option<DateKey>; 7] = Default::default();
    while current.year() == year {
        let column = current.weekday().num_days_from_sunday() as usize;
        week[column] = Some(format_date(current));
        if column == 6 {
            weeks.push(std::mem::take(&mut week));
        }
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }
    weeks
}

pub fn month_name(month0: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month0 as usize).copied()
}

pub fn short_month_name(month0: u32) -> Option<&'static str> {
    month_name(month0).map(|name| &name[..3])
}

pub fn short_day_name(weekday0: u32) -> Option<&'static str> {
    SHORT_DAY_NAMES.get(weekday0 as usize).copied()
}

/// 0 = Sunday.
pub fn day_of_week(key: &str) -> Result<u32, DateError> {
    Ok(parse_date(key)?.weekday().num_days_from_sunday())
}

pub fn is_today(key: &str) -> bool {
    key == today_key()
}

pub fn is_future(key: &str) -> bool {
    key > today_key().as_str()
}

/// Long form such as "Monday, March 3".
pub fn display_date(key: &str) -> Result<String, DateError> {
    Ok(parse_date(key)?.format("%A, %B %-d").to_string())
}
