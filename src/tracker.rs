use crate::dates::parse_date;
use crate::habits::HabitDefinition;
use crate::models::{DayRecord, DaySnapshot, Days};
use crate::remote::reconcile;
use crate::stats::{completion_percentage, count_completed};
use crate::storage::CompletionStore;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("unknown habit '{0}'")]
    UnknownHabit(String),
}

/// Record holding every catalog habit, missing ones as not completed.
/// Ids outside the catalog are dropped.
pub fn initialized_record(saved: &DayRecord, catalog: &[HabitDefinition]) -> DayRecord {
    catalog
        .iter()
        .map(|habit| {
            let done = saved.get(habit.id).copied().unwrap_or(false);
            (habit.id.to_string(), done)
        })
        .collect()
}

pub fn snapshot(key: &str, saved: &DayRecord, catalog: &[HabitDefinition]) -> DaySnapshot {
    let habits = initialized_record(saved, catalog);
    DaySnapshot {
        date: key.to_string(),
        completed_count: count_completed(&habits),
        total_count: catalog.len() as u32,
        completion_percentage: completion_percentage(&habits, catalog.len()),
        habits,
    }
}

pub fn day_snapshot(store: &CompletionStore, key: &str, catalog: &[HabitDefinition]) -> DaySnapshot {
    snapshot(key, &store.get_day(key), catalog)
}

/// Flips one habit and writes the full day record back.
pub async fn toggle(
    store: &mut CompletionStore,
    key: &str,
    habit_id: &str,
    catalog: &[HabitDefinition],
) -> Result<DaySnapshot, TrackerError> {
    let current = is_completed(&store.get_day(key), checked_habit(habit_id, catalog)?);
    set_status(store, key, habit_id, !current, catalog).await
}

pub async fn set_status(
    store: &mut CompletionStore,
    key: &str,
    habit_id: &str,
    completed: bool,
    catalog: &[HabitDefinition],
) -> Result<DaySnapshot, TrackerError> {
    let habit_id = checked_habit(habit_id, catalog)?;
    let mut record = initialized_record(&store.get_day(key), catalog);
    record.insert(habit_id.to_string(), completed);

    if !store.set_day(key, record).await {
        debug!("day {key} kept in memory only");
    }
    Ok(day_snapshot(store, key, catalog))
}

fn checked_habit<'a>(
    habit_id: &'a str,
    catalog: &[HabitDefinition],
) -> Result<&'a str, TrackerError> {
    if catalog.iter().any(|habit| habit.id == habit_id) {
        Ok(habit_id)
    } else {
        Err(TrackerError::UnknownHabit(habit_id.to_string()))
    }
}

fn is_completed(record: &DayRecord, habit_id: &str) -> bool {
    record.get(habit_id).copied().unwrap_or(false)
}

/// Applies the remote copy of a day fetched for the signed-in user. The
/// remote only fills a day that is empty locally and has not been written
/// in this process; a lagging mirror can never undo a local write.
pub async fn apply_remote_day(
    store: &mut CompletionStore,
    key: &str,
    remote: Option<DayRecord>,
) -> DayRecord {
    let local = store.get_day(key);
    if !local.is_empty() || store.written_locally(key) {
        return local;
    }
    adopt(store, key, local, remote).await
}

/// Applies every remote day, returning how many local days changed. Days
/// written locally in this process keep their local record, and keys that
/// are not canonical dates are skipped.
pub async fn sync_from_remote(store: &mut CompletionStore, remote_days: Days) -> usize {
    let mut changed = 0;
    for (key, remote) in remote_days {
        if let Err(err) = parse_date(&key) {
            warn!("skipping remote day: {err}");
            continue;
        }
        if store.written_locally(&key) {
            continue;
        }
        let before = store.get_day(&key);
        if adopt(store, &key, before.clone(), Some(remote)).await != before {
            changed += 1;
        }
    }
    info!("synced {changed} days from remote");
    changed
}

async fn adopt(
    store: &mut CompletionStore,
    key: &str,
    local: DayRecord,
    remote: Option<DayRecord>,
) -> DayRecord {
    let winner = reconcile(local.clone(), remote);
    if winner != local {
        debug!("adopting remote record for {key}");
        store.adopt_day(key, winner.clone()).await;
    }
    winner
}
