use crate::models::{DayRecord, Days};
use std::collections::BTreeSet;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

/// Date-keyed completion records backed by a single JSON file.
///
/// Every write replaces a whole day record and then rewrites the file.
/// A failed write is logged and remembered, but the in-memory view keeps
/// the new value. Days written through [`CompletionStore::set_day`] are
/// remembered for the life of the process so remote copies never replace
/// them.
#[derive(Debug)]
pub struct CompletionStore {
    path: PathBuf,
    days: Days,
    written: BTreeSet<String>,
    last_persist_error: Option<String>,
}

impl CompletionStore {
    pub fn new(path: PathBuf) -> Self {
        Self::with_days(path, Days::new())
    }

    pub fn with_days(path: PathBuf, days: Days) -> Self {
        Self {
            path,
            days,
            written: BTreeSet::new(),
            last_persist_error: None,
        }
    }

    /// Missing or corrupt files yield an empty store.
    pub async fn load(path: PathBuf) -> Self {
        let days = load_days(&path).await;
        Self::with_days(path, days)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn days(&self) -> &Days {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn get_day(&self, key: &str) -> DayRecord {
        self.days.get(key).cloned().unwrap_or_default()
    }

    /// Returns whether the file write succeeded.
    pub async fn set_day(&mut self, key: &str, record: DayRecord) -> bool {
        self.written.insert(key.to_string());
        self.days.insert(key.to_string(), record);
        self.persist().await
    }

    /// Stores a record pulled from the remote mirror. Unlike `set_day` the
    /// day is not marked as written locally.
    pub async fn adopt_day(&mut self, key: &str, record: DayRecord) -> bool {
        self.days.insert(key.to_string(), record);
        self.persist().await
    }

    pub fn written_locally(&self, key: &str) -> bool {
        self.written.contains(key)
    }

    pub async fn set_habit(&mut self, key: &str, habit_id: &str, completed: bool) -> bool {
        let mut record = self.get_day(key);
        record.insert(habit_id.to_string(), completed);
        self.set_day(key, record).await
    }

    pub fn get_range(&self, prefix: &str) -> Days {
        range_with_prefix(&self.days, prefix)
    }

    pub async fn clear_all(&mut self) -> bool {
        self.days.clear();
        self.written.clear();
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                self.last_persist_error = None;
                true
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.last_persist_error = None;
                true
            }
            Err(err) => {
                warn!("failed to remove data file {}: {err}", self.path.display());
                self.last_persist_error = Some(err.to_string());
                false
            }
        }
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    async fn persist(&mut self) -> bool {
        match persist_days(&self.path, &self.days).await {
            Ok(()) => {
                self.last_persist_error = None;
                true
            }
            Err(err) => {
                warn!("failed to persist data file {}: {err}", self.path.display());
                self.last_persist_error = Some(err.to_string());
                false
            }
        }
    }
}

/// Entries whose key starts with `prefix`, e.g. `2025-03` or `2025-`.
pub fn range_with_prefix(days: &Days, prefix: &str) -> Days {
    days.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, record)| (key.clone(), record.clone()))
        .collect()
}

pub async fn load_days(path: &Path) -> Days {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(days) => days,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Days::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Days::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Days::default()
        }
    }
}

pub async fn persist_days(path: &Path, days: &Days) -> Result<(), std::io::Error> {
    let payload = serde_json::to_vec_pretty(days)?;
    fs::write(path, payload).await
}
