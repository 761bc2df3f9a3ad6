use crate::dates::parse_date;
use crate::models::{DayRecord, Days};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("remote document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("remote rejected request: {0}")]
    Rejected(String),
}

/// One stored document per user and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDocument {
    pub user_id: String,
    pub date: String,
    pub habits: DayRecord,
    pub updated_at: String,
}

#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Upserts the day document, replacing its `habits` wholesale.
    async fn put_day(
        &self,
        user_id: &str,
        key: &str,
        record: &DayRecord,
    ) -> Result<(), RemoteError>;

    async fn get_day(&self, user_id: &str, key: &str) -> Result<Option<DayRecord>, RemoteError>;

    async fn load_all(&self, user_id: &str) -> Result<Days, RemoteError>;
}

pub fn document_id(user_id: &str, key: &str) -> String {
    format!("{user_id}_{key}")
}

/// Remote documents kept as `<dir>/<user>_<date>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryRemoteStore {
    dir: PathBuf,
}

impl DirectoryRemoteStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn document_path(&self, user_id: &str, key: &str) -> Result<PathBuf, RemoteError> {
        if user_id.is_empty() || user_id.contains(['/', '\\']) || user_id.contains("..") {
            return Err(RemoteError::Rejected(format!("invalid user id '{user_id}'")));
        }
        Ok(self.dir.join(format!("{}.json", document_id(user_id, key))))
    }

    async fn read_document(&self, path: &Path) -> Result<Option<RemoteDocument>, RemoteError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl RemoteStore for DirectoryRemoteStore {
    async fn put_day(
        &self,
        user_id: &str,
        key: &str,
        record: &DayRecord,
    ) -> Result<(), RemoteError> {
        let path = self.document_path(user_id, key)?;
        fs::create_dir_all(&self.dir).await?;
        let document = RemoteDocument {
            user_id: user_id.to_string(),
            date: key.to_string(),
            habits: record.clone(),
            updated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        fs::write(&path, serde_json::to_vec_pretty(&document)?).await?;
        debug!("mirrored {} to remote", document_id(user_id, key));
        Ok(())
    }

    async fn get_day(&self, user_id: &str, key: &str) -> Result<Option<DayRecord>, RemoteError> {
        let path = self.document_path(user_id, key)?;
        Ok(self.read_document(&path).await?.map(|doc| doc.habits))
    }

    async fn load_all(&self, user_id: &str) -> Result<Days, RemoteError> {
        let mut days = Days::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(days),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match self.read_document(&path).await {
                Ok(Some(doc)) if doc.user_id == user_id => match parse_date(&doc.date) {
                    Ok(_) => {
                        days.insert(doc.date, doc.habits);
                    }
                    Err(err) => warn!("skipping remote document {}: {err}", path.display()),
                },
                Ok(_) => {}
                Err(err) => warn!("skipping remote document {}: {err}", path.display()),
            }
        }
        Ok(days)
    }
}

/// Best-effort access to a remote store. Every failure is logged and
/// reported as absent, so callers only ever see local behaviour degrade.
#[derive(Clone)]
pub struct RemoteMirror {
    store: Arc<dyn RemoteStore>,
}

impl RemoteMirror {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn get_day(&self, user_id: &str, key: &str) -> Option<DayRecord> {
        match self.store.get_day(user_id, key).await {
            Ok(record) => record,
            Err(err) => {
                warn!("remote read for {} failed: {err}", document_id(user_id, key));
                None
            }
        }
    }

    pub async fn set_day(&self, user_id: &str, key: &str, record: &DayRecord) {
        if let Err(err) = self.store.put_day(user_id, key, record).await {
            warn!("remote write for {} failed: {err}", document_id(user_id, key));
        }
    }

    pub async fn load_all(&self, user_id: &str) -> Days {
        match self.store.load_all(user_id).await {
            Ok(days) => days,
            Err(err) => {
                warn!("remote load for user {user_id} failed: {err}");
                Days::new()
            }
        }
    }

    /// Sends the write in the background and returns immediately.
    pub fn mirror_day(&self, user_id: &str, key: &str, record: DayRecord) {
        let mirror = self.clone();
        let user_id = user_id.to_string();
        let key = key.to_string();
        tokio::spawn(async move {
            mirror.set_day(&user_id, &key, &record).await;
        });
    }
}

/// Remote wins when it holds a non-empty record, otherwise local. No
/// per-habit merge takes place.
pub fn reconcile(local: DayRecord, remote: Option<DayRecord>) -> DayRecord {
    match remote {
        Some(remote) if !remote.is_empty() => remote,
        _ => local,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{FailingRemote, unique_dir};
    use super::*;

    fn record(pairs: &[(&str, bool)]) -> DayRecord {
        pairs
            .iter()
            .map(|(id, done)| (id.to_string(), *done))
            .collect()
    }

    #[test]
    fn reconcile_prefers_non_empty_remote() {
        let local = record(&[("sleep", true)]);
        let remote = record(&[("gym", true)]);
        assert_eq!(reconcile(local.clone(), Some(remote.clone())), remote);
        assert_eq!(reconcile(local.clone(), Some(DayRecord::new())), local);
        assert_eq!(reconcile(local.clone(), None), local);
    }

    #[tokio::test]
    async fn directory_store_upserts_documents() {
        let dir = unique_dir("remote_upsert");
        let store = DirectoryRemoteStore::new(dir.clone());

        store
            .put_day("alice", "2025-03-01", &record(&[("sleep", true)]))
            .await
            .unwrap();
        store
            .put_day("alice", "2025-03-01", &record(&[("gym", true)]))
            .await
            .unwrap();

        let fetched = store.get_day("alice", "2025-03-01").await.unwrap();
        assert_eq!(fetched, Some(record(&[("gym", true)])));
        assert_eq!(store.get_day("bob", "2025-03-01").await.unwrap(), None);

        let raw = std::fs::read(dir.join("alice_2025-03-01.json")).unwrap();
        let doc: RemoteDocument = serde_json::from_slice(&raw).unwrap();
        assert_eq!(doc.user_id, "alice");
        assert_eq!(doc.date, "2025-03-01");
        assert!(doc.updated_at.ends_with('Z'));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn load_all_filters_by_user() {
        let dir = unique_dir("remote_load_all");
        let store = DirectoryRemoteStore::new(dir.clone());
        store
            .put_day("alice", "2025-03-01", &record(&[("sleep", true)]))
            .await
            .unwrap();
        store
            .put_day("alice", "2025-03-02", &record(&[("water", true)]))
            .await
            .unwrap();
        store
            .put_day("bob", "2025-03-01", &record(&[("gym", true)]))
            .await
            .unwrap();

        let days = store.load_all("alice").await.unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days["2025-03-02"], record(&[("water", true)]));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn load_all_skips_non_canonical_dates() {
        let dir = unique_dir("remote_bad_dates");
        let store = DirectoryRemoteStore::new(dir.clone());
        store
            .put_day("alice", "2025-03-01", &record(&[("sleep", true)]))
            .await
            .unwrap();
        for (name, date) in [("alice_hello.json", "hello"), ("alice_short.json", "2025-3-1")] {
            let doc = RemoteDocument {
                user_id: "alice".into(),
                date: date.into(),
                habits: record(&[("gym", true)]),
                updated_at: "2025-03-01T00:00:00.000Z".into(),
            };
            std::fs::write(dir.join(name), serde_json::to_vec(&doc).unwrap()).unwrap();
        }

        let days = store.load_all("alice").await.unwrap();
        assert_eq!(days.keys().collect::<Vec<_>>(), vec!["2025-03-01"]);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn directory_store_rejects_path_like_user_ids() {
        let store = DirectoryRemoteStore::new(unique_dir("remote_reject"));
        let result = store
            .put_day("../evil", "2025-03-01", &record(&[("sleep", true)]))
            .await;
        assert!(matches!(result, Err(RemoteError::Rejected(_))));
    }

    #[tokio::test]
    async fn mirror_absorbs_failures() {
        let mirror = RemoteMirror::new(Arc::new(FailingRemote));
        assert_eq!(mirror.get_day("alice", "2025-03-01").await, None);
        assert!(mirror.load_all("alice").await.is_empty());
        mirror
            .set_day("alice", "2025-03-01", &record(&[("sleep", true)]))
            .await;
    }

    #[tokio::test]
    async fn missing_directory_loads_nothing() {
        let store = DirectoryRemoteStore::new(unique_dir("remote_missing"));
        assert!(store.load_all("alice").await.unwrap().is_empty());
    }
}
