//! Append-only JSON file of [`GameRecord`]s.
//!
//! The whole sequence lives in memory behind a single async mutex, which
//! makes the store a single writer: every mutation is applied to a copy,
//! written to `<file>.tmp`, renamed over the record file, and only then
//! committed in memory. A failed write leaves both the file and the
//! in-memory state as they were.

mod record;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;

pub use record::{GameRecord, TITLE_MAX_CHARS, make_title};

#[derive(Debug)]
pub struct GameStore {
    path: PathBuf,
    records: Mutex<Vec<GameRecord>>,
}

impl GameStore {
    /// Load the record file at `path`. A missing file is an empty store; a
    /// file that is not a JSON array of records is an error.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        info!(path = %path.display(), games = records.len(), "game store opened");
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Append a new record for `prompt` / `code` and persist it.
    pub async fn create(&self, prompt: &str, code: String) -> Result<GameRecord, StoreError> {
        let mut records = self.records.lock().await;
        let now = Utc::now();
        let record = GameRecord::new(record::next_id(&records, now), prompt, code, now);

        let mut next = records.clone();
        next.push(record.clone());
        self.persist(&next).await?;
        *records = next;

        debug!(id = %record.id, "game record created");
        Ok(record)
    }

    /// All records, newest first.
    pub async fn list_newest_first(&self) -> Vec<GameRecord> {
        self.records.lock().await.iter().rev().cloned().collect()
    }

    /// Record without touching its play count.
    pub async fn get(&self, id: &str) -> Option<GameRecord> {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Increment the play count of `id` by one, persist, and return the
    /// updated record. `Ok(None)` when no record has that id.
    pub async fn record_play(&self, id: &str) -> Result<Option<GameRecord>, StoreError> {
        let mut records = self.records.lock().await;
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Ok(None);
        };

        let mut next = records.clone();
        next[pos].play_count += 1;
        let updated = next[pos].clone();
        self.persist(&next).await?;
        *records = next;

        Ok(Some(updated))
    }

    /// Remove the record with `id`. Returns `false` when there was none.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        let next: Vec<GameRecord> = records.iter().filter(|r| r.id != id).cloned().collect();
        if next.len() == records.len() {
            return Ok(false);
        }
        self.persist(&next).await?;
        *records = next;

        debug!(id = %id, "game record deleted");
        Ok(true)
    }

    async fn persist(&self, records: &[GameRecord]) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }

        let json = serde_json::to_vec_pretty(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    async fn open_temp() -> (tempfile::TempDir, GameStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = GameStore::open(dir.path().join("data").join("games.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn missing_file_is_empty_store() {
        let (_dir, store) = open_temp().await;
        assert!(store.is_empty().await);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn creates_keep_order_and_list_reverses_it() {
        let (_dir, store) = open_temp().await;
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(store.create(&format!("game {i}"), format!("code {i}")).await.unwrap().id);
        }
        assert_eq!(store.len().await, 5);

        let on_disk: Vec<GameRecord> =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        let disk_ids: Vec<_> = on_disk.iter().map(|r| r.id.clone()).collect();
        assert_eq!(disk_ids, ids);

        let listed: Vec<_> = store.list_newest_first().await.into_iter().map(|r| r.id).collect();
        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let (_dir, store) = open_temp().await;
        let a = store.create("a", String::new()).await.unwrap();
        let b = store.create("b", String::new()).await.unwrap();
        assert!(b.id.parse::<i64>().unwrap() > a.id.parse::<i64>().unwrap());
    }

    #[tokio::test]
    async fn listing_is_idempotent() {
        let (_dir, store) = open_temp().await;
        store.create("a", "1".into()).await.unwrap();
        store.create("b", "2".into()).await.unwrap();
        assert_eq!(store.list_newest_first().await, store.list_newest_first().await);
    }

    #[tokio::test]
    async fn each_play_adds_exactly_one() {
        let (_dir, store) = open_temp().await;
        let rec = store.create("avoid falling rocks", "code".into()).await.unwrap();
        assert_eq!(rec.play_count, 0);
        assert_eq!(rec.title, "avoid falling rocks");

        let played = store.record_play(&rec.id).await.unwrap().unwrap();
        assert_eq!(played.play_count, 1);
        let played = store.record_play(&rec.id).await.unwrap().unwrap();
        assert_eq!(played.play_count, 2);

        assert_eq!(store.get(&rec.id).await.unwrap().play_count, 2);
        assert_eq!(store.record_play("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_removes_only_the_match() {
        let (_dir, store) = open_temp().await;
        let a = store.create("a", "1".into()).await.unwrap();
        let b = store.create("b", "2".into()).await.unwrap();
        let c = store.create("c", "3".into()).await.unwrap();

        assert!(store.delete(&b.id).await.unwrap());
        assert!(!store.delete(&b.id).await.unwrap());

        let left = store.list_newest_first().await;
        assert_eq!(left, vec![c, a]);
    }

    #[tokio::test]
    async fn reopen_sees_persisted_state() {
        let (_dir, store) = open_temp().await;
        let rec = store.create("persist me", "code".into()).await.unwrap();
        store.record_play(&rec.id).await.unwrap();

        let reopened = GameStore::open(store.path()).await.unwrap();
        let got = reopened.get(&rec.id).await.unwrap();
        assert_eq!(got.play_count, 1);
        assert_eq!(got.prompt, "persist me");
    }

    #[tokio::test]
    async fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("games.json");
        std::fs::write(&path, "{ not an array").unwrap();
        assert!(matches!(
            GameStore::open(&path).await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn failed_write_leaves_state_unchanged() {
        let (_dir, store) = open_temp().await;
        let kept = store.create("kept", "1".into()).await.unwrap();

        // A directory squatting on the temp path makes the next write fail.
        let mut tmp = store.path().as_os_str().to_owned();
        tmp.push(".tmp");
        std::fs::create_dir(&tmp).unwrap();

        assert!(matches!(
            store.create("lost", "2".into()).await,
            Err(StoreError::Io { .. })
        ));
        assert!(matches!(store.delete(&kept.id).await, Err(StoreError::Io { .. })));
        assert_eq!(store.list_newest_first().await, vec![kept]);
    }
}
