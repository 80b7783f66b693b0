//! MedHere Medication Store
//!
//! Per-user persistence of medication lists and dose check-offs:
//! - Read path: cache → `users/<id>/medications.json` → empty list
//! - Write path: validate → assign id → temp file → rename → publish change
//!
//! Thread-safe via Tokio's async RwLock; every read-modify-write holds the
//! write lock for its whole duration so ids stay unique.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, RwLock};

use crate::schedule::{CheckoffLog, Medication, MedicationDraft, MedicationId};
use crate::storage::error::{StorageError, StorageResult};

/// Configuration for the medication store
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all data
    pub data_dir: PathBuf,
    /// Capacity of the change broadcast channel
    pub feed_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("medhere_data"),
            feed_capacity: 256,
        }
    }
}

impl StorageConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Get path to the directory holding all users
    pub fn users_dir(&self) -> PathBuf {
        self.data_dir.join("users")
    }

    /// Get path to one user's medication list
    pub fn medications_path(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(user_id).join("medications.json")
    }

    /// Get path to one user's check-off log
    pub fn checkoffs_path(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(user_id).join("checkoffs.json")
    }
}

/// What happened to a user's list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ChangeKind {
    Replaced,
    Added(MedicationId),
    Updated(MedicationId),
    Removed(MedicationId),
}

/// Event published after every successful write of a medication list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicationChange {
    pub user_id: String,
    pub change: ChangeKind,
    /// The full list after the change
    pub medications: Vec<Medication>,
}

/// Storage statistics
#[derive(Debug, Clone, Serialize)]
pub struct StorageStats {
    pub cached_users: usize,
    pub cached_medications: usize,
    pub subscribers: usize,
}

impl std::fmt::Display for StorageStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} users cached, {} medications, {} subscribers",
            self.cached_users, self.cached_medications, self.subscribers
        )
    }
}

/// The medication store
pub struct MedicationStore {
    config: StorageConfig,
    /// Loaded medication lists keyed by user id
    medications: RwLock<HashMap<String, Vec<Medication>>>,
    /// Loaded check-off logs keyed by user id
    checkoffs: RwLock<HashMap<String, CheckoffLog>>,
    /// Change feed
    changes: broadcast::Sender<MedicationChange>,
}

impl MedicationStore {
    /// Open a store, creating the directory layout if needed
    pub async fn open(config: StorageConfig) -> StorageResult<Self> {
        tokio::fs::create_dir_all(config.users_dir()).await?;

        let (changes, _) = broadcast::channel(config.feed_capacity.max(1));

        tracing::info!(data_dir = ?config.data_dir, "Medication store opened");

        Ok(Self {
            config,
            medications: RwLock::new(HashMap::new()),
            checkoffs: RwLock::new(HashMap::new()),
            changes,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Subscribe to list changes for all users
    pub fn subscribe(&self) -> broadcast::Receiver<MedicationChange> {
        self.changes.subscribe()
    }

    /// Get a user's medication list
    ///
    /// A missing or unreadable file yields an empty list.
    pub async fn list(&self, user_id: &str) -> StorageResult<Vec<Medication>> {
        validate_user_id(user_id)?;

        if let Some(meds) = self.medications.read().await.get(user_id) {
            return Ok(meds.clone());
        }

        let mut cache = self.medications.write().await;
        let meds = self.load_medications(&mut cache, user_id).await;
        Ok(meds.clone())
    }

    /// Get one medication
    pub async fn get(&self, user_id: &str, id: MedicationId) -> StorageResult<Medication> {
        self.list(user_id)
            .await?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound {
                user_id: user_id.to_string(),
                id,
            })
    }

    /// Replace a user's whole list
    pub async fn save(&self, user_id: &str, medications: Vec<Medication>) -> StorageResult<()> {
        validate_user_id(user_id)?;
        check_unique_ids(&medications)?;

        let mut cache = self.medications.write().await;
        self.persist(&mut cache, user_id, medications, ChangeKind::Replaced)
            .await
    }

    /// Validate and append a medication, returning the stored record
    pub async fn add(&self, user_id: &str, draft: MedicationDraft) -> StorageResult<Medication> {
        let mut added = self.add_many(user_id, vec![draft]).await?;
        added.pop().ok_or_else(|| {
            StorageError::Serialization("add produced no medication".to_string())
        })
    }

    /// Validate and append several medications in one write
    ///
    /// Nothing is stored if any draft fails validation.
    pub async fn add_many(
        &self,
        user_id: &str,
        drafts: Vec<MedicationDraft>,
    ) -> StorageResult<Vec<Medication>> {
        validate_user_id(user_id)?;

        let mut cache = self.medications.write().await;
        let mut meds = self.load_medications(&mut cache, user_id).await.clone();

        let mut added = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = next_id(&meds, Utc::now().timestamp_millis());
            let med = draft.validate(id)?;
            meds.push(med.clone());
            added.push(med);
        }

        let change = match added.as_slice() {
            [single] => ChangeKind::Added(single.id),
            _ => ChangeKind::Replaced,
        };
        self.persist(&mut cache, user_id, meds, change).await?;

        for med in &added {
            tracing::info!(user_id = %user_id, medication_id = med.id, name = %med.name, "Added medication");
        }
        Ok(added)
    }

    /// Replace one medication with a validated draft, keeping its id
    pub async fn update(
        &self,
        user_id: &str,
        id: MedicationId,
        draft: MedicationDraft,
    ) -> StorageResult<Medication> {
        validate_user_id(user_id)?;

        let mut cache = self.medications.write().await;
        let mut meds = self.load_medications(&mut cache, user_id).await.clone();

        let slot = meds
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StorageError::NotFound {
                user_id: user_id.to_string(),
                id,
            })?;
        let updated = draft.validate(id)?;
        *slot = updated.clone();

        self.persist(&mut cache, user_id, meds, ChangeKind::Updated(id))
            .await?;

        tracing::info!(user_id = %user_id, medication_id = id, "Updated medication");
        Ok(updated)
    }

    /// Delete a medication and its check-offs
    pub async fn remove(&self, user_id: &str, id: MedicationId) -> StorageResult<Medication> {
        validate_user_id(user_id)?;

        let removed = {
            let mut cache = self.medications.write().await;
            let mut meds = self.load_medications(&mut cache, user_id).await.clone();

            let pos = meds
                .iter()
                .position(|m| m.id == id)
                .ok_or_else(|| StorageError::NotFound {
                    user_id: user_id.to_string(),
                    id,
                })?;
            let removed = meds.remove(pos);

            self.persist(&mut cache, user_id, meds, ChangeKind::Removed(id))
                .await?;
            removed
        };

        self.modify_checkoffs(user_id, |log| {
            log.forget_medication(id);
        })
        .await?;

        tracing::info!(user_id = %user_id, medication_id = id, name = %removed.name, "Removed medication");
        Ok(removed)
    }

    /// Seed a user's list with `drafts` if the list is empty
    ///
    /// Returns the number of medications added.
    pub async fn seed_if_empty(
        &self,
        user_id: &str,
        drafts: Vec<MedicationDraft>,
    ) -> StorageResult<usize> {
        if !self.list(user_id).await?.is_empty() {
            return Ok(0);
        }
        Ok(self.add_many(user_id, drafts).await?.len())
    }

    /// Get a user's check-off log
    pub async fn checkoffs(&self, user_id: &str) -> StorageResult<CheckoffLog> {
        validate_user_id(user_id)?;

        if let Some(log) = self.checkoffs.read().await.get(user_id) {
            return Ok(log.clone());
        }

        let mut cache = self.checkoffs.write().await;
        Ok(self.load_checkoffs(&mut cache, user_id).await.clone())
    }

    /// Flip one dose's taken state, returning the new state
    pub async fn toggle_dose(
        &self,
        user_id: &str,
        date: NaiveDate,
        key: &str,
    ) -> StorageResult<bool> {
        self.modify_checkoffs(user_id, |log| log.toggle(date, key))
            .await
    }

    /// Set the taken state of several doses at once (mark all / clear day)
    pub async fn set_doses(
        &self,
        user_id: &str,
        date: NaiveDate,
        keys: &[String],
        taken: bool,
    ) -> StorageResult<usize> {
        self.modify_checkoffs(user_id, |log| {
            for key in keys {
                log.set(date, key, taken);
            }
            keys.len()
        })
        .await
    }

    /// Get storage statistics
    pub async fn stats(&self) -> StorageStats {
        let cache = self.medications.read().await;
        StorageStats {
            cached_users: cache.len(),
            cached_medications: cache.values().map(Vec::len).sum(),
            subscribers: self.changes.receiver_count(),
        }
    }

    /// Check that the data directory is still reachable
    pub async fn is_healthy(&self) -> bool {
        tokio::fs::metadata(self.config.users_dir())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn modify_checkoffs<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut CheckoffLog) -> T,
    ) -> StorageResult<T> {
        validate_user_id(user_id)?;

        let mut cache = self.checkoffs.write().await;
        let mut log = self.load_checkoffs(&mut cache, user_id).await.clone();

        let result = f(&mut log);

        write_json_atomic(&self.config.checkoffs_path(user_id), &log).await?;
        cache.insert(user_id.to_string(), log);
        Ok(result)
    }

    async fn persist(
        &self,
        cache: &mut HashMap<String, Vec<Medication>>,
        user_id: &str,
        medications: Vec<Medication>,
        change: ChangeKind,
    ) -> StorageResult<()> {
        write_json_atomic(&self.config.medications_path(user_id), &medications).await?;
        cache.insert(user_id.to_string(), medications.clone());

        // No subscribers is not an error
        let _ = self.changes.send(MedicationChange {
            user_id: user_id.to_string(),
            change,
            medications,
        });
        Ok(())
    }

    async fn load_medications<'a>(
        &self,
        cache: &'a mut HashMap<String, Vec<Medication>>,
        user_id: &str,
    ) -> &'a Vec<Medication> {
        if !cache.contains_key(user_id) {
            let path = self.config.medications_path(user_id);
            let meds: Vec<Medication> = read_json_or_default(&path).await;
            cache.insert(user_id.to_string(), meds);
        }
        &cache[user_id]
    }

    async fn load_checkoffs<'a>(
        &self,
        cache: &'a mut HashMap<String, CheckoffLog>,
        user_id: &str,
    ) -> &'a CheckoffLog {
        if !cache.contains_key(user_id) {
            let path = self.config.checkoffs_path(user_id);
            let log: CheckoffLog = read_json_or_default(&path).await;
            cache.insert(user_id.to_string(), log);
        }
        &cache[user_id]
    }
}

/// Pick an id that is unique in `existing`: the current time in
/// milliseconds, bumped past the largest id already in use
pub fn next_id(existing: &[Medication], now_ms: i64) -> MedicationId {
    let candidate = now_ms.max(1) as MedicationId;
    match existing.iter().map(|m| m.id).max() {
        Some(max) if max >= candidate => max + 1,
        _ => candidate,
    }
}

/// User ids become directory names, so only a safe alphabet is allowed
pub fn validate_user_id(user_id: &str) -> StorageResult<()> {
    let valid = !user_id.is_empty()
        && user_id.len() <= 64
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidUser(user_id.to_string()))
    }
}

fn check_unique_ids(medications: &[Medication]) -> StorageResult<()> {
    let mut seen = HashSet::with_capacity(medications.len());
    for med in medications {
        if !seen.insert(med.id) {
            return Err(StorageError::DuplicateId(med.id));
        }
    }
    Ok(())
}

async fn read_json_or_default<T>(path: &Path) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Failed to read stored data, using empty state");
            return T::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Corrupt stored data, using empty state");
            T::default()
        }
    }
}

async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Frequency;
    use tempfile::tempdir;

    async fn create_test_store() -> (MedicationStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = MedicationStore::open(StorageConfig::new(dir.path()))
            .await
            .unwrap();
        (store, dir)
    }

    fn draft(name: &str) -> MedicationDraft {
        MedicationDraft::new(name, 10.0, "mg", "2025-01-01").time("08:00")
    }

    #[tokio::test]
    async fn test_empty_list_for_new_user() {
        let (store, _dir) = create_test_store().await;
        assert!(store.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = MedicationStore::open(StorageConfig::new(dir.path()))
                .await
                .unwrap();
            store.add("alice", draft("Zyrtec")).await.unwrap();
            store.add("alice", draft("Tylenol")).await.unwrap();
        }

        let store = MedicationStore::open(StorageConfig::new(dir.path()))
            .await
            .unwrap();
        let meds = store.list("alice").await.unwrap();
        assert_eq!(meds.len(), 2);
        assert_ne!(meds[0].id, meds[1].id);
        assert!(store.list("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_draft() {
        let (store, _dir) = create_test_store().await;
        let bad = MedicationDraft::new("Zyrtec", 10.0, "mg", "2025-05-01").end_date("2025-01-01");
        let err = store.add("alice", bad).await.unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert!(store.list("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let (store, _dir) = create_test_store().await;
        let med = store.add("alice", draft("Zyrtec")).await.unwrap();

        let updated = store
            .update(
                "alice",
                med.id,
                draft("Zyrtec").frequency(Frequency::TwiceDaily).time("20:00"),
            )
            .await
            .unwrap();
        assert_eq!(updated.id, med.id);
        assert_eq!(updated.times.len(), 2);

        let removed = store.remove("alice", med.id).await.unwrap();
        assert_eq!(removed.name, "Zyrtec");
        assert!(matches!(
            store.get("alice", med.id).await,
            Err(StorageError::NotFound { .. })
        ));
        assert!(matches!(
            store.remove("alice", med.id).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::new(dir.path());
        let path = config.medications_path("alice");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let store = MedicationStore::open(config).await.unwrap();
        assert!(store.list("alice").await.unwrap().is_empty());

        // Writing replaces the corrupt file
        store.add("alice", draft("Zyrtec")).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Zyrtec"));
    }

    #[tokio::test]
    async fn test_invalid_user_id() {
        let (store, _dir) = create_test_store().await;
        assert!(matches!(
            store.list("../escape").await,
            Err(StorageError::InvalidUser(_))
        ));
        assert!(store.list("").await.is_err());
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_ids() {
        let (store, _dir) = create_test_store().await;
        let med = draft("Zyrtec").validate(5).unwrap();
        let err = store
            .save("alice", vec![med.clone(), med])
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateId(5)));
    }

    #[tokio::test]
    async fn test_change_feed() {
        let (store, _dir) = create_test_store().await;
        let mut rx = store.subscribe();

        let med = store.add("alice", draft("Zyrtec")).await.unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.user_id, "alice");
        assert_eq!(change.change, ChangeKind::Added(med.id));
        assert_eq!(change.medications.len(), 1);
    }

    #[tokio::test]
    async fn test_checkoffs_toggle_and_clear() {
        let (store, _dir) = create_test_store().await;
        let today = Utc::now().date_naive();

        assert!(store.toggle_dose("alice", today, "1@08:00").await.unwrap());
        assert!(store.checkoffs("alice").await.unwrap().is_taken(today, "1@08:00"));

        let keys = vec!["1@08:00".to_string(), "2@20:00".to_string()];
        store.set_doses("alice", today, &keys, true).await.unwrap();
        assert_eq!(store.checkoffs("alice").await.unwrap().taken_count(today), 2);

        store.set_doses("alice", today, &keys, false).await.unwrap();
        assert_eq!(store.checkoffs("alice").await.unwrap().taken_count(today), 0);
    }

    #[tokio::test]
    async fn test_old_checkoffs_are_kept() {
        let dir = tempdir().unwrap();
        let long_ago = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        {
            let store = MedicationStore::open(StorageConfig::new(dir.path()))
                .await
                .unwrap();
            assert!(store.toggle_dose("alice", long_ago, "1@08:00").await.unwrap());
            let keys = vec!["2@20:00".to_string()];
            store.set_doses("alice", long_ago, &keys, true).await.unwrap();

            // A later write on another day leaves the old entries alone
            let today = Utc::now().date_naive();
            store.toggle_dose("alice", today, "1@08:00").await.unwrap();
        }

        let store = MedicationStore::open(StorageConfig::new(dir.path()))
            .await
            .unwrap();
        let log = store.checkoffs("alice").await.unwrap();
        assert!(log.is_taken(long_ago, "1@08:00"));
        assert_eq!(log.taken_count(long_ago), 2);
    }

    #[tokio::test]
    async fn test_seed_if_empty() {
        let (store, _dir) = create_test_store().await;
        let seeded = store
            .seed_if_empty("alice", crate::storage::demo_drafts())
            .await
            .unwrap();
        assert_eq!(seeded, 3);
        let again = store
            .seed_if_empty("alice", crate::storage::demo_drafts())
            .await
            .unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn test_next_id_is_unique() {
        let meds = vec![draft("A").validate(1_000).unwrap()];
        assert_eq!(next_id(&meds, 500), 1_001);
        assert_eq!(next_id(&meds, 5_000), 5_000);
        assert_eq!(next_id(&[], 0), 1);
    }
}
