//! tally-storage-json
//!
//! Single-file JSON document store implementing [`TransactionStore`].
//!
//! Several processes may share one file (a scheduled `tick` next to an
//! interactive `add`). Every operation takes an advisory lock on a sidecar
//! `<file>.lock` and re-reads the file under it; writes hold the lock
//! exclusively from that read until the replacement file is renamed in.

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use tally_config::write_atomic;
use tally_core::{CoreError, TransactionStore};
use tally_domain::{CategoryRule, Transaction};

const LOCK_SUFFIX: &str = "lock";

/// On-disk layout of the store file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub category_rules: Vec<CategoryRule>,
}

/// Filesystem-backed store.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonStore {
    /// Opens the store at `path`. A missing file reads as an empty store and is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let store = Self {
            lock_path: lock_path(&path),
            path,
        };
        let (transactions, rules) =
            store.read(|snapshot| (snapshot.transactions.len(), snapshot.category_rules.len()))?;
        debug!(path = %store.path.display(), transactions, rules, "opened json store");
        Ok(store)
    }

    /// Removes a single transaction. Instances of a deleted definition are
    /// left untouched.
    pub fn delete_transaction(&self, id: Uuid) -> Result<bool, CoreError> {
        self.write(|snapshot| {
            let before = snapshot.transactions.len();
            snapshot.transactions.retain(|txn| txn.id != id);
            Ok(snapshot.transactions.len() != before)
        })
    }

    /// Instances whose back-reference points at `definition_id`, oldest first.
    pub fn instances_of(&self, definition_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        self.read(|snapshot| {
            let mut instances: Vec<_> = snapshot
                .transactions
                .iter()
                .filter(|txn| txn.parent_transaction_id == Some(definition_id))
                .cloned()
                .collect();
            instances.sort_by_key(|txn| txn.date);
            instances
        })
    }

    fn read<T>(&self, view: impl FnOnce(&StoreSnapshot) -> T) -> Result<T, CoreError> {
        let _lock = FileLock::shared(&self.lock_path)?;
        let snapshot = load_snapshot(&self.path)?;
        Ok(view(&snapshot))
    }

    /// Applies `change` to the current file contents and persists the result.
    /// Nothing is written when `change` fails.
    fn write<T>(
        &self,
        change: impl FnOnce(&mut StoreSnapshot) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _lock = FileLock::exclusive(&self.lock_path)?;
        let mut snapshot = load_snapshot(&self.path)?;
        let value = change(&mut snapshot)?;
        save_snapshot(&self.path, &snapshot)?;
        Ok(value)
    }
}

impl TransactionStore for JsonStore {
    fn find_enabled_rules(&self, user_id: Uuid) -> Result<Vec<CategoryRule>, CoreError> {
        let mut rules = self.list_rules(user_id)?;
        rules.retain(|rule| rule.enabled);
        Ok(rules)
    }

    fn find_latest_instance(
        &self,
        definition_id: Uuid,
    ) -> Result<Option<Transaction>, CoreError> {
        self.read(|snapshot| {
            snapshot
                .transactions
                .iter()
                .filter(|txn| txn.parent_transaction_id == Some(definition_id))
                .max_by_key(|txn| txn.date)
                .cloned()
        })
    }

    fn find_active_recurring_definitions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, CoreError> {
        self.read(|snapshot| {
            snapshot
                .transactions
                .iter()
                .filter(|txn| txn.is_active_definition(now))
                .cloned()
                .collect()
        })
    }

    fn list_rules(&self, user_id: Uuid) -> Result<Vec<CategoryRule>, CoreError> {
        self.read(|snapshot| {
            let mut rules: Vec<_> = snapshot
                .category_rules
                .iter()
                .filter(|rule| rule.user_id == user_id)
                .cloned()
                .collect();
            // Stable: equal priorities stay in insertion order.
            rules.sort_by(|a, b| b.priority.cmp(&a.priority));
            rules
        })
    }

    fn insert_transaction(&self, transaction: Transaction) -> Result<Uuid, CoreError> {
        self.write(|snapshot| {
            if let Some(definition_id) = transaction.parent_transaction_id {
                let exists = snapshot.transactions.iter().any(|txn| {
                    txn.parent_transaction_id == Some(definition_id)
                        && txn.date == transaction.date
                });
                if exists {
                    return Err(CoreError::DuplicateInstance {
                        definition_id,
                        date: transaction.date,
                    });
                }
            }
            let id = transaction.id;
            snapshot.transactions.push(transaction);
            Ok(id)
        })
    }

    fn insert_rule(&self, rule: CategoryRule) -> Result<Uuid, CoreError> {
        self.write(|snapshot| {
            let id = rule.id;
            snapshot.category_rules.push(rule);
            Ok(id)
        })
    }

    fn list_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, CoreError> {
        self.read(|snapshot| {
            let mut transactions: Vec<_> = snapshot
                .transactions
                .iter()
                .filter(|txn| txn.user_id == user_id)
                .cloned()
                .collect();
            transactions.sort_by_key(|txn| txn.date);
            transactions
        })
    }
}

/// Advisory lock held for the lifetime of the value.
struct FileLock(File);

impl FileLock {
    fn shared(path: &Path) -> Result<Self, CoreError> {
        let file = open_lock_file(path)?;
        FileExt::lock_shared(&file)?;
        Ok(Self(file))
    }

    fn exclusive(path: &Path) -> Result<Self, CoreError> {
        let file = open_lock_file(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(Self(file))
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

fn open_lock_file(path: &Path) -> Result<File, CoreError> {
    Ok(OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?)
}

fn lock_path(path: &Path) -> PathBuf {
    let mut lock = path.as_os_str().to_owned();
    lock.push(".");
    lock.push(LOCK_SUFFIX);
    PathBuf::from(lock)
}

/// Loads the snapshot at `path`; a missing file is an empty store.
pub fn load_snapshot(path: &Path) -> Result<StoreSnapshot, CoreError> {
    if !path.exists() {
        return Ok(StoreSnapshot::default());
    }
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Replaces the file at `path` with `snapshot` through a staged rename.
pub fn save_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<(), CoreError> {
    let json =
        serde_json::to_string_pretty(snapshot).map_err(|err| CoreError::Serde(err.to_string()))?;
    write_atomic(path, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_file_sits_next_to_store() {
        assert_eq!(
            lock_path(Path::new("/data/tally.json")),
            PathBuf::from("/data/tally.json.lock")
        );
    }

    #[test]
    fn missing_file_loads_empty_snapshot() {
        let snapshot = load_snapshot(Path::new("/definitely/not/here.json")).expect("load");
        assert!(snapshot.transactions.is_empty());
        assert!(snapshot.category_rules.is_empty());
    }
}
