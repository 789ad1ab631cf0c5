use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::backup::{BackupData, BackupMetadata, BACKUP_VERSION};
use crate::models::budget::Budget;
use crate::models::category::ExpenseCategory;
use crate::models::transaction::{Timestamp, Transaction};
use crate::models::wallet::Wallet;
use crate::storage::traits::KeyValueStorage;

/// Storage key prefix of every backup snapshot.
pub const BACKUP_PREFIX: &str = "backup_";

/// Storage key of the backup index.
pub const BACKUP_METADATA_KEY: &str = "backup_metadata";

/// Storage key of this installation's device id.
pub const DEVICE_ID_KEY: &str = "device_id";

/// Full snapshots of the root collections, kept in the same key-value
/// storage as the live data, plus portable JSON import/export.
///
/// Layout in storage:
/// - `backup_<millis>_<random>` → JSON [`BackupData`]
/// - `backup_metadata` → JSON list of [`BackupMetadata`]
/// - `device_id` → device id recorded in each metadata entry
pub struct BackupService;

impl BackupService {
    pub fn new() -> Self {
        Self
    }

    /// Bundle the four root collections into a snapshot taken at `now`.
    pub fn snapshot(
        &self,
        transactions: &[Transaction],
        budgets: &[Budget],
        wallets: &[Wallet],
        categories: &[ExpenseCategory],
        now: Timestamp,
    ) -> BackupData {
        BackupData {
            transactions: transactions.to_vec(),
            budgets: budgets.to_vec(),
            wallets: wallets.to_vec(),
            categories: categories.to_vec(),
            version: BACKUP_VERSION.to_string(),
            timestamp: now,
        }
    }

    /// Store a snapshot and append it to the backup index.
    pub async fn create_backup<S: KeyValueStorage + ?Sized>(
        &self,
        storage: &S,
        data: &BackupData,
    ) -> Result<BackupMetadata, CoreError> {
        let json = serde_json::to_string(data)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize backup: {e}")))?;

        let random = Uuid::new_v4().simple().to_string();
        let id = format!("{BACKUP_PREFIX}{}_{}", data.timestamp, &random[..8]);
        let metadata = BackupMetadata {
            id: id.clone(),
            timestamp: data.timestamp,
            version: BACKUP_VERSION.to_string(),
            size: json.len(),
            device_id: self.device_id(storage).await?,
        };

        storage.set(HashMap::from([(id.clone(), json)])).await?;

        let mut index = self.list_backups(storage).await?;
        index.push(metadata.clone());
        self.write_index(storage, &index).await?;

        info!(backup_id = %id, size = metadata.size, "backup created");
        Ok(metadata)
    }

    /// The backup index in creation order. A missing or malformed index reads as empty.
    pub async fn list_backups<S: KeyValueStorage + ?Sized>(
        &self,
        storage: &S,
    ) -> Result<Vec<BackupMetadata>, CoreError> {
        let stored = storage.get(&[BACKUP_METADATA_KEY]).await?;
        let Some(json) = stored.get(BACKUP_METADATA_KEY) else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(json) {
            Ok(index) => Ok(index),
            Err(e) => {
                warn!(error = %e, "backup index is malformed; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Load a stored snapshot.
    pub async fn restore_backup<S: KeyValueStorage + ?Sized>(
        &self,
        storage: &S,
        backup_id: &str,
    ) -> Result<BackupData, CoreError> {
        check_backup_id(backup_id)?;
        let stored = storage.get(&[backup_id]).await?;
        let json = stored
            .get(backup_id)
            .ok_or_else(|| CoreError::BackupNotFound(backup_id.to_string()))?;
        let data = self.import_backup_json(json)?;
        info!(backup_id, "backup loaded for restore");
        Ok(data)
    }

    /// Delete a snapshot and its index entry. Unknown backup ids are a no-op;
    /// keys outside the backup namespace are `BackupNotFound`.
    pub async fn delete_backup<S: KeyValueStorage + ?Sized>(
        &self,
        storage: &S,
        backup_id: &str,
    ) -> Result<(), CoreError> {
        check_backup_id(backup_id)?;
        storage.remove(&[backup_id]).await?;
        let mut index = self.list_backups(storage).await?;
        index.retain(|m| m.id != backup_id);
        self.write_index(storage, &index).await
    }

    /// Keep only the newest `max_backups` snapshots. Returns how many were deleted.
    pub async fn cleanup_old_backups<S: KeyValueStorage + ?Sized>(
        &self,
        storage: &S,
        max_backups: usize,
    ) -> Result<usize, CoreError> {
        let mut index = self.list_backups(storage).await?;
        index.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));

        let stale: Vec<BackupMetadata> = index.into_iter().skip(max_backups).collect();
        for metadata in &stale {
            self.delete_backup(storage, &metadata.id).await?;
        }
        if !stale.is_empty() {
            info!(deleted = stale.len(), kept = max_backups, "old backups cleaned up");
        }
        Ok(stale.len())
    }

    /// Pretty-printed JSON suitable for saving as a file.
    pub fn export_backup_json(&self, data: &BackupData) -> Result<String, CoreError> {
        serde_json::to_string_pretty(data)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize backup: {e}")))
    }

    /// Parse a backup file produced by [`Self::export_backup_json`].
    pub fn import_backup_json(&self, json: &str) -> Result<BackupData, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidBackup(e.to_string()))
    }

    /// This installation's device id, generated and stored on first use.
    pub async fn device_id<S: KeyValueStorage + ?Sized>(&self, storage: &S) -> Result<String, CoreError> {
        let stored = storage.get(&[DEVICE_ID_KEY]).await?;
        if let Some(id) = stored.get(DEVICE_ID_KEY).filter(|id| !id.is_empty()) {
            return Ok(id.clone());
        }
        let id = format!("device_{}", Uuid::new_v4().simple());
        storage
            .set(HashMap::from([(DEVICE_ID_KEY.to_string(), id.clone())]))
            .await?;
        Ok(id)
    }

    async fn write_index<S: KeyValueStorage + ?Sized>(
        &self,
        storage: &S,
        index: &[BackupMetadata],
    ) -> Result<(), CoreError> {
        let json = serde_json::to_string(index)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize backup index: {e}")))?;
        storage
            .set(HashMap::from([(BACKUP_METADATA_KEY.to_string(), json)]))
            .await
    }
}

impl Default for BackupService {
    fn default() -> Self {
        Self::new()
    }
}

/// Only `backup_<...>` snapshot keys may be read or removed as backups.
fn check_backup_id(backup_id: &str) -> Result<(), CoreError> {
    if backup_id.starts_with(BACKUP_PREFIX) && backup_id != BACKUP_METADATA_KEY {
        Ok(())
    } else {
        Err(CoreError::BackupNotFound(backup_id.to_string()))
    }
}
