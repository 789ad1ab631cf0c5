use serde::{Deserialize, Serialize};

use super::budget::Budget;
use super::category::ExpenseCategory;
use super::transaction::{Timestamp, Transaction};
use super::wallet::Wallet;

/// Backup format version written into every snapshot.
pub const BACKUP_VERSION: &str = "1.0.0";

/// A full snapshot of the four root collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub wallets: Vec<Wallet>,
    pub categories: Vec<ExpenseCategory>,
    pub version: String,
    pub timestamp: Timestamp,
}

/// Index entry describing a stored backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMetadata {
    /// Storage key holding the snapshot
    pub id: String,
    pub timestamp: Timestamp,
    pub version: String,
    /// Length of the serialized snapshot in bytes
    pub size: usize,
    pub device_id: String,
}
