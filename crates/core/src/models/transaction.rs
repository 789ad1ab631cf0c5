use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Milliseconds since the Unix epoch. All dates in persisted data use this unit.
pub type Timestamp = i64;

/// Direction of money flow. Also used to split categories into income/expense lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Sign applied to a wallet balance: income adds, expense subtracts.
    pub fn sign(&self) -> f64 {
        match self {
            TransactionType::Income => 1.0,
            TransactionType::Expense => -1.0,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Income => write!(f, "income"),
            TransactionType::Expense => write!(f, "expense"),
        }
    }
}

/// A single income or expense entry in the transaction log.
///
/// Transactions are never patched in place: edits replace the whole record
/// (keeping `id` and `created_at`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    /// Always positive; the direction comes from `transaction_type`.
    pub amount: f64,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    pub category_id: String,

    pub wallet_id: String,

    /// When the money moved (user-chosen).
    pub date: Timestamp,

    #[serde(default)]
    pub note: String,

    /// When the record was entered.
    pub created_at: Timestamp,
}

impl Transaction {
    /// Build a transaction from validated input with a fresh UUID.
    pub fn from_input(input: NewTransaction, created_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount: input.amount,
            transaction_type: input.transaction_type,
            category_id: input.category_id,
            wallet_id: input.wallet_id,
            date: input.date,
            note: input.note.trim().to_string(),
            created_at,
        }
    }

    /// Amount with the sign of its effect on a wallet balance.
    pub fn signed_amount(&self) -> f64 {
        self.transaction_type.sign() * self.amount
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }
}

/// User-entered fields for a new or edited transaction, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category_id: String,
    pub wallet_id: String,
    pub date: Timestamp,
    #[serde(default)]
    pub note: String,
}

impl NewTransaction {
    pub fn expense(
        amount: f64,
        category_id: impl Into<String>,
        wallet_id: impl Into<String>,
        date: Timestamp,
    ) -> Self {
        Self {
            amount,
            transaction_type: TransactionType::Expense,
            category_id: category_id.into(),
            wallet_id: wallet_id.into(),
            date,
            note: String::new(),
        }
    }

    pub fn income(
        amount: f64,
        category_id: impl Into<String>,
        wallet_id: impl Into<String>,
        date: Timestamp,
    ) -> Self {
        Self {
            transaction_type: TransactionType::Income,
            ..Self::expense(amount, category_id, wallet_id, date)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}
