use tracing::warn;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::budget::{Budget, BudgetInput, BudgetType};
use crate::models::category::{CategoryInput, ExpenseCategory};
use crate::models::transaction::{NewTransaction, Timestamp, Transaction};
use crate::models::wallet::{Wallet, WalletInput};

/// Validated edits to the root collections.
///
/// Pure business logic — operates on caller-owned vectors and never touches
/// storage. Every operation validates first and only then mutates, so a
/// rejected call leaves all inputs untouched.
///
/// Wallet balances are stored totals: every transaction write here applies
/// (or reverses) the transaction's signed amount on its wallet in the same
/// call, so balance and log stay in lockstep through this API.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Check a transaction form: positive finite amount, a category, and a
    /// wallet that exists.
    pub fn validate_transaction(
        &self,
        input: &NewTransaction,
        wallets: &[Wallet],
    ) -> Result<(), CoreError> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "amount must be a positive number, got {}",
                input.amount
            )));
        }
        if input.category_id.trim().is_empty() {
            return Err(CoreError::ValidationError("a category is required".into()));
        }
        if input.wallet_id.trim().is_empty() {
            return Err(CoreError::ValidationError("a wallet is required".into()));
        }
        if !wallets.iter().any(|w| w.id == input.wallet_id) {
            return Err(CoreError::WalletNotFound(input.wallet_id.clone()));
        }
        Ok(())
    }

    /// Append a new transaction and apply it to its wallet's balance.
    pub fn add_transaction(
        &self,
        transactions: &mut Vec<Transaction>,
        wallets: &mut [Wallet],
        input: NewTransaction,
        now: Timestamp,
    ) -> Result<Transaction, CoreError> {
        self.validate_transaction(&input, wallets)?;
        let transaction = Transaction::from_input(input, now);
        apply_to_wallet(wallets, &transaction, 1.0);
        transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Replace a transaction's fields (keeping `id` and `created_at`), moving
    /// its effect from the old wallet balance to the new one.
    pub fn update_transaction(
        &self,
        transactions: &mut [Transaction],
        wallets: &mut [Wallet],
        transaction_id: &str,
        input: NewTransaction,
    ) -> Result<Transaction, CoreError> {
        let idx = transactions
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?;
        self.validate_transaction(&input, wallets)?;

        let old = &transactions[idx];
        let mut updated = Transaction::from_input(input, old.created_at);
        updated.id = old.id.clone();

        apply_to_wallet(wallets, old, -1.0);
        apply_to_wallet(wallets, &updated, 1.0);
        transactions[idx] = updated.clone();
        Ok(updated)
    }

    /// Remove a transaction and reverse its effect on its wallet's balance.
    pub fn remove_transaction(
        &self,
        transactions: &mut Vec<Transaction>,
        wallets: &mut [Wallet],
        transaction_id: &str,
    ) -> Result<Transaction, CoreError> {
        let idx = transactions
            .iter()
            .position(|t| t.id == transaction_id)
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?;
        let removed = transactions.remove(idx);
        apply_to_wallet(wallets, &removed, -1.0);
        Ok(removed)
    }

    // ── Wallets ─────────────────────────────────────────────────────

    pub fn add_wallet(&self, wallets: &mut Vec<Wallet>, input: WalletInput) -> Result<Wallet, CoreError> {
        validate_wallet(&input)?;
        let wallet = Wallet::new(
            Uuid::new_v4().to_string(),
            input.name.trim(),
            input.balance,
            input.icon,
            input.color,
        );
        wallets.push(wallet.clone());
        Ok(wallet)
    }

    /// Overwrite a wallet's fields. Setting `balance` here is a manual
    /// correction and is not mirrored into the transaction log.
    pub fn update_wallet(
        &self,
        wallets: &mut [Wallet],
        wallet_id: &str,
        input: WalletInput,
    ) -> Result<Wallet, CoreError> {
        validate_wallet(&input)?;
        let wallet = wallets
            .iter_mut()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| CoreError::WalletNotFound(wallet_id.to_string()))?;
        wallet.name = input.name.trim().to_string();
        wallet.balance = input.balance;
        wallet.icon = input.icon;
        wallet.color = input.color;
        Ok(wallet.clone())
    }

    /// Remove a wallet. Transactions referencing it are kept.
    pub fn remove_wallet(&self, wallets: &mut Vec<Wallet>, wallet_id: &str) -> Result<Wallet, CoreError> {
        let idx = wallets
            .iter()
            .position(|w| w.id == wallet_id)
            .ok_or_else(|| CoreError::WalletNotFound(wallet_id.to_string()))?;
        Ok(wallets.remove(idx))
    }

    // ── Categories ──────────────────────────────────────────────────

    pub fn add_category(
        &self,
        categories: &mut Vec<ExpenseCategory>,
        input: CategoryInput,
    ) -> Result<ExpenseCategory, CoreError> {
        validate_category(&input)?;
        let category = ExpenseCategory::new(
            Uuid::new_v4().to_string(),
            input.name.trim(),
            input.icon,
            input.color,
            input.category_type,
        );
        categories.push(category.clone());
        Ok(category)
    }

    pub fn update_category(
        &self,
        categories: &mut [ExpenseCategory],
        category_id: &str,
        input: CategoryInput,
    ) -> Result<ExpenseCategory, CoreError> {
        validate_category(&input)?;
        let category = categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .ok_or_else(|| CoreError::CategoryNotFound(category_id.to_string()))?;
        category.name = input.name.trim().to_string();
        category.icon = input.icon;
        category.color = input.color;
        category.category_type = input.category_type;
        Ok(category.clone())
    }

    /// Remove a category. Nothing cascades: transactions keep the dangling id.
    pub fn remove_category(
        &self,
        categories: &mut Vec<ExpenseCategory>,
        category_id: &str,
    ) -> Result<ExpenseCategory, CoreError> {
        let idx = categories
            .iter()
            .position(|c| c.id == category_id)
            .ok_or_else(|| CoreError::CategoryNotFound(category_id.to_string()))?;
        Ok(categories.remove(idx))
    }

    // ── Budgets ─────────────────────────────────────────────────────

    /// Create a budget, or update the amount of the one already occupying the
    /// same `(type, month, year[, category])` slot.
    pub fn upsert_budget(
        &self,
        budgets: &mut Vec<Budget>,
        input: BudgetInput,
        now: Timestamp,
    ) -> Result<Budget, CoreError> {
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "budget amount must be a positive number, got {}",
                input.amount
            )));
        }
        if input.month > 11 {
            return Err(CoreError::ValidationError(format!(
                "month index must be 0-11, got {}",
                input.month
            )));
        }
        let category_id = input
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if input.budget_type == BudgetType::Category && category_id.is_none() {
            return Err(CoreError::ValidationError(
                "a category budget needs a category".into(),
            ));
        }
        let input = BudgetInput {
            category_id: match input.budget_type {
                BudgetType::Category => category_id,
                BudgetType::Monthly => None,
            },
            ..input
        };

        if let Some(existing) = budgets.iter_mut().find(|b| b.same_slot(&input)) {
            existing.amount = input.amount;
            return Ok(existing.clone());
        }

        let budget = Budget {
            id: Uuid::new_v4().to_string(),
            budget_type: input.budget_type,
            amount: input.amount,
            category_id: input.category_id,
            month: input.month,
            year: input.year,
            created_at: now,
        };
        budgets.push(budget.clone());
        Ok(budget)
    }

    pub fn remove_budget(&self, budgets: &mut Vec<Budget>, budget_id: &str) -> Result<Budget, CoreError> {
        let idx = budgets
            .iter()
            .position(|b| b.id == budget_id)
            .ok_or_else(|| CoreError::BudgetNotFound(budget_id.to_string()))?;
        Ok(budgets.remove(idx))
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}

/// Add `direction * signed_amount` to the transaction's wallet, if it still exists.
fn apply_to_wallet(wallets: &mut [Wallet], transaction: &Transaction, direction: f64) {
    match wallets.iter_mut().find(|w| w.id == transaction.wallet_id) {
        Some(wallet) => wallet.balance += direction * transaction.signed_amount(),
        None => warn!(
            wallet_id = %transaction.wallet_id,
            transaction_id = %transaction.id,
            "wallet no longer exists; balance not adjusted"
        ),
    }
}

fn validate_wallet(input: &WalletInput) -> Result<(), CoreError> {
    if input.name.trim().is_empty() {
        return Err(CoreError::ValidationError("a wallet name is required".into()));
    }
    if !input.balance.is_finite() {
        return Err(CoreError::ValidationError("wallet balance must be a number".into()));
    }
    Ok(())
}

fn validate_category(input: &CategoryInput) -> Result<(), CoreError> {
    if input.name.trim().is_empty() {
        return Err(CoreError::ValidationError("a category name is required".into()));
    }
    Ok(())
}
