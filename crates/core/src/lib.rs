pub mod errors;
pub mod models;
pub mod services;
pub mod storage;
pub mod store;

use tracing::info;

use errors::CoreError;
use models::{
    backup::{BackupData, BackupMetadata},
    budget::{Budget, BudgetInput},
    categorization::KeywordTable,
    category::{CategoryInput, ExpenseCategory},
    export::{ExportOptions, ExportSummary},
    history::HistoryFilter,
    insight::{Insight, SpendingTrend},
    settings::Settings,
    stats::{BudgetStatus, CategoryStat, MonthlyStats, MonthlyTrendPoint, WeeklyTrendPoint},
    transaction::{NewTransaction, Timestamp, Transaction, TransactionType},
    wallet::{Wallet, WalletInput},
};
use services::{
    backup_service::BackupService, export_service::ExportService, ledger_service::LedgerService,
};
use storage::traits::KeyValueStorage;
use store::state::{ExpenseStore, RootValue};

/// File name prefix of CSV exports.
const EXPORT_FILE_PREFIX: &str = "expense-report";

/// Main entry point for the Expense Tracker core library.
///
/// Owns the reactive store (root collections + derived views) and the
/// services that mutate, export, and back up those collections. The host
/// passes `now` into every call that depends on the current date.
#[must_use]
pub struct ExpenseTracker<S: KeyValueStorage> {
    store: ExpenseStore<S>,
    ledger: LedgerService,
    export_service: ExportService,
    backup_service: BackupService,
    settings: Settings,
}

impl<S: KeyValueStorage> std::fmt::Debug for ExpenseTracker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseTracker")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<S: KeyValueStorage> ExpenseTracker<S> {
    /// Tracker over `storage` with default settings (host-local calendar).
    pub fn new(storage: S) -> Result<Self, CoreError> {
        Self::with_settings(storage, Settings::default())
    }

    pub fn with_settings(storage: S, settings: Settings) -> Result<Self, CoreError> {
        let calendar = settings.calendar()?;
        Ok(Self {
            store: ExpenseStore::new(storage, settings.clone())?,
            ledger: LedgerService::new(),
            export_service: ExportService::new(calendar),
            backup_service: BackupService::new(),
            settings,
        })
    }

    /// Use a custom keyword table (e.g. loaded from JSON) for category suggestions.
    pub fn with_keyword_table(mut self, table: KeywordTable) -> Self {
        self.store = self.store.with_keyword_table(table);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&mut self) -> &mut ExpenseStore<S> {
        &mut self.store
    }

    // ── Root Collections ────────────────────────────────────────────

    pub async fn transactions(&mut self) -> Vec<Transaction> {
        self.store.transactions().await.to_vec()
    }

    pub async fn wallets(&mut self) -> Vec<Wallet> {
        self.store.wallets().await.to_vec()
    }

    pub async fn categories(&mut self) -> Vec<ExpenseCategory> {
        self.store.categories().await.to_vec()
    }

    pub async fn budgets(&mut self) -> Vec<Budget> {
        self.store.budgets().await.to_vec()
    }

    // ── Transactions ────────────────────────────────────────────────

    /// Record a transaction and apply it to its wallet's balance.
    /// Nothing is written if validation fails.
    pub async fn add_transaction(
        &mut self,
        input: NewTransaction,
        now: Timestamp,
    ) -> Result<Transaction, CoreError> {
        let mut transactions = self.transactions().await;
        let mut wallets = self.wallets().await;
        let transaction = self
            .ledger
            .add_transaction(&mut transactions, &mut wallets, input, now)?;

        self.store.set_transactions(transactions).await;
        self.store.set_wallets(wallets).await;
        info!(
            transaction_id = %transaction.id,
            kind = %transaction.transaction_type,
            amount = transaction.amount,
            "transaction added"
        );
        Ok(transaction)
    }

    /// Add several transactions at once.
    /// All-or-nothing: if any input is invalid, nothing is written.
    pub async fn add_transactions(
        &mut self,
        inputs: Vec<NewTransaction>,
        now: Timestamp,
    ) -> Result<Vec<Transaction>, CoreError> {
        let mut transactions = self.transactions().await;
        let mut wallets = self.wallets().await;

        let mut added = Vec::with_capacity(inputs.len());
        for input in inputs {
            added.push(
                self.ledger
                    .add_transaction(&mut transactions, &mut wallets, input, now)?,
            );
        }

        self.store.set_transactions(transactions).await;
        self.store.set_wallets(wallets).await;
        info!(count = added.len(), "transactions added");
        Ok(added)
    }

    /// Replace a transaction's fields, moving its effect between wallet balances.
    pub async fn update_transaction(
        &mut self,
        transaction_id: &str,
        input: NewTransaction,
    ) -> Result<Transaction, CoreError> {
        let mut transactions = self.transactions().await;
        let mut wallets = self.wallets().await;
        let updated =
            self.ledger
                .update_transaction(&mut transactions, &mut wallets, transaction_id, input)?;

        self.store.set_transactions(transactions).await;
        self.store.set_wallets(wallets).await;
        info!(transaction_id, "transaction updated");
        Ok(updated)
    }

    /// Delete a transaction and reverse its effect on its wallet's balance.
    pub async fn remove_transaction(&mut self, transaction_id: &str) -> Result<Transaction, CoreError> {
        let mut transactions = self.transactions().await;
        let mut wallets = self.wallets().await;
        let removed = self
            .ledger
            .remove_transaction(&mut transactions, &mut wallets, transaction_id)?;

        self.store.set_transactions(transactions).await;
        self.store.set_wallets(wallets).await;
        info!(transaction_id, "transaction removed");
        Ok(removed)
    }

    /// Transaction history narrowed by `filter`, newest first.
    pub async fn filter_history(&mut self, filter: &HistoryFilter) -> Vec<Transaction> {
        let transactions = self.transactions().await;
        let categories = self.categories().await;
        self.store
            .aggregation()
            .filter_history(&transactions, &categories, filter)
    }

    /// Search notes, category names and amounts, newest first.
    pub async fn search_transactions(&mut self, query: &str) -> Vec<Transaction> {
        self.filter_history(&HistoryFilter::search(query)).await
    }

    // ── Wallets ─────────────────────────────────────────────────────

    pub async fn add_wallet(&mut self, input: WalletInput) -> Result<Wallet, CoreError> {
        let mut wallets = self.wallets().await;
        let wallet = self.ledger.add_wallet(&mut wallets, input)?;
        self.store.set_wallets(wallets).await;
        info!(wallet_id = %wallet.id, "wallet added");
        Ok(wallet)
    }

    pub async fn update_wallet(&mut self, wallet_id: &str, input: WalletInput) -> Result<Wallet, CoreError> {
        let mut wallets = self.wallets().await;
        let wallet = self.ledger.update_wallet(&mut wallets, wallet_id, input)?;
        self.store.set_wallets(wallets).await;
        Ok(wallet)
    }

    pub async fn remove_wallet(&mut self, wallet_id: &str) -> Result<Wallet, CoreError> {
        let mut wallets = self.wallets().await;
        let wallet = self.ledger.remove_wallet(&mut wallets, wallet_id)?;
        self.store.set_wallets(wallets).await;
        info!(wallet_id, "wallet removed");
        Ok(wallet)
    }

    // ── Categories ──────────────────────────────────────────────────

    pub async fn add_category(&mut self, input: CategoryInput) -> Result<ExpenseCategory, CoreError> {
        let mut categories = self.categories().await;
        let category = self.ledger.add_category(&mut categories, input)?;
        self.store.set_categories(categories).await;
        info!(category_id = %category.id, "category added");
        Ok(category)
    }

    pub async fn update_category(
        &mut self,
        category_id: &str,
        input: CategoryInput,
    ) -> Result<ExpenseCategory, CoreError> {
        let mut categories = self.categories().await;
        let category = self.ledger.update_category(&mut categories, category_id, input)?;
        self.store.set_categories(categories).await;
        Ok(category)
    }

    pub async fn remove_category(&mut self, category_id: &str) -> Result<ExpenseCategory, CoreError> {
        let mut categories = self.categories().await;
        let category = self.ledger.remove_category(&mut categories, category_id)?;
        self.store.set_categories(categories).await;
        info!(category_id, "category removed");
        Ok(category)
    }

    /// Suggest an expense category for a note: learned patterns from the
    /// transaction history first, then the keyword table.
    pub async fn suggest_category(&mut self, note: &str) -> Option<ExpenseCategory> {
        let patterns = self.store.learned_patterns().await;
        let categories = self.store.expense_categories().await;
        self.store
            .categorization()
            .learned_suggest(note, &patterns, &categories)
    }

    // ── Budgets ─────────────────────────────────────────────────────

    /// Create the budget for a `(type, month, year[, category])` slot or
    /// update the amount of the existing one.
    pub async fn set_budget(&mut self, input: BudgetInput, now: Timestamp) -> Result<Budget, CoreError> {
        let mut budgets = self.budgets().await;
        let budget = self.ledger.upsert_budget(&mut budgets, input, now)?;
        self.store.set_budgets(budgets).await;
        info!(budget_id = %budget.id, amount = budget.amount, "budget saved");
        Ok(budget)
    }

    pub async fn remove_budget(&mut self, budget_id: &str) -> Result<Budget, CoreError> {
        let mut budgets = self.budgets().await;
        let budget = self.ledger.remove_budget(&mut budgets, budget_id)?;
        self.store.set_budgets(budgets).await;
        Ok(budget)
    }

    // ── Derived Views ───────────────────────────────────────────────

    pub async fn total_balance(&mut self) -> f64 {
        self.store.total_balance().await
    }

    pub async fn current_month_transactions(&mut self, now: Timestamp) -> Vec<Transaction> {
        self.store.current_month_transactions(now).await
    }

    pub async fn monthly_stats(&mut self, now: Timestamp) -> MonthlyStats {
        self.store.monthly_stats(now).await
    }

    pub async fn expenses_by_category(&mut self, now: Timestamp) -> Vec<CategoryStat> {
        self.store
            .transactions_by_category(TransactionType::Expense, now)
            .await
    }

    pub async fn income_by_category(&mut self, now: Timestamp) -> Vec<CategoryStat> {
        self.store
            .transactions_by_category(TransactionType::Income, now)
            .await
    }

    pub async fn budget_status(&mut self, now: Timestamp) -> BudgetStatus {
        self.store.budget_status(now).await
    }

    pub async fn category_budget_status(&mut self, category_id: &str, now: Timestamp) -> BudgetStatus {
        self.store.category_budget_status(category_id, now).await
    }

    pub async fn monthly_trend(&mut self, months: usize, now: Timestamp) -> Vec<MonthlyTrendPoint> {
        self.store.monthly_trend(months, now).await
    }

    pub async fn weekly_trend(&mut self, now: Timestamp) -> Vec<WeeklyTrendPoint> {
        self.store.weekly_trend(now).await
    }

    pub async fn insights(&mut self, now: Timestamp) -> Vec<Insight> {
        self.store.insights(now).await
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Expenses far above the usual amount, optionally within one category.
    pub async fn unusual_transactions(&mut self, category_id: Option<&str>) -> Vec<Transaction> {
        let transactions = self.transactions().await;
        self.store
            .analytics()
            .detect_unusual_transactions(&transactions, category_id)
    }

    pub async fn spending_trend(&mut self, now: Timestamp) -> SpendingTrend {
        let transactions = self.transactions().await;
        self.store
            .analytics()
            .spending_trend(&transactions, self.settings.trend_months, now)
    }

    // ── Export ──────────────────────────────────────────────────────

    /// CSV of the filtered transactions with trailing summary rows.
    pub async fn export_csv(&mut self, options: &ExportOptions) -> String {
        let transactions = self.transactions().await;
        let categories = self.categories().await;
        let wallets = self.wallets().await;
        self.export_service
            .export_to_csv(&transactions, &categories, &wallets, options)
    }

    pub async fn export_summary(&mut self, options: &ExportOptions) -> ExportSummary {
        let transactions = self.transactions().await;
        let filtered = self.export_service.filter_transactions(&transactions, options);
        self.export_service.calculate_summary(&filtered)
    }

    #[must_use]
    pub fn export_filename(&self, now: Timestamp) -> String {
        self.export_service
            .generate_filename(EXPORT_FILE_PREFIX, "csv", now)
    }

    // ── Backups ─────────────────────────────────────────────────────

    /// Snapshot all root collections into storage, then prune backups
    /// beyond `max_backups`.
    pub async fn create_backup(&mut self, now: Timestamp) -> Result<BackupMetadata, CoreError> {
        let data = self.snapshot(now).await;
        let metadata = self
            .backup_service
            .create_backup(self.store.storage(), &data)
            .await?;
        self.backup_service
            .cleanup_old_backups(self.store.storage(), self.settings.max_backups)
            .await?;
        Ok(metadata)
    }

    pub async fn list_backups(&self) -> Result<Vec<BackupMetadata>, CoreError> {
        self.backup_service.list_backups(self.store.storage()).await
    }

    /// Replace every root collection with the contents of a stored backup.
    pub async fn restore_backup(&mut self, backup_id: &str) -> Result<(), CoreError> {
        let data = self
            .backup_service
            .restore_backup(self.store.storage(), backup_id)
            .await?;
        self.replace_all(data).await;
        info!(backup_id, "backup restored");
        Ok(())
    }

    pub async fn delete_backup(&self, backup_id: &str) -> Result<(), CoreError> {
        self.backup_service
            .delete_backup(self.store.storage(), backup_id)
            .await
    }

    /// Pretty JSON of all root collections, for saving as a file.
    pub async fn export_backup_json(&mut self, now: Timestamp) -> Result<String, CoreError> {
        let data = self.snapshot(now).await;
        self.backup_service.export_backup_json(&data)
    }

    /// Replace every root collection with a backup file's contents.
    /// Malformed input leaves the current data untouched.
    pub async fn import_backup_json(&mut self, json: &str) -> Result<(), CoreError> {
        let data = self.backup_service.import_backup_json(json)?;
        self.replace_all(data).await;
        info!("backup imported");
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    async fn snapshot(&mut self, now: Timestamp) -> BackupData {
        let transactions = self.transactions().await;
        let budgets = self.budgets().await;
        let wallets = self.wallets().await;
        let categories = self.categories().await;
        self.backup_service
            .snapshot(&transactions, &budgets, &wallets, &categories, now)
    }

    async fn replace_all(&mut self, data: BackupData) {
        self.store
            .set(RootValue::Transactions(data.transactions))
            .await;
        self.store.set(RootValue::Wallets(data.wallets)).await;
        self.store
            .set(RootValue::Categories(data.categories))
            .await;
        self.store.set(RootValue::Budgets(data.budgets)).await;
    }
}
