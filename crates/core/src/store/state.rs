use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::errors::CoreError;
use crate::models::budget::Budget;
use crate::models::calendar::{Calendar, YearMonth};
use crate::models::categorization::{KeywordTable, LearnedPatterns};
use crate::models::category::{default_categories, ExpenseCategory};
use crate::models::insight::Insight;
use crate::models::settings::Settings;
use crate::models::stats::{BudgetStatus, CategoryStat, MonthlyStats, MonthlyTrendPoint, WeeklyTrendPoint};
use crate::models::transaction::{Timestamp, Transaction, TransactionType};
use crate::models::wallet::{default_wallets, Wallet};
use crate::services::aggregation_service::AggregationService;
use crate::services::analytics_service::AnalyticsService;
use crate::services::categorization_service::CategorizationService;
use crate::storage::traits::KeyValueStorage;

use super::keys::{DerivedKey, RootKey};

/// `now` passed for keys that never look at the clock.
const UNUSED_CLOCK: Timestamp = 0;

/// The full value of one root collection.
#[derive(Debug, Clone, PartialEq)]
pub enum RootValue {
    Transactions(Vec<Transaction>),
    Wallets(Vec<Wallet>),
    Categories(Vec<ExpenseCategory>),
    Budgets(Vec<Budget>),
}

impl RootValue {
    pub fn key(&self) -> RootKey {
        match self {
            RootValue::Transactions(_) => RootKey::Transactions,
            RootValue::Wallets(_) => RootKey::Wallets,
            RootValue::Categories(_) => RootKey::Categories,
            RootValue::Budgets(_) => RootKey::Budgets,
        }
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            RootValue::Transactions(v) => serde_json::to_string(v),
            RootValue::Wallets(v) => serde_json::to_string(v),
            RootValue::Categories(v) => serde_json::to_string(v),
            RootValue::Budgets(v) => serde_json::to_string(v),
        }
    }
}

/// A computed view. Each [`DerivedKey`] always produces the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedValue {
    Categories(Vec<ExpenseCategory>),
    Amount(f64),
    Transactions(Vec<Transaction>),
    MonthlyStats(MonthlyStats),
    CategoryStats(Vec<CategoryStat>),
    Budget(Option<Budget>),
    Budgets(Vec<Budget>),
    BudgetStatus(BudgetStatus),
    MonthlyTrend(Vec<MonthlyTrendPoint>),
    WeeklyTrend(Vec<WeeklyTrendPoint>),
    LearnedPatterns(LearnedPatterns),
    Insights(Vec<Insight>),
}

impl DerivedValue {
    pub fn categories(&self) -> &[ExpenseCategory] {
        match self {
            DerivedValue::Categories(v) => v,
            _ => &[],
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            DerivedValue::Amount(v) => *v,
            _ => 0.0,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        match self {
            DerivedValue::Transactions(v) => v,
            _ => &[],
        }
    }

    pub fn monthly_stats(&self) -> MonthlyStats {
        match self {
            DerivedValue::MonthlyStats(v) => *v,
            _ => MonthlyStats::default(),
        }
    }

    pub fn category_stats(&self) -> &[CategoryStat] {
        match self {
            DerivedValue::CategoryStats(v) => v,
            _ => &[],
        }
    }

    pub fn budget(&self) -> Option<&Budget> {
        match self {
            DerivedValue::Budget(v) => v.as_ref(),
            _ => None,
        }
    }

    pub fn budgets(&self) -> &[Budget] {
        match self {
            DerivedValue::Budgets(v) => v,
            _ => &[],
        }
    }

    pub fn budget_status(&self) -> BudgetStatus {
        match self {
            DerivedValue::BudgetStatus(v) => *v,
            _ => BudgetStatus::default(),
        }
    }

    pub fn monthly_trend(&self) -> &[MonthlyTrendPoint] {
        match self {
            DerivedValue::MonthlyTrend(v) => v,
            _ => &[],
        }
    }

    pub fn weekly_trend(&self) -> &[WeeklyTrendPoint] {
        match self {
            DerivedValue::WeeklyTrend(v) => v,
            _ => &[],
        }
    }

    pub fn learned_patterns(&self) -> Option<&LearnedPatterns> {
        match self {
            DerivedValue::LearnedPatterns(v) => Some(v),
            _ => None,
        }
    }

    pub fn insights(&self) -> &[Insight] {
        match self {
            DerivedValue::Insights(v) => v,
            _ => &[],
        }
    }
}

struct MemoEntry {
    value: Arc<DerivedValue>,
    /// Calendar month of `now` when computed; only checked for time-dependent keys.
    period: Option<YearMonth>,
}

#[derive(Default)]
struct Roots {
    transactions: Option<Vec<Transaction>>,
    wallets: Option<Vec<Wallet>>,
    categories: Option<Vec<ExpenseCategory>>,
    budgets: Option<Vec<Budget>>,
}

/// Holds the four root collections, keeps them in sync with storage, and
/// serves memoized derived views.
///
/// - Roots hydrate lazily on first access. A missing, malformed, or
///   unreadable stored value falls back to the default dataset.
/// - `set` replaces the in-memory value first, drops every memoized value
///   that transitively reads that root, then writes the full collection
///   through to storage. A failed write is logged and the in-memory value kept.
/// - Derived values are computed on read and memoized per key (and per
///   parameter). Time-dependent keys are also recomputed when the calendar
///   month of `now` changes.
///
/// Every operation takes `&mut self`, so writes through one store are
/// applied one at a time.
pub struct ExpenseStore<S: KeyValueStorage> {
    storage: S,
    calendar: Calendar,
    aggregation: AggregationService,
    categorization: CategorizationService,
    analytics: AnalyticsService,
    roots: Roots,
    memo: HashMap<DerivedKey, MemoEntry>,
    computations: usize,
}

impl<S: KeyValueStorage> std::fmt::Debug for ExpenseStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpenseStore")
            .field("storage", &self.storage.name())
            .field("utc_offset_minutes", &self.calendar.offset_minutes())
            .field("memoized", &self.memo.len())
            .field("computations", &self.computations)
            .finish()
    }
}

impl<S: KeyValueStorage> ExpenseStore<S> {
    pub fn new(storage: S, settings: Settings) -> Result<Self, CoreError> {
        let calendar = settings.calendar()?;
        Ok(Self {
            storage,
            calendar,
            aggregation: AggregationService::new(calendar),
            categorization: CategorizationService::default(),
            analytics: AnalyticsService::new(calendar, settings),
            roots: Roots::default(),
            memo: HashMap::new(),
            computations: 0,
        })
    }

    /// Replace the keyword table used for category suggestions.
    pub fn with_keyword_table(mut self, table: KeywordTable) -> Self {
        self.categorization = CategorizationService::new(table);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn aggregation(&self) -> &AggregationService {
        &self.aggregation
    }

    pub fn categorization(&self) -> &CategorizationService {
        &self.categorization
    }

    pub fn analytics(&self) -> &AnalyticsService {
        &self.analytics
    }

    // ── Roots ───────────────────────────────────────────────────────

    pub async fn get(&mut self, root: RootKey) -> RootValue {
        self.hydrate(root).await;
        match root {
            RootKey::Transactions => RootValue::Transactions(self.cached_transactions().to_vec()),
            RootKey::Wallets => RootValue::Wallets(self.cached_wallets().to_vec()),
            RootKey::Categories => RootValue::Categories(self.cached_categories().to_vec()),
            RootKey::Budgets => RootValue::Budgets(self.cached_budgets().to_vec()),
        }
    }

    pub async fn transactions(&mut self) -> &[Transaction] {
        self.hydrate(RootKey::Transactions).await;
        self.cached_transactions()
    }

    pub async fn wallets(&mut self) -> &[Wallet] {
        self.hydrate(RootKey::Wallets).await;
        self.cached_wallets()
    }

    pub async fn categories(&mut self) -> &[ExpenseCategory] {
        self.hydrate(RootKey::Categories).await;
        self.cached_categories()
    }

    pub async fn budgets(&mut self) -> &[Budget] {
        self.hydrate(RootKey::Budgets).await;
        self.cached_budgets()
    }

    /// Replace a root collection, invalidate its dependants, and write it through.
    pub async fn set(&mut self, value: RootValue) {
        let root = value.key();
        let json = value.to_json();

        match value {
            RootValue::Transactions(v) => self.roots.transactions = Some(v),
            RootValue::Wallets(v) => self.roots.wallets = Some(v),
            RootValue::Categories(v) => self.roots.categories = Some(v),
            RootValue::Budgets(v) => self.roots.budgets = Some(v),
        }
        self.invalidate(root);

        match json {
            Ok(json) => self.persist(root, json).await,
            Err(e) => error!(root = %root, error = %e, "failed to serialize; in-memory value kept"),
        }
    }

    pub async fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.set(RootValue::Transactions(transactions)).await
    }

    pub async fn set_wallets(&mut self, wallets: Vec<Wallet>) {
        self.set(RootValue::Wallets(wallets)).await
    }

    pub async fn set_categories(&mut self, categories: Vec<ExpenseCategory>) {
        self.set(RootValue::Categories(categories)).await
    }

    pub async fn set_budgets(&mut self, budgets: Vec<Budget>) {
        self.set(RootValue::Budgets(budgets)).await
    }

    /// Whether `root` has been loaded (or set) since the store was created.
    pub fn is_hydrated(&self, root: RootKey) -> bool {
        match root {
            RootKey::Transactions => self.roots.transactions.is_some(),
            RootKey::Wallets => self.roots.wallets.is_some(),
            RootKey::Categories => self.roots.categories.is_some(),
            RootKey::Budgets => self.roots.budgets.is_some(),
        }
    }

    // ── Derived values ──────────────────────────────────────────────

    /// Memoized value of `key`, hydrating the roots it reads first.
    pub async fn get_derived(&mut self, key: &DerivedKey, now: Timestamp) -> Arc<DerivedValue> {
        for root in key.roots() {
            self.hydrate(root).await;
        }
        self.derive(key, now)
    }

    pub fn is_memoized(&self, key: &DerivedKey) -> bool {
        self.memo.contains_key(key)
    }

    /// Number of derived values computed so far (memo hits excluded).
    pub fn computation_count(&self) -> usize {
        self.computations
    }

    pub async fn expense_categories(&mut self) -> Vec<ExpenseCategory> {
        self.get_derived(&DerivedKey::ExpenseCategories, UNUSED_CLOCK)
            .await
            .categories()
            .to_vec()
    }

    pub async fn income_categories(&mut self) -> Vec<ExpenseCategory> {
        self.get_derived(&DerivedKey::IncomeCategories, UNUSED_CLOCK)
            .await
            .categories()
            .to_vec()
    }

    pub async fn total_balance(&mut self) -> f64 {
        self.get_derived(&DerivedKey::TotalBalance, UNUSED_CLOCK)
            .await
            .amount()
    }

    pub async fn sorted_transactions(&mut self) -> Vec<Transaction> {
        self.get_derived(&DerivedKey::SortedTransactions, UNUSED_CLOCK)
            .await
            .transactions()
            .to_vec()
    }

    pub async fn current_month_transactions(&mut self, now: Timestamp) -> Vec<Transaction> {
        self.get_derived(&DerivedKey::CurrentMonthTransactions, now)
            .await
            .transactions()
            .to_vec()
    }

    pub async fn monthly_stats(&mut self, now: Timestamp) -> MonthlyStats {
        self.get_derived(&DerivedKey::MonthlyStats, now)
            .await
            .monthly_stats()
    }

    pub async fn transactions_by_category(
        &mut self,
        transaction_type: TransactionType,
        now: Timestamp,
    ) -> Vec<CategoryStat> {
        self.get_derived(&DerivedKey::TransactionsByCategory(transaction_type), now)
            .await
            .category_stats()
            .to_vec()
    }

    pub async fn current_month_budget(&mut self, now: Timestamp) -> Option<Budget> {
        self.get_derived(&DerivedKey::CurrentMonthBudget, now)
            .await
            .budget()
            .cloned()
    }

    pub async fn current_month_category_budgets(&mut self, now: Timestamp) -> Vec<Budget> {
        self.get_derived(&DerivedKey::CurrentMonthCategoryBudgets, now)
            .await
            .budgets()
            .to_vec()
    }

    pub async fn budget_status(&mut self, now: Timestamp) -> BudgetStatus {
        self.get_derived(&DerivedKey::BudgetStatus, now)
            .await
            .budget_status()
    }

    pub async fn category_budget_status(&mut self, category_id: &str, now: Timestamp) -> BudgetStatus {
        self.get_derived(&DerivedKey::CategoryBudgetStatus(category_id.to_string()), now)
            .await
            .budget_status()
    }

    pub async fn monthly_trend(&mut self, months: usize, now: Timestamp) -> Vec<MonthlyTrendPoint> {
        self.get_derived(&DerivedKey::MonthlyTrend(months), now)
            .await
            .monthly_trend()
            .to_vec()
    }

    pub async fn weekly_trend(&mut self, now: Timestamp) -> Vec<WeeklyTrendPoint> {
        self.get_derived(&DerivedKey::WeeklyTrend, now)
            .await
            .weekly_trend()
            .to_vec()
    }

    pub async fn learned_patterns(&mut self) -> LearnedPatterns {
        self.get_derived(&DerivedKey::LearnedPatterns, UNUSED_CLOCK)
            .await
            .learned_patterns()
            .cloned()
            .unwrap_or_default()
    }

    pub async fn insights(&mut self, now: Timestamp) -> Vec<Insight> {
        self.get_derived(&DerivedKey::Insights, now)
            .await
            .insights()
            .to_vec()
    }

    // ── Internals ───────────────────────────────────────────────────

    async fn hydrate(&mut self, root: RootKey) {
        if self.is_hydrated(root) {
            return;
        }
        match root {
            RootKey::Transactions => {
                let value = self.load(root, Vec::new).await;
                self.roots.transactions = Some(value);
            }
            RootKey::Wallets => {
                let value = self.load(root, default_wallets).await;
                self.roots.wallets = Some(value);
            }
            RootKey::Categories => {
                let value = self.load(root, default_categories).await;
                self.roots.categories = Some(value);
            }
            RootKey::Budgets => {
                let value = self.load(root, Vec::new).await;
                self.roots.budgets = Some(value);
            }
        }
    }

    async fn load<T: DeserializeOwned>(&self, root: RootKey, default: impl FnOnce() -> T) -> T {
        let key = root.storage_key();
        let stored = match self.storage.get(&[key]).await {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!(root = %root, backend = self.storage.name(), error = %e, "storage read failed; using defaults");
                return default();
            }
        };
        let Some(json) = stored else {
            debug!(root = %root, "nothing stored; using defaults");
            return default();
        };
        match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                warn!(root = %root, error = %e, "stored value is malformed; using defaults");
                default()
            }
        }
    }

    async fn persist(&self, root: RootKey, json: String) {
        let entries = HashMap::from([(root.storage_key().to_string(), json)]);
        if let Err(e) = self.storage.set(entries).await {
            error!(
                root = %root,
                backend = self.storage.name(),
                error = %e,
                "failed to persist; in-memory value kept"
            );
        }
    }

    fn invalidate(&mut self, root: RootKey) {
        let before = self.memo.len();
        self.memo.retain(|key, _| !key.depends_on(root));
        debug!(root = %root, dropped = before - self.memo.len(), "derived values invalidated");
    }

    fn derive(&mut self, key: &DerivedKey, now: Timestamp) -> Arc<DerivedValue> {
        let period = self.calendar.year_month(now);
        if let Some(entry) = self.memo.get(key) {
            if !key.is_time_dependent() || entry.period == period {
                return Arc::clone(&entry.value);
            }
        }

        let value = Arc::new(self.compute(key, now));
        self.computations += 1;
        debug!(key = ?key, "derived value computed");
        self.memo.insert(
            key.clone(),
            MemoEntry {
                value: Arc::clone(&value),
                period,
            },
        );
        value
    }

    fn compute(&mut self, key: &DerivedKey, now: Timestamp) -> DerivedValue {
        use DerivedKey as D;

        match key {
            D::ExpenseCategories => DerivedValue::Categories(
                self.aggregation
                    .categories_of_type(self.cached_categories(), TransactionType::Expense),
            ),
            D::IncomeCategories => DerivedValue::Categories(
                self.aggregation
                    .categories_of_type(self.cached_categories(), TransactionType::Income),
            ),
            D::TotalBalance => DerivedValue::Amount(self.aggregation.total_balance(self.cached_wallets())),
            D::SortedTransactions => DerivedValue::Transactions(
                self.aggregation
                    .sorted_by_date_descending(self.cached_transactions()),
            ),
            D::CurrentMonthTransactions => {
                let sorted = self.derive(&D::SortedTransactions, now);
                let current = match self.calendar.year_month(now) {
                    Some(ym) => self
                        .aggregation
                        .filter_by_month(sorted.transactions(), ym.month, ym.year),
                    None => Vec::new(),
                };
                DerivedValue::Transactions(current)
            }
            D::MonthlyStats => {
                let current = self.derive(&D::CurrentMonthTransactions, now);
                DerivedValue::MonthlyStats(self.aggregation.monthly_stats(current.transactions()))
            }
            D::TransactionsByCategory(transaction_type) => {
                let current = self.derive(&D::CurrentMonthTransactions, now);
                DerivedValue::CategoryStats(
                    self.aggregation
                        .by_category_breakdown(current.transactions(), *transaction_type),
                )
            }
            D::CurrentMonthBudget => DerivedValue::Budget(
                self.aggregation
                    .current_month_budget(self.cached_budgets(), now),
            ),
            D::CurrentMonthCategoryBudgets => DerivedValue::Budgets(
                self.aggregation
                    .current_month_category_budgets(self.cached_budgets(), now),
            ),
            D::BudgetStatus => {
                let budget = self.derive(&D::CurrentMonthBudget, now);
                let stats = self.derive(&D::MonthlyStats, now);
                DerivedValue::BudgetStatus(
                    self.aggregation
                        .budget_status(budget.budget(), &stats.monthly_stats()),
                )
            }
            D::CategoryBudgetStatus(category_id) => {
                let budgets = self.derive(&D::CurrentMonthCategoryBudgets, now);
                let current = self.derive(&D::CurrentMonthTransactions, now);
                let budget = budgets
                    .budgets()
                    .iter()
                    .find(|b| b.category_id.as_deref() == Some(category_id.as_str()));
                let spent = self
                    .aggregation
                    .category_spent(current.transactions(), category_id);
                DerivedValue::BudgetStatus(self.aggregation.category_budget_status(budget, spent))
            }
            D::MonthlyTrend(months) => DerivedValue::MonthlyTrend(
                self.aggregation
                    .monthly_trend(self.cached_transactions(), *months, now),
            ),
            D::WeeklyTrend => DerivedValue::WeeklyTrend(
                self.aggregation
                    .weekly_trend(self.cached_transactions(), now),
            ),
            D::LearnedPatterns => DerivedValue::LearnedPatterns(
                self.categorization
                    .learn_patterns(self.cached_transactions()),
            ),
            D::Insights => DerivedValue::Insights(
                self.analytics
                    .generate_insights(self.cached_transactions(), now),
            ),
        }
    }

    fn cached_transactions(&self) -> &[Transaction] {
        self.roots.transactions.as_deref().unwrap_or_default()
    }

    fn cached_wallets(&self) -> &[Wallet] {
        self.roots.wallets.as_deref().unwrap_or_default()
    }

    fn cached_categories(&self) -> &[ExpenseCategory] {
        self.roots.categories.as_deref().unwrap_or_default()
    }

    fn cached_budgets(&self) -> &[Budget] {
        self.roots.budgets.as_deref().unwrap_or_default()
    }
}
