use std::collections::BTreeMap;

use crate::models::budget::{Budget, BudgetType};
use crate::models::calendar::{Calendar, YearMonth};
use crate::models::category::ExpenseCategory;
use crate::models::history::HistoryFilter;
use crate::models::stats::{
    BudgetStatus, CategoryStat, MonthBucket, MonthlyStats, MonthlyTrendPoint, WeeklyTrendPoint,
};
use crate::models::transaction::{Timestamp, Transaction, TransactionType};
use crate::models::wallet::Wallet;

/// Upper bound on the number of month buckets a trend view produces (100 years).
pub const MAX_TREND_MONTHS: usize = 1200;

/// Turns the flat transaction log into the read-only views the UI renders:
/// monthly totals, category breakdowns, budget status, and trend buckets.
///
/// Pure business logic — no I/O, no clock. Functions that depend on "the
/// current month" take `now` explicitly, and all timestamp → calendar
/// conversion goes through the service's [`Calendar`].
/// Every function is total: empty input yields zero/empty output.
#[derive(Debug, Clone, Default)]
pub struct AggregationService {
    calendar: Calendar,
}

impl AggregationService {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    // ── Ordering & filtering ────────────────────────────────────────

    /// Newest first. Equal dates are ordered by ascending id so the output is deterministic.
    pub fn sorted_by_date_descending(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut sorted = transactions.to_vec();
        sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        sorted
    }

    /// Transactions whose date falls in `month` (0-11) of `year`, in input order.
    pub fn filter_by_month(
        &self,
        transactions: &[Transaction],
        month: u32,
        year: i32,
    ) -> Vec<Transaction> {
        let target = YearMonth::new(year, month);
        transactions
            .iter()
            .filter(|t| self.calendar.year_month(t.date) == Some(target))
            .cloned()
            .collect()
    }

    /// The month containing `now`, newest first.
    pub fn current_month_transactions(
        &self,
        transactions: &[Transaction],
        now: Timestamp,
    ) -> Vec<Transaction> {
        let Some(current) = self.calendar.year_month(now) else {
            return Vec::new();
        };
        let sorted = self.sorted_by_date_descending(transactions);
        self.filter_by_month(&sorted, current.month, current.year)
    }

    /// Transactions matching every criterion of `filter`, newest first.
    ///
    /// A non-blank search term matches when the note or the category name
    /// contains it (case-insensitive), or the amount's decimal text contains it.
    pub fn filter_history(
        &self,
        transactions: &[Transaction],
        categories: &[ExpenseCategory],
        filter: &HistoryFilter,
    ) -> Vec<Transaction> {
        let term = filter.search.trim();
        let term_lower = term.to_lowercase();

        self.sorted_by_date_descending(transactions)
            .into_iter()
            .filter(|t| filter.transaction_type.map_or(true, |kind| t.transaction_type == kind))
            .filter(|t| filter.category_id.as_ref().map_or(true, |id| &t.category_id == id))
            .filter(|t| filter.wallet_id.as_ref().map_or(true, |id| &t.wallet_id == id))
            .filter(|t| {
                if filter.start_date.is_none() && filter.end_date.is_none() {
                    return true;
                }
                let Some(day) = self.calendar.date(t.date) else {
                    return false;
                };
                filter.start_date.map_or(true, |start| day >= start)
                    && filter.end_date.map_or(true, |end| day <= end)
            })
            .filter(|t| {
                if term.is_empty() {
                    return true;
                }
                let category = categories.iter().find(|c| c.id == t.category_id);
                t.note.to_lowercase().contains(&term_lower)
                    || category.is_some_and(|c| c.name.to_lowercase().contains(&term_lower))
                    || t.amount.to_string().contains(term)
            })
            .collect()
    }

    // ── Totals ──────────────────────────────────────────────────────

    /// Sum income and expense over an already-filtered set (usually one month).
    pub fn monthly_stats(&self, transactions: &[Transaction]) -> MonthlyStats {
        let income = sum_of_type(transactions, TransactionType::Income);
        let expense = sum_of_type(transactions, TransactionType::Expense);
        MonthlyStats {
            income,
            expense,
            balance: income - expense,
            total: income + expense,
        }
    }

    /// Sum of stored wallet balances. Not derived from the transaction log.
    pub fn total_balance(&self, wallets: &[Wallet]) -> f64 {
        wallets.iter().map(|w| w.balance).sum()
    }

    /// Signed net flow per wallet id (income positive, expense negative).
    /// Comparing this with stored balances exposes drift between the two.
    pub fn net_flow_by_wallet(&self, transactions: &[Transaction]) -> BTreeMap<String, f64> {
        let mut flows = BTreeMap::new();
        for t in transactions {
            *flows.entry(t.wallet_id.clone()).or_insert(0.0) += t.signed_amount();
        }
        flows
    }

    /// Expense-only total for one category.
    pub fn category_spent(&self, transactions: &[Transaction], category_id: &str) -> f64 {
        transactions
            .iter()
            .filter(|t| t.is_expense() && t.category_id == category_id)
            .map(|t| t.amount)
            .sum()
    }

    /// Group transactions of `transaction_type` by category.
    ///
    /// Returns an empty list when the type's total is 0. Sorted by amount
    /// (largest first), ties by ascending category id.
    pub fn by_category_breakdown(
        &self,
        transactions: &[Transaction],
        transaction_type: TransactionType,
    ) -> Vec<CategoryStat> {
        let total = sum_of_type(transactions, transaction_type);
        if total <= 0.0 {
            return Vec::new();
        }

        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
        for t in transactions.iter().filter(|t| t.transaction_type == transaction_type) {
            *by_category.entry(t.category_id.as_str()).or_insert(0.0) += t.amount;
        }

        let mut stats: Vec<CategoryStat> = by_category
            .into_iter()
            .map(|(category_id, amount)| CategoryStat {
                category_id: category_id.to_string(),
                amount,
                percentage: percentage_of(amount, total),
            })
            .collect();

        // Stable sort keeps the BTreeMap's id order for equal amounts
        stats.sort_by(|a, b| {
            b.amount
                .partial_cmp(&a.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stats
    }

    // ── Budgets ─────────────────────────────────────────────────────

    /// The monthly budget for the month containing `now`, if one exists.
    pub fn current_month_budget(&self, budgets: &[Budget], now: Timestamp) -> Option<Budget> {
        let current = self.calendar.year_month(now)?;
        budgets
            .iter()
            .find(|b| b.budget_type == BudgetType::Monthly && b.is_for_month(current.month, current.year))
            .cloned()
    }

    /// All category budgets for the month containing `now`.
    pub fn current_month_category_budgets(&self, budgets: &[Budget], now: Timestamp) -> Vec<Budget> {
        let Some(current) = self.calendar.year_month(now) else {
            return Vec::new();
        };
        budgets
            .iter()
            .filter(|b| b.budget_type == BudgetType::Category && b.is_for_month(current.month, current.year))
            .cloned()
            .collect()
    }

    /// Month spending measured against the monthly budget.
    ///
    /// Without a budget: `has_budget = false`, `spent` filled in, everything else zero.
    pub fn budget_status(&self, monthly_budget: Option<&Budget>, stats: &MonthlyStats) -> BudgetStatus {
        status_against(monthly_budget, stats.expense)
    }

    /// Spending in one category measured against that category's budget.
    pub fn category_budget_status(&self, category_budget: Option<&Budget>, spent: f64) -> BudgetStatus {
        status_against(category_budget, spent)
    }

    // ── Trends ──────────────────────────────────────────────────────

    /// `n` calendar-month buckets ending at the month containing `now`, oldest first.
    ///
    /// Each transaction lands in at most one bucket; transactions outside the
    /// window are dropped. Within a bucket, input order is kept. `n` is capped
    /// at [`MAX_TREND_MONTHS`].
    pub fn last_n_months_buckets(
        &self,
        transactions: &[Transaction],
        n: usize,
        now: Timestamp,
    ) -> Vec<MonthBucket> {
        let Some(current) = self.calendar.year_month(now) else {
            return Vec::new();
        };
        let n = n.min(MAX_TREND_MONTHS);
        if n == 0 {
            return Vec::new();
        }

        let oldest = current.back((n - 1) as u32);
        let mut buckets: Vec<MonthBucket> = (0..n)
            .map(|i| {
                let ym = current.back((n - 1 - i) as u32);
                MonthBucket {
                    month: ym.month,
                    year: ym.year,
                    transactions: Vec::new(),
                }
            })
            .collect();

        for t in transactions {
            let Some(ym) = self.calendar.year_month(t.date) else {
                continue;
            };
            let index = months_between(oldest, ym);
            if (0..n as i64).contains(&index) {
                buckets[index as usize].transactions.push(t.clone());
            }
        }

        buckets
    }

    /// Income/expense per month for the last `n` months, oldest first.
    pub fn monthly_trend(
        &self,
        transactions: &[Transaction],
        n: usize,
        now: Timestamp,
    ) -> Vec<MonthlyTrendPoint> {
        self.last_n_months_buckets(transactions, n, now)
            .into_iter()
            .map(|bucket| {
                let stats = self.monthly_stats(&bucket.transactions);
                MonthlyTrendPoint {
                    month: bucket.month,
                    year: bucket.year,
                    income: stats.income,
                    expense: stats.expense,
                }
            })
            .collect()
    }

    /// Income/expense per Sunday-based week of the month containing `now`.
    ///
    /// With `offset` = weekday of the 1st (0 = Sunday), week `w` (1-based)
    /// covers days `(w-1)*7 - offset + 1 ..= w*7 - offset`, clipped to the
    /// month. Every day of the month belongs to exactly one week.
    pub fn weekly_trend(&self, transactions: &[Transaction], now: Timestamp) -> Vec<WeeklyTrendPoint> {
        let Some(current) = self.calendar.year_month(now) else {
            return Vec::new();
        };
        let days = current.days();
        let offset = current.first_weekday();
        let week_count = (days + offset).div_ceil(7);

        let mut weeks: Vec<WeeklyTrendPoint> = (0..week_count)
            .map(|w| {
                let start = (w * 7 + 1).saturating_sub(offset).max(1);
                let end = (w * 7 + 7 - offset).min(days);
                WeeklyTrendPoint {
                    week: w + 1,
                    start_day: start,
                    end_day: end,
                    income: 0.0,
                    expense: 0.0,
                }
            })
            .collect();

        for t in transactions {
            if self.calendar.year_month(t.date) != Some(current) {
                continue;
            }
            let Some(day) = self.calendar.day_of_month(t.date) else {
                continue;
            };
            let index = ((day - 1 + offset) / 7) as usize;
            if let Some(week) = weeks.get_mut(index) {
                match t.transaction_type {
                    TransactionType::Income => week.income += t.amount,
                    TransactionType::Expense => week.expense += t.amount,
                }
            }
        }

        weeks
    }

    // ── Categories ──────────────────────────────────────────────────

    /// Categories of one type, in stored order.
    pub fn categories_of_type(
        &self,
        categories: &[ExpenseCategory],
        category_type: TransactionType,
    ) -> Vec<ExpenseCategory> {
        categories
            .iter()
            .filter(|c| c.category_type == category_type)
            .cloned()
            .collect()
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn sum_of_type(transactions: &[Transaction], transaction_type: TransactionType) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type)
        .map(|t| t.amount)
        .sum()
}

/// `part / whole * 100`, or 0 when the result would not be finite.
pub(crate) fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    let pct = part / whole * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

fn status_against(budget: Option<&Budget>, spent: f64) -> BudgetStatus {
    match budget {
        None => BudgetStatus {
            has_budget: false,
            budget: 0.0,
            spent,
            remaining: 0.0,
            percentage: 0.0,
            is_exceeded: false,
        },
        Some(b) => BudgetStatus {
            has_budget: true,
            budget: b.amount,
            spent,
            remaining: b.amount - spent,
            percentage: percentage_of(spent, b.amount),
            is_exceeded: spent > b.amount,
        },
    }
}

fn months_between(from: YearMonth, to: YearMonth) -> i64 {
    (to.year as i64 - from.year as i64) * 12 + to.month as i64 - from.month as i64
}
