use serde::{Deserialize, Serialize};

use super::transaction::Transaction;

/// Income/expense totals for one set of transactions (usually one month).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub income: f64,
    pub expense: f64,
    /// income - expense
    pub balance: f64,
    /// income + expense
    pub total: f64,
}

/// One slice of the per-category breakdown (pie chart data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category_id: String,
    pub amount: f64,
    /// Share of the type's total, 0-100.
    pub percentage: f64,
}

/// Spending measured against a budget.
///
/// `percentage` is always finite: a budget of 0 reports 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub has_budget: bool,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub is_exceeded: bool,
}

/// Transactions falling in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthBucket {
    /// 0-based month index
    pub month: u32,
    pub year: i32,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrendPoint {
    /// 0-based month index
    pub month: u32,
    pub year: i32,
    pub income: f64,
    pub expense: f64,
}

/// Totals for one week of the current month. Weeks start on Sunday, so the
/// first and last weeks may be partial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrendPoint {
    /// 1-based week number within the month
    pub week: u32,
    /// First day of month covered (inclusive)
    pub start_day: u32,
    /// Last day of month covered (inclusive)
    pub end_day: u32,
    pub income: f64,
    pub expense: f64,
}
