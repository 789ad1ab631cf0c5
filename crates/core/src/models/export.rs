use serde::{Deserialize, Serialize};

use super::transaction::Timestamp;

/// Inclusive timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateRange {
    pub fn contains(&self, ts: Timestamp) -> bool {
        ts >= self.start && ts <= self.end
    }
}

/// Which transactions go into an export. Empty id lists mean "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub wallets: Vec<String>,
}

/// Totals appended to (and reported alongside) an export.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net: f64,
    pub transaction_count: usize,
}
