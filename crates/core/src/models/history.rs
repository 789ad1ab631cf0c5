use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;

/// Criteria for the transaction history list. `None` / empty means "all".
///
/// Dates are whole calendar days in the tracker's calendar, both inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    /// Matched against the note and category name (case-insensitive) and the amount.
    #[serde(default)]
    pub search: String,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Self::default()
        }
    }

    /// Number of filters other than the search term that are set.
    pub fn active_count(&self) -> usize {
        [
            self.transaction_type.is_some(),
            self.category_id.is_some(),
            self.wallet_id.is_some(),
            self.start_date.is_some(),
            self.end_date.is_some(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}
