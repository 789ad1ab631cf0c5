use serde::{Deserialize, Serialize};

use super::transaction::Timestamp;

/// Whether a budget caps the whole month or a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    Monthly,
    Category,
}

/// A spending cap for one calendar month.
///
/// At most one budget exists per `(budget_type, month, year[, category_id])`;
/// the ledger's upsert keeps it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,

    #[serde(rename = "type")]
    pub budget_type: BudgetType,

    pub amount: f64,

    /// Set iff `budget_type == Category`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    /// Month index 0-11.
    pub month: u32,

    pub year: i32,

    pub created_at: Timestamp,
}

impl Budget {
    /// True when this budget occupies the same `(type, month, year[, category])` slot.
    pub fn same_slot(&self, input: &BudgetInput) -> bool {
        self.budget_type == input.budget_type
            && self.month == input.month
            && self.year == input.year
            && (self.budget_type == BudgetType::Monthly || self.category_id == input.category_id)
    }

    pub fn is_for_month(&self, month: u32, year: i32) -> bool {
        self.month == month && self.year == year
    }
}

/// Form data for creating or replacing a budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    #[serde(rename = "type")]
    pub budget_type: BudgetType,
    pub amount: f64,
    #[serde(default)]
    pub category_id: Option<String>,
    pub month: u32,
    pub year: i32,
}

impl BudgetInput {
    pub fn monthly(amount: f64, month: u32, year: i32) -> Self {
        Self {
            budget_type: BudgetType::Monthly,
            amount,
            category_id: None,
            month,
            year,
        }
    }

    pub fn category(amount: f64, category_id: impl Into<String>, month: u32, year: i32) -> Self {
        Self {
            budget_type: BudgetType::Category,
            amount,
            category_id: Some(category_id.into()),
            month,
            year,
        }
    }
}
