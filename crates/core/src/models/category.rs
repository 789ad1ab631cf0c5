use serde::{Deserialize, Serialize};

use super::transaction::TransactionType;

/// A user-visible category. Despite the name, it covers income categories too
/// (`category_type` tells which list it belongs to).
///
/// Transactions reference categories by id only; deleting a category leaves
/// those transactions pointing at nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

impl ExpenseCategory {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        category_type: TransactionType,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            category_type,
        }
    }

    pub fn expense(id: &str, name: &str, icon: &str, color: &str) -> Self {
        Self::new(id, name, icon, color, TransactionType::Expense)
    }

    pub fn income(id: &str, name: &str, icon: &str, color: &str) -> Self {
        Self::new(id, name, icon, color, TransactionType::Income)
    }
}

pub fn default_expense_categories() -> Vec<ExpenseCategory> {
    vec![
        ExpenseCategory::expense("food", "Ăn uống", "zi-home", "#ef4444"),
        ExpenseCategory::expense("transport", "Di chuyển", "zi-location", "#f59e0b"),
        ExpenseCategory::expense("shopping", "Mua sắm", "zi-gallery", "#ec4899"),
        ExpenseCategory::expense("entertainment", "Giải trí", "zi-play", "#8b5cf6"),
        ExpenseCategory::expense("bills", "Hóa đơn", "zi-note", "#06b6d4"),
        ExpenseCategory::expense("health", "Sức khỏe", "zi-heart", "#10b981"),
        ExpenseCategory::expense("education", "Giáo dục", "zi-bookmark", "#3b82f6"),
        ExpenseCategory::expense("housing", "Nhà ở", "zi-home", "#059669"),
        ExpenseCategory::expense("clothing", "Quần áo", "zi-user", "#d946ef"),
        ExpenseCategory::expense("beauty", "Làm đẹp", "zi-star", "#f472b6"),
        ExpenseCategory::expense("sports", "Thể thao", "zi-poll", "#0ea5e9"),
        ExpenseCategory::expense("travel", "Du lịch", "zi-location-solid", "#14b8a6"),
        ExpenseCategory::expense("communication", "Liên lạc", "zi-call", "#3b82f6"),
        ExpenseCategory::expense("insurance", "Bảo hiểm", "zi-shield-solid", "#6366f1"),
        ExpenseCategory::expense("family", "Gia đình", "zi-group", "#f59e0b"),
        ExpenseCategory::expense("pets", "Thú cưng", "zi-heart-solid", "#84cc16"),
        ExpenseCategory::expense("gifts", "Quà tặng", "zi-photo", "#f43f5e"),
        ExpenseCategory::expense("other-expense", "Khác", "zi-more-grid", "#6b7280"),
    ]
}

pub fn default_income_categories() -> Vec<ExpenseCategory> {
    vec![
        ExpenseCategory::income("salary", "Lương", "zi-star", "#10b981"),
        ExpenseCategory::income("bonus", "Thưởng", "zi-star-solid", "#f59e0b"),
        ExpenseCategory::income("gift", "Quà tặng", "zi-photo", "#ec4899"),
        ExpenseCategory::income("investment", "Đầu tư", "zi-poll", "#3b82f6"),
        ExpenseCategory::income("business", "Kinh doanh", "zi-poll-solid", "#8b5cf6"),
        ExpenseCategory::income("part-time", "Làm thêm", "zi-clock-2", "#06b6d4"),
        ExpenseCategory::income("refund", "Hoàn tiền", "zi-reply", "#14b8a6"),
        ExpenseCategory::income("rental", "Cho thuê", "zi-home", "#84cc16"),
        ExpenseCategory::income("other-income", "Khác", "zi-more-grid", "#6b7280"),
    ]
}

/// Expense categories followed by income categories, as used when storage holds none.
pub fn default_categories() -> Vec<ExpenseCategory> {
    let mut all = default_expense_categories();
    all.extend(default_income_categories());
    all
}

/// Form data for creating or editing a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "type")]
    pub category_type: TransactionType,
}

impl CategoryInput {
    pub fn new(name: impl Into<String>, category_type: TransactionType) -> Self {
        Self {
            name: name.into(),
            icon: "zi-more-grid".to_string(),
            color: "#6b7280".to_string(),
            category_type,
        }
    }
}
