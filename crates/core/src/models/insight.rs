use serde::{Deserialize, Serialize};

/// Direction of monthly spending over a window of months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendingTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for SpendingTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpendingTrend::Increasing => write!(f, "increasing"),
            SpendingTrend::Decreasing => write!(f, "decreasing"),
            SpendingTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Distribution of expense amounts used for outlier detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSpread {
    pub sample_size: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Amounts strictly above this are unusual.
    pub threshold: f64,
}

/// A single observation about the user's spending, rendered for display via `Display`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Insight {
    UnusualTransactions { count: usize },
    SpendingIncreasing { months: usize },
    SpendingDecreasing { months: usize },
    /// Weekend spending share exceeded `threshold_pct` of the month's spending.
    WeekendHeavy { share_pct: f64, threshold_pct: f64 },
}

impl std::fmt::Display for Insight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insight::UnusualTransactions { count } => {
                write!(f, "Bạn có {count} giao dịch chi tiêu cao bất thường.")
            }
            Insight::SpendingIncreasing { months } => {
                write!(f, "Chi tiêu của bạn đang có xu hướng tăng trong {months} tháng gần đây.")
            }
            Insight::SpendingDecreasing { months } => write!(
                f,
                "Tuyệt vời! Chi tiêu của bạn đang giảm dần trong {months} tháng gần đây."
            ),
            Insight::WeekendHeavy { threshold_pct, .. } => write!(
                f,
                "Hơn {threshold_pct:.0}% chi tiêu của bạn diễn ra vào cuối tuần."
            ),
        }
    }
}
