use crate::models::calendar::Calendar;
use crate::models::insight::{Insight, SpendingSpread, SpendingTrend};
use crate::models::settings::Settings;
use crate::models::transaction::{Timestamp, Transaction};
use crate::services::aggregation_service::AggregationService;

/// Spending analytics on top of the aggregation views: outlier detection,
/// month-over-month trend, and human-readable insights.
///
/// Thresholds come from [`Settings`]. Like the aggregation engine, nothing
/// here reads the clock; `now` is always passed in.
pub struct AnalyticsService {
    aggregation: AggregationService,
    settings: Settings,
}

impl AnalyticsService {
    pub fn new(calendar: Calendar, settings: Settings) -> Self {
        Self {
            aggregation: AggregationService::new(calendar),
            settings,
        }
    }

    /// Mean and population standard deviation of expense amounts, optionally
    /// scoped to one category.
    ///
    /// Returns `None` when fewer than `min_unusual_sample` expenses qualify.
    pub fn spending_spread(
        &self,
        transactions: &[Transaction],
        category_id: Option<&str>,
    ) -> Option<SpendingSpread> {
        let amounts: Vec<f64> = qualifying_expenses(transactions, category_id)
            .map(|t| t.amount)
            .collect();

        if amounts.is_empty() || amounts.len() < self.settings.min_unusual_sample {
            return None;
        }

        let n = amounts.len() as f64;
        let mean = amounts.iter().sum::<f64>() / n;
        let variance = amounts.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / n;
        let std_dev = variance.sqrt();

        Some(SpendingSpread {
            sample_size: amounts.len(),
            mean,
            std_dev,
            threshold: mean + self.settings.unusual_stddev_multiplier * std_dev,
        })
    }

    /// Expenses strictly above `mean + k * std_dev` (k = `unusual_stddev_multiplier`).
    /// Empty when the sample is too small.
    pub fn detect_unusual_transactions(
        &self,
        transactions: &[Transaction],
        category_id: Option<&str>,
    ) -> Vec<Transaction> {
        let Some(spread) = self.spending_spread(transactions, category_id) else {
            return Vec::new();
        };
        qualifying_expenses(transactions, category_id)
            .filter(|t| t.amount > spread.threshold)
            .cloned()
            .collect()
    }

    /// Total expense per month over the last `months` months, oldest first.
    /// Uses the same buckets as the monthly trend chart.
    pub fn monthly_expense_series(
        &self,
        transactions: &[Transaction],
        months: usize,
        now: Timestamp,
    ) -> Vec<f64> {
        self.aggregation
            .monthly_trend(transactions, months, now)
            .into_iter()
            .map(|p| p.expense)
            .collect()
    }

    /// Classify spending over the last `months` months by the least-squares
    /// slope of monthly expense against month index (0 = oldest month).
    ///
    /// `Increasing` if slope > `trend_threshold * oldest_month`, `Decreasing`
    /// if slope < `-trend_threshold * oldest_month`, otherwise `Stable`.
    /// Fewer than two months is always `Stable`.
    pub fn spending_trend(
        &self,
        transactions: &[Transaction],
        months: usize,
        now: Timestamp,
    ) -> SpendingTrend {
        let series = self.monthly_expense_series(transactions, months, now);
        let Some(slope) = least_squares_slope(&series) else {
            return SpendingTrend::Stable;
        };

        let threshold = series[0] * self.settings.trend_threshold;
        if slope > threshold {
            SpendingTrend::Increasing
        } else if slope < -threshold {
            SpendingTrend::Decreasing
        } else {
            SpendingTrend::Stable
        }
    }

    /// Fraction (0-1) of the current month's expense spent on Saturdays and
    /// Sundays. `None` when nothing was spent this month.
    pub fn weekend_share(&self, transactions: &[Transaction], now: Timestamp) -> Option<f64> {
        let calendar = self.aggregation.calendar();
        let this_month = self.aggregation.current_month_transactions(transactions, now);

        let mut total = 0.0;
        let mut weekend = 0.0;
        for t in this_month.iter().filter(|t| t.is_expense()) {
            total += t.amount;
            if matches!(calendar.weekday(t.date), Some(0) | Some(6)) {
                weekend += t.amount;
            }
        }

        if total > 0.0 {
            Some(weekend / total)
        } else {
            None
        }
    }

    /// Compose insights, in this order:
    /// 1. count of unusual expenses across the history (if any)
    /// 2. spending trend over `trend_months` (if not stable)
    /// 3. weekend-heavy spending this month (if above `weekend_share_threshold`)
    pub fn generate_insights(&self, transactions: &[Transaction], now: Timestamp) -> Vec<Insight> {
        let mut insights = Vec::new();

        let unusual = self.detect_unusual_transactions(transactions, None);
        if !unusual.is_empty() {
            insights.push(Insight::UnusualTransactions { count: unusual.len() });
        }

        let months = self.settings.trend_months;
        match self.spending_trend(transactions, months, now) {
            SpendingTrend::Increasing => insights.push(Insight::SpendingIncreasing { months }),
            SpendingTrend::Decreasing => insights.push(Insight::SpendingDecreasing { months }),
            SpendingTrend::Stable => {}
        }

        if let Some(share) = self.weekend_share(transactions, now) {
            if share > self.settings.weekend_share_threshold {
                insights.push(Insight::WeekendHeavy {
                    share_pct: share * 100.0,
                    threshold_pct: self.settings.weekend_share_threshold * 100.0,
                });
            }
        }

        insights
    }
}

fn qualifying_expenses<'a>(
    transactions: &'a [Transaction],
    category_id: Option<&'a str>,
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions
        .iter()
        .filter(move |t| t.is_expense() && category_id.map_or(true, |id| t.category_id == id))
}

/// Ordinary least-squares slope of `ys` against x = 0, 1, 2, ...
/// `None` for fewer than two points.
fn least_squares_slope(ys: &[f64]) -> Option<f64> {
    if ys.len() < 2 {
        return None;
    }
    let n = ys.len() as f64;
    let sum_x = n * (n - 1.0) / 2.0;
    let sum_x2 = n * (n - 1.0) * (2.0 * n - 1.0) / 6.0;
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = ys.iter().enumerate().map(|(i, y)| i as f64 * y).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denominator)
}
