// ═══════════════════════════════════════════════════════════════════
// Analytics Tests — unusual spending, spending trend, insights
// ═══════════════════════════════════════════════════════════════════

use expense_tracker_core::models::calendar::Calendar;
use expense_tracker_core::models::insight::{Insight, SpendingTrend};
use expense_tracker_core::models::settings::Settings;
use expense_tracker_core::models::transaction::{Timestamp, Transaction, TransactionType};
use expense_tracker_core::services::analytics_service::AnalyticsService;

fn ts(year: i32, month: u32, day: u32) -> Timestamp {
    Calendar::utc().timestamp(year, month, day, 12, 0).unwrap()
}

fn expense(id: &str, amount: f64, category: &str, date: Timestamp) -> Transaction {
    Transaction {
        id: id.into(),
        amount,
        transaction_type: TransactionType::Expense,
        category_id: category.into(),
        wallet_id: "cash".into(),
        date,
        note: String::new(),
        created_at: date,
    }
}

fn income(id: &str, amount: f64, date: Timestamp) -> Transaction {
    Transaction {
        transaction_type: TransactionType::Income,
        ..expense(id, amount, "salary", date)
    }
}

fn service() -> AnalyticsService {
    AnalyticsService::new(Calendar::utc(), Settings::utc())
}

/// Six small expenses and one large one, all in "food".
fn outlier_fixture() -> Vec<Transaction> {
    let mut txs: Vec<Transaction> = (1..=6)
        .map(|i| expense(&format!("small-{i}"), 10.0, "food", ts(2025, 0, i)))
        .collect();
    txs.push(expense("big", 1000.0, "food", ts(2025, 0, 20)));
    txs
}

// ═══════════════════════════════════════════════════════════════════
// Unusual transactions
// ═══════════════════════════════════════════════════════════════════

mod unusual_transactions {
    use super::*;

    #[test]
    fn spread_of_outlier_fixture() {
        let spread = service().spending_spread(&outlier_fixture(), Some("food")).unwrap();
        assert_eq!(spread.sample_size, 7);
        assert!((spread.mean - 151.428_571_428_571_42).abs() < 1e-9);
        assert!((spread.std_dev - 346.427_835_050_763_75).abs() < 1e-9);
        assert!((spread.threshold - 844.284_241_530_098_9).abs() < 1e-9);
    }

    #[test]
    fn flags_only_the_large_expense() {
        let flagged = service().detect_unusual_transactions(&outlier_fixture(), Some("food"));
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, "big");
        assert_eq!(flagged[0].amount, 1000.0);
    }

    #[test]
    fn all_categories_when_unscoped() {
        let flagged = service().detect_unusual_transactions(&outlier_fixture(), None);
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn other_category_has_no_sample() {
        assert!(service()
            .detect_unusual_transactions(&outlier_fixture(), Some("transport"))
            .is_empty());
        assert!(service().spending_spread(&outlier_fixture(), Some("transport")).is_none());
    }

    #[test]
    fn too_few_expenses() {
        let txs: Vec<Transaction> = outlier_fixture().into_iter().skip(3).collect();
        assert_eq!(txs.len(), 4);
        assert!(service().detect_unusual_transactions(&txs, None).is_empty());
    }

    #[test]
    fn income_ignored() {
        let mut txs = outlier_fixture();
        txs.push(income("salary", 50_000.0, ts(2025, 0, 25)));
        let flagged = service().detect_unusual_transactions(&txs, None);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].id, "big");
    }

    #[test]
    fn uniform_amounts_flag_nothing() {
        let txs: Vec<Transaction> = (1..=8)
            .map(|i| expense(&format!("t{i}"), 25.0, "food", ts(2025, 0, i)))
            .collect();
        assert!(service().detect_unusual_transactions(&txs, None).is_empty());
    }

    #[test]
    fn sample_minimum_is_configurable() {
        let settings = Settings {
            min_unusual_sample: 10,
            ..Settings::utc()
        };
        let svc = AnalyticsService::new(Calendar::utc(), settings);
        assert!(svc.detect_unusual_transactions(&outlier_fixture(), None).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Spending trend
// ═══════════════════════════════════════════════════════════════════

mod spending_trend {
    use super::*;

    fn three_months(jan: f64, feb: f64, mar: f64) -> Vec<Transaction> {
        vec![
            expense("jan", jan, "food", ts(2025, 0, 10)),
            expense("feb", feb, "food", ts(2025, 1, 10)),
            expense("mar", mar, "food", ts(2025, 2, 10)),
        ]
    }

    fn march() -> Timestamp {
        ts(2025, 2, 15)
    }

    #[test]
    fn series_is_oldest_first() {
        let series = service().monthly_expense_series(&three_months(100.0, 200.0, 300.0), 3, march());
        assert_eq!(series, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn increasing() {
        let trend = service().spending_trend(&three_months(100.0, 200.0, 300.0), 3, march());
        assert_eq!(trend, SpendingTrend::Increasing);
    }

    #[test]
    fn decreasing() {
        let trend = service().spending_trend(&three_months(300.0, 200.0, 100.0), 3, march());
        assert_eq!(trend, SpendingTrend::Decreasing);
    }

    #[test]
    fn small_slope_is_stable() {
        // slope 5 stays under 10% of the first month (10)
        let trend = service().spending_trend(&three_months(100.0, 105.0, 110.0), 3, march());
        assert_eq!(trend, SpendingTrend::Stable);
    }

    #[test]
    fn single_month_is_stable() {
        let trend = service().spending_trend(&three_months(100.0, 200.0, 900.0), 1, march());
        assert_eq!(trend, SpendingTrend::Stable);
    }

    #[test]
    fn no_spending_is_stable() {
        assert_eq!(service().spending_trend(&[], 3, march()), SpendingTrend::Stable);
    }

    #[test]
    fn display() {
        assert_eq!(SpendingTrend::Increasing.to_string(), "increasing");
        assert_eq!(SpendingTrend::Decreasing.to_string(), "decreasing");
        assert_eq!(SpendingTrend::Stable.to_string(), "stable");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Weekend share & insights
// ═══════════════════════════════════════════════════════════════════

mod insights {
    use super::*;

    // 2025-03-01 is a Saturday, 2025-03-03 a Monday
    #[test]
    fn weekend_share_of_current_month() {
        let txs = vec![
            expense("sat", 60.0, "food", ts(2025, 2, 1)),
            expense("mon", 40.0, "food", ts(2025, 2, 3)),
            expense("feb-sat", 500.0, "food", ts(2025, 1, 22)),
        ];
        let share = service().weekend_share(&txs, ts(2025, 2, 20)).unwrap();
        assert!((share - 0.6).abs() < 1e-12);
    }

    #[test]
    fn weekend_share_without_spending() {
        assert!(service().weekend_share(&[], ts(2025, 2, 20)).is_none());
    }

    #[test]
    fn nothing_to_say() {
        assert!(service().generate_insights(&[], ts(2025, 2, 20)).is_empty());
    }

    #[test]
    fn all_insights_in_order() {
        let mut txs: Vec<Transaction> = [6, 7, 8, 9, 10, 13]
            .iter()
            .map(|&day| expense(&format!("jan-{day}"), 10.0, "food", ts(2025, 0, day)))
            .collect();
        txs.push(expense("feb", 100.0, "food", ts(2025, 1, 3)));
        txs.push(expense("mar", 1000.0, "shopping", ts(2025, 2, 1)));

        let insights = service().generate_insights(&txs, ts(2025, 2, 20));
        assert_eq!(
            insights,
            vec![
                Insight::UnusualTransactions { count: 1 },
                Insight::SpendingIncreasing { months: 3 },
                Insight::WeekendHeavy {
                    share_pct: 100.0,
                    threshold_pct: 40.0,
                },
            ]
        );
    }

    #[test]
    fn decreasing_insight() {
        let txs = vec![
            expense("jan", 300.0, "food", ts(2025, 0, 6)),
            expense("feb", 200.0, "food", ts(2025, 1, 3)),
            expense("mar", 100.0, "food", ts(2025, 2, 3)),
        ];
        let insights = service().generate_insights(&txs, ts(2025, 2, 20));
        assert_eq!(insights, vec![Insight::SpendingDecreasing { months: 3 }]);
    }

    #[test]
    fn messages() {
        assert_eq!(
            Insight::UnusualTransactions { count: 2 }.to_string(),
            "Bạn có 2 giao dịch chi tiêu cao bất thường."
        );
        assert_eq!(
            Insight::SpendingIncreasing { months: 3 }.to_string(),
            "Chi tiêu của bạn đang có xu hướng tăng trong 3 tháng gần đây."
        );
        assert_eq!(
            Insight::SpendingDecreasing { months: 3 }.to_string(),
            "Tuyệt vời! Chi tiêu của bạn đang giảm dần trong 3 tháng gần đây."
        );
        assert_eq!(
            Insight::WeekendHeavy {
                share_pct: 72.5,
                threshold_pct: 40.0
            }
            .to_string(),
            "Hơn 40% chi tiêu của bạn diễn ra vào cuối tuần."
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_string(&Insight::UnusualTransactions { count: 1 }).unwrap();
        assert_eq!(json, r#"{"kind":"unusualTransactions","count":1}"#);
    }
}
