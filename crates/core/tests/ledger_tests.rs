// ═══════════════════════════════════════════════════════════════════
// Ledger Tests — validated transaction, wallet, category and budget edits
// ═══════════════════════════════════════════════════════════════════

use expense_tracker_core::errors::CoreError;
use expense_tracker_core::models::budget::{Budget, BudgetInput, BudgetType};
use expense_tracker_core::models::category::{default_categories, CategoryInput};
use expense_tracker_core::models::transaction::{NewTransaction, Transaction, TransactionType};
use expense_tracker_core::models::wallet::{default_wallets, Wallet, WalletInput};
use expense_tracker_core::services::ledger_service::LedgerService;

const NOW: i64 = 1_736_078_400_000; // 2025-01-05T12:00:00Z

fn balance(wallets: &[Wallet], id: &str) -> f64 {
    wallets.iter().find(|w| w.id == id).unwrap().balance
}

fn funded_wallets() -> Vec<Wallet> {
    let mut wallets = default_wallets();
    wallets[0].balance = 1000.0;
    wallets
}

// ═══════════════════════════════════════════════════════════════════
// Transactions
// ═══════════════════════════════════════════════════════════════════

mod add_transaction {
    use super::*;

    #[test]
    fn expense_subtracts_from_wallet() {
        let ledger = LedgerService::new();
        let mut txs = Vec::new();
        let mut wallets = funded_wallets();

        let t = ledger
            .add_transaction(
                &mut txs,
                &mut wallets,
                NewTransaction::expense(150.0, "food", "cash", NOW).with_note("  phở  "),
                NOW,
            )
            .unwrap();

        assert_eq!(txs.len(), 1);
        assert_eq!(t.note, "phở");
        assert_eq!(t.created_at, NOW);
        assert!(!t.id.is_empty());
        assert_eq!(balance(&wallets, "cash"), 850.0);
    }

    #[test]
    fn income_adds_to_wallet() {
        let ledger = LedgerService::new();
        let mut txs = Vec::new();
        let mut wallets = funded_wallets();
        ledger
            .add_transaction(
                &mut txs,
                &mut wallets,
                NewTransaction::income(500.0, "salary", "bank", NOW),
                NOW,
            )
            .unwrap();
        assert_eq!(balance(&wallets, "bank"), 500.0);
        assert_eq!(balance(&wallets, "cash"), 1000.0);
    }

    #[test]
    fn unique_ids() {
        let ledger = LedgerService::new();
        let mut txs = Vec::new();
        let mut wallets = funded_wallets();
        for _ in 0..10 {
            ledger
                .add_transaction(
                    &mut txs,
                    &mut wallets,
                    NewTransaction::expense(1.0, "food", "cash", NOW),
                    NOW,
                )
                .unwrap();
        }
        let mut ids: Vec<&str> = txs.iter().map(|t| t.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn rejects_bad_amounts_without_writing() {
        let ledger = LedgerService::new();
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let mut txs = Vec::new();
            let mut wallets = funded_wallets();
            let result = ledger.add_transaction(
                &mut txs,
                &mut wallets,
                NewTransaction::expense(amount, "food", "cash", NOW),
                NOW,
            );
            assert!(matches!(result, Err(CoreError::ValidationError(_))), "amount {amount}");
            assert!(txs.is_empty());
            assert_eq!(balance(&wallets, "cash"), 1000.0);
        }
    }

    #[test]
    fn requires_category_and_wallet() {
        let ledger = LedgerService::new();
        let wallets = funded_wallets();
        let no_category = NewTransaction::expense(10.0, " ", "cash", NOW);
        assert!(matches!(
            ledger.validate_transaction(&no_category, &wallets),
            Err(CoreError::ValidationError(_))
        ));
        let no_wallet = NewTransaction::expense(10.0, "food", "", NOW);
        assert!(matches!(
            ledger.validate_transaction(&no_wallet, &wallets),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn unknown_wallet_rejected() {
        let ledger = LedgerService::new();
        let mut txs = Vec::new();
        let mut wallets = funded_wallets();
        let result = ledger.add_transaction(
            &mut txs,
            &mut wallets,
            NewTransaction::expense(10.0, "food", "momo", NOW),
            NOW,
        );
        assert!(matches!(result, Err(CoreError::WalletNotFound(id)) if id == "momo"));
        assert!(txs.is_empty());
    }
}

mod update_and_remove_transaction {
    use super::*;

    fn seeded() -> (Vec<Transaction>, Vec<Wallet>, String) {
        let ledger = LedgerService::new();
        let mut txs = Vec::new();
        let mut wallets = funded_wallets();
        let t = ledger
            .add_transaction(
                &mut txs,
                &mut wallets,
                NewTransaction::expense(200.0, "food", "cash", NOW),
                NOW,
            )
            .unwrap();
        (txs, wallets, t.id)
    }

    #[test]
    fn update_moves_amount_between_wallets() {
        let (mut txs, mut wallets, id) = seeded();
        let updated = LedgerService::new()
            .update_transaction(
                &mut txs,
                &mut wallets,
                &id,
                NewTransaction::expense(50.0, "transport", "bank", NOW + 1),
            )
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.created_at, NOW);
        assert_eq!(updated.category_id, "transport");
        assert_eq!(txs.len(), 1);
        assert_eq!(balance(&wallets, "cash"), 1000.0);
        assert_eq!(balance(&wallets, "bank"), -50.0);
    }

    #[test]
    fn update_switching_type() {
        let (mut txs, mut wallets, id) = seeded();
        LedgerService::new()
            .update_transaction(
                &mut txs,
                &mut wallets,
                &id,
                NewTransaction::income(200.0, "refund", "cash", NOW),
            )
            .unwrap();
        assert_eq!(txs[0].transaction_type, TransactionType::Income);
        assert_eq!(balance(&wallets, "cash"), 1200.0);
    }

    #[test]
    fn update_unknown_id() {
        let (mut txs, mut wallets, _) = seeded();
        let result = LedgerService::new().update_transaction(
            &mut txs,
            &mut wallets,
            "missing",
            NewTransaction::expense(1.0, "food", "cash", NOW),
        );
        assert!(matches!(result, Err(CoreError::TransactionNotFound(_))));
        assert_eq!(balance(&wallets, "cash"), 800.0);
    }

    #[test]
    fn invalid_update_changes_nothing() {
        let (mut txs, mut wallets, id) = seeded();
        let before = txs.clone();
        let result = LedgerService::new().update_transaction(
            &mut txs,
            &mut wallets,
            &id,
            NewTransaction::expense(-1.0, "food", "cash", NOW),
        );
        assert!(result.is_err());
        assert_eq!(txs, before);
        assert_eq!(balance(&wallets, "cash"), 800.0);
    }

    #[test]
    fn remove_restores_balance() {
        let (mut txs, mut wallets, id) = seeded();
        let removed = LedgerService::new()
            .remove_transaction(&mut txs, &mut wallets, &id)
            .unwrap();
        assert_eq!(removed.amount, 200.0);
        assert!(txs.is_empty());
        assert_eq!(balance(&wallets, "cash"), 1000.0);
    }

    #[test]
    fn remove_after_wallet_deleted() {
        let (mut txs, mut wallets, id) = seeded();
        wallets.retain(|w| w.id != "cash");
        LedgerService::new()
            .remove_transaction(&mut txs, &mut wallets, &id)
            .unwrap();
        assert!(txs.is_empty());
    }

    #[test]
    fn remove_unknown_id() {
        let (mut txs, mut wallets, _) = seeded();
        let result = LedgerService::new().remove_transaction(&mut txs, &mut wallets, "nope");
        assert!(matches!(result, Err(CoreError::TransactionNotFound(_))));
        assert_eq!(txs.len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Wallets & categories
// ═══════════════════════════════════════════════════════════════════

mod wallets {
    use super::*;

    #[test]
    fn add_update_remove() {
        let ledger = LedgerService::new();
        let mut wallets = default_wallets();

        let momo = ledger
            .add_wallet(&mut wallets, WalletInput::named("  MoMo ", 250.0))
            .unwrap();
        assert_eq!(momo.name, "MoMo");
        assert_eq!(wallets.len(), 4);

        let renamed = ledger
            .update_wallet(&mut wallets, &momo.id, WalletInput::named("MoMo Wallet", 300.0))
            .unwrap();
        assert_eq!(renamed.balance, 300.0);

        ledger.remove_wallet(&mut wallets, &momo.id).unwrap();
        assert_eq!(wallets.len(), 3);
    }

    #[test]
    fn validation() {
        let ledger = LedgerService::new();
        let mut wallets = default_wallets();
        assert!(matches!(
            ledger.add_wallet(&mut wallets, WalletInput::named("   ", 0.0)),
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            ledger.add_wallet(&mut wallets, WalletInput::named("X", f64::NAN)),
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            ledger.update_wallet(&mut wallets, "ghost", WalletInput::named("X", 1.0)),
            Err(CoreError::WalletNotFound(_))
        ));
        assert!(matches!(
            ledger.remove_wallet(&mut wallets, "ghost"),
            Err(CoreError::WalletNotFound(_))
        ));
        assert_eq!(wallets.len(), 3);
    }
}

mod categories {
    use super::*;

    #[test]
    fn add_update_remove() {
        let ledger = LedgerService::new();
        let mut categories = default_categories();

        let coffee = ledger
            .add_category(&mut categories, CategoryInput::new("Coffee", TransactionType::Expense))
            .unwrap();
        assert_eq!(categories.len(), 28);

        let updated = ledger
            .update_category(
                &mut categories,
                &coffee.id,
                CategoryInput::new("Tips", TransactionType::Income),
            )
            .unwrap();
        assert_eq!(updated.category_type, TransactionType::Income);
        assert_eq!(updated.name, "Tips");

        ledger.remove_category(&mut categories, &coffee.id).unwrap();
        assert_eq!(categories.len(), 27);
    }

    #[test]
    fn validation() {
        let ledger = LedgerService::new();
        let mut categories = default_categories();
        assert!(matches!(
            ledger.add_category(&mut categories, CategoryInput::new("", TransactionType::Expense)),
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            ledger.remove_category(&mut categories, "ghost"),
            Err(CoreError::CategoryNotFound(_))
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Budgets
// ═══════════════════════════════════════════════════════════════════

mod budgets {
    use super::*;

    #[test]
    fn upsert_updates_same_slot() {
        let ledger = LedgerService::new();
        let mut budgets: Vec<Budget> = Vec::new();

        let first = ledger
            .upsert_budget(&mut budgets, BudgetInput::monthly(1000.0, 0, 2025), NOW)
            .unwrap();
        let second = ledger
            .upsert_budget(&mut budgets, BudgetInput::monthly(1500.0, 0, 2025), NOW + 1)
            .unwrap();

        assert_eq!(budgets.len(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(budgets[0].amount, 1500.0);
        assert_eq!(budgets[0].created_at, NOW);
    }

    #[test]
    fn distinct_slots() {
        let ledger = LedgerService::new();
        let mut budgets = Vec::new();
        ledger
            .upsert_budget(&mut budgets, BudgetInput::monthly(1000.0, 0, 2025), NOW)
            .unwrap();
        ledger
            .upsert_budget(&mut budgets, BudgetInput::monthly(1000.0, 1, 2025), NOW)
            .unwrap();
        ledger
            .upsert_budget(&mut budgets, BudgetInput::category(200.0, "food", 0, 2025), NOW)
            .unwrap();
        ledger
            .upsert_budget(&mut budgets, BudgetInput::category(100.0, "transport", 0, 2025), NOW)
            .unwrap();
        ledger
            .upsert_budget(&mut budgets, BudgetInput::category(250.0, "food", 0, 2025), NOW)
            .unwrap();

        assert_eq!(budgets.len(), 4);
        let food = budgets
            .iter()
            .find(|b| b.category_id.as_deref() == Some("food"))
            .unwrap();
        assert_eq!(food.amount, 250.0);
        assert_eq!(food.budget_type, BudgetType::Category);
    }

    #[test]
    fn monthly_budget_drops_category() {
        let ledger = LedgerService::new();
        let mut budgets = Vec::new();
        let input = BudgetInput {
            category_id: Some("food".into()),
            ..BudgetInput::monthly(500.0, 3, 2025)
        };
        let budget = ledger.upsert_budget(&mut budgets, input, NOW).unwrap();
        assert_eq!(budget.category_id, None);
    }

    #[test]
    fn validation() {
        let ledger = LedgerService::new();
        let mut budgets = Vec::new();
        let invalid = vec![
            BudgetInput::monthly(0.0, 0, 2025),
            BudgetInput::monthly(-10.0, 0, 2025),
            BudgetInput::monthly(f64::NAN, 0, 2025),
            BudgetInput::monthly(100.0, 12, 2025),
            BudgetInput::category(100.0, "  ", 0, 2025),
            BudgetInput {
                category_id: None,
                ..BudgetInput::category(100.0, "food", 0, 2025)
            },
        ];
        for input in invalid {
            let result = ledger.upsert_budget(&mut budgets, input.clone(), NOW);
            assert!(matches!(result, Err(CoreError::ValidationError(_))), "{input:?}");
        }
        assert!(budgets.is_empty());
    }

    #[test]
    fn remove() {
        let ledger = LedgerService::new();
        let mut budgets = Vec::new();
        let b = ledger
            .upsert_budget(&mut budgets, BudgetInput::monthly(1.0, 0, 2025), NOW)
            .unwrap();
        assert!(matches!(
            ledger.remove_budget(&mut budgets, "ghost"),
            Err(CoreError::BudgetNotFound(_))
        ));
        ledger.remove_budget(&mut budgets, &b.id).unwrap();
        assert!(budgets.is_empty());
    }
}
