// ═══════════════════════════════════════════════════════════════════
// Categorization Tests — keyword table, learned patterns
// ═══════════════════════════════════════════════════════════════════

use expense_tracker_core::errors::CoreError;
use expense_tracker_core::models::categorization::{KeywordTable, LearnedPatterns};
use expense_tracker_core::models::category::{default_categories, ExpenseCategory};
use expense_tracker_core::models::transaction::{Transaction, TransactionType};
use expense_tracker_core::services::categorization_service::CategorizationService;

fn noted(id: &str, category: &str, note: &str) -> Transaction {
    Transaction {
        id: id.into(),
        amount: 10.0,
        transaction_type: TransactionType::Expense,
        category_id: category.into(),
        wallet_id: "cash".into(),
        date: 0,
        note: note.into(),
        created_at: 0,
    }
}

fn without(id: &str) -> Vec<ExpenseCategory> {
    default_categories().into_iter().filter(|c| c.id != id).collect()
}

// ═══════════════════════════════════════════════════════════════════
// Keyword suggestions
// ═══════════════════════════════════════════════════════════════════

mod keyword_suggest {
    use super::*;

    #[test]
    fn pho_lunch_is_food() {
        let svc = CategorizationService::default();
        let found = svc
            .keyword_suggest("ăn phở buổi trưa", &default_categories())
            .unwrap();
        assert_eq!(found.id, "food");
        assert_eq!(found.name, "Ăn uống");
    }

    #[test]
    fn case_insensitive() {
        let svc = CategorizationService::default();
        let found = svc.keyword_suggest("GRAB to office", &default_categories()).unwrap();
        assert_eq!(found.id, "transport");
    }

    #[test]
    fn english_keywords() {
        let svc = CategorizationService::default();
        let found = svc
            .keyword_suggest("Hospital visit", &default_categories())
            .unwrap();
        assert_eq!(found.id, "health");
    }

    #[test]
    fn earlier_rule_wins() {
        // "cafe" (food) and "grab" (transport) both match
        let svc = CategorizationService::default();
        let found = svc
            .keyword_suggest("grab to the cafe", &default_categories())
            .unwrap();
        assert_eq!(found.id, "food");
    }

    #[test]
    fn no_match() {
        let svc = CategorizationService::default();
        assert!(svc.keyword_suggest("abc 123", &default_categories()).is_none());
    }

    #[test]
    fn empty_or_blank_note() {
        let svc = CategorizationService::default();
        assert!(svc.keyword_suggest("", &default_categories()).is_none());
        assert!(svc.keyword_suggest("   ", &default_categories()).is_none());
    }

    #[test]
    fn missing_category_falls_through_to_next_rule() {
        let svc = CategorizationService::default();
        let found = svc.keyword_suggest("grab to the cafe", &without("food")).unwrap();
        assert_eq!(found.id, "transport");
    }

    #[test]
    fn income_category_with_same_id_is_ignored() {
        let svc = CategorizationService::default();
        let categories = vec![ExpenseCategory::income("food", "Food refunds", "", "")];
        assert!(svc.keyword_suggest("cafe", &categories).is_none());
    }

    #[test]
    fn custom_table_from_json() {
        let table = KeywordTable::from_json(
            r#"{"rules":[{"bucket":"pets","keywords":["Dog Food","VET"],"categoryId":"pets"}]}"#,
        )
        .unwrap();
        assert_eq!(table.rules[0].keywords, vec!["dog food", "vet"]);

        let svc = CategorizationService::new(table);
        let found = svc.keyword_suggest("vet checkup", &default_categories()).unwrap();
        assert_eq!(found.id, "pets");
        assert!(svc.keyword_suggest("ăn phở", &default_categories()).is_none());
    }

    #[test]
    fn table_rule_without_category_rejected() {
        let result = KeywordTable::from_json(
            r#"{"rules":[{"bucket":"x","keywords":["a"],"categoryId":"  "}]}"#,
        );
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn malformed_table_json() {
        let result = KeywordTable::from_json("{not json");
        assert!(matches!(result, Err(CoreError::Deserialization(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Learned patterns
// ═══════════════════════════════════════════════════════════════════

mod learn_patterns {
    use super::*;

    #[test]
    fn maps_words_of_three_or_more_chars() {
        let svc = CategorizationService::default();
        let patterns = svc.learn_patterns(&[noted("1", "gifts", "Lego set for Tom")]);
        assert_eq!(patterns.category_for("lego"), Some("gifts"));
        assert_eq!(patterns.category_for("set"), Some("gifts"));
        assert_eq!(patterns.category_for("for"), Some("gifts"));
        assert_eq!(patterns.category_for("tom"), Some("gifts"));
        assert_eq!(patterns.len(), 4);
    }

    #[test]
    fn short_words_skipped() {
        let svc = CategorizationService::default();
        let patterns = svc.learn_patterns(&[noted("1", "gifts", "a to me")]);
        assert!(patterns.is_empty());
    }

    #[test]
    fn later_transaction_overwrites() {
        let svc = CategorizationService::default();
        let patterns = svc.learn_patterns(&[
            noted("1", "gifts", "lego"),
            noted("2", "family", "LEGO"),
        ]);
        assert_eq!(patterns.category_for("lego"), Some("family"));
    }

    #[test]
    fn empty_history() {
        let svc = CategorizationService::default();
        assert_eq!(svc.learn_patterns(&[]), LearnedPatterns::new());
    }
}

mod learned_suggest {
    use super::*;

    #[test]
    fn majority_vote_wins() {
        let svc = CategorizationService::default();
        let mut patterns = LearnedPatterns::new();
        patterns.insert("lego", "gifts");
        patterns.insert("birthday", "gifts");
        patterns.insert("weekend", "family");

        let found = svc
            .learned_suggest("Lego birthday weekend", &patterns, &default_categories())
            .unwrap();
        assert_eq!(found.id, "gifts");
    }

    #[test]
    fn tie_goes_to_smallest_category_id() {
        let svc = CategorizationService::default();
        let mut patterns = LearnedPatterns::new();
        patterns.insert("lego", "gifts");
        patterns.insert("weekend", "family");

        let found = svc
            .learned_suggest("lego weekend", &patterns, &default_categories())
            .unwrap();
        assert_eq!(found.id, "family");
    }

    #[test]
    fn falls_back_to_keywords_without_learned_words() {
        let svc = CategorizationService::default();
        let found = svc
            .learned_suggest("ăn phở buổi trưa", &LearnedPatterns::new(), &default_categories())
            .unwrap();
        assert_eq!(found.id, "food");
    }

    #[test]
    fn falls_back_when_winner_category_deleted() {
        let svc = CategorizationService::default();
        let mut patterns = LearnedPatterns::new();
        patterns.insert("netflix", "gifts");

        let found = svc
            .learned_suggest("netflix movie", &patterns, &without("gifts"))
            .unwrap();
        assert_eq!(found.id, "entertainment");
    }

    #[test]
    fn learned_from_history_end_to_end() {
        let svc = CategorizationService::default();
        let history = vec![
            noted("1", "pets", "royal canin bag"),
            noted("2", "pets", "canin treats"),
        ];
        let patterns = svc.learn_patterns(&history);
        let found = svc
            .learned_suggest("Canin", &patterns, &default_categories())
            .unwrap();
        assert_eq!(found.id, "pets");
    }

    #[test]
    fn nothing_known() {
        let svc = CategorizationService::default();
        assert!(svc
            .learned_suggest("zzz", &LearnedPatterns::new(), &default_categories())
            .is_none());
        assert!(svc
            .learned_suggest("", &LearnedPatterns::new(), &default_categories())
            .is_none());
    }
}
