use std::collections::BTreeMap;

use crate::models::categorization::{KeywordTable, LearnedPatterns};
use crate::models::category::ExpenseCategory;
use crate::models::transaction::{Transaction, TransactionType};

/// Shortest word (in characters) that is worth learning; shorter ones are noise.
const MIN_LEARNED_WORD_CHARS: usize = 3;

/// Suggests a category for a free-text note.
///
/// Two strategies, both deterministic:
/// - keyword table lookup (substring match, first matching rule wins)
/// - word → category patterns learned from the user's own history,
///   falling back to the keyword table when nothing learned applies
pub struct CategorizationService {
    table: KeywordTable,
}

impl CategorizationService {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Scan the keyword table for the first keyword contained in the note whose
    /// rule maps to an existing expense category.
    pub fn keyword_suggest(
        &self,
        note: &str,
        categories: &[ExpenseCategory],
    ) -> Option<ExpenseCategory> {
        let normalized = note.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        for rule in &self.table.rules {
            if !rule.keywords.iter().any(|k| normalized.contains(k.as_str())) {
                continue;
            }
            let category = categories.iter().find(|c| {
                c.id == rule.category_id && c.category_type == TransactionType::Expense
            });
            if let Some(category) = category {
                return Some(category.clone());
            }
        }

        None
    }

    /// Map every word of every note to that transaction's category.
    /// Later transactions overwrite earlier ones for the same word.
    pub fn learn_patterns(&self, transactions: &[Transaction]) -> LearnedPatterns {
        let mut patterns = LearnedPatterns::new();
        for t in transactions {
            let note = t.note.to_lowercase();
            for word in note.split_whitespace() {
                if word.chars().count() >= MIN_LEARNED_WORD_CHARS {
                    patterns.insert(word, t.category_id.clone());
                }
            }
        }
        patterns
    }

    /// Vote for a category with every note word that has a learned mapping.
    ///
    /// Most votes wins; ties go to the smallest category id. If no word has a
    /// mapping, or the winner no longer exists, falls back to [`Self::keyword_suggest`].
    pub fn learned_suggest(
        &self,
        note: &str,
        patterns: &LearnedPatterns,
        categories: &[ExpenseCategory],
    ) -> Option<ExpenseCategory> {
        let normalized = note.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let mut votes: BTreeMap<&str, usize> = BTreeMap::new();
        for word in normalized.split_whitespace() {
            if let Some(category_id) = patterns.category_for(word) {
                *votes.entry(category_id).or_insert(0) += 1;
            }
        }

        let mut best: Option<(&str, usize)> = None;
        for (category_id, count) in votes {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((category_id, count));
            }
        }

        best.and_then(|(id, _)| categories.iter().find(|c| c.id == id).cloned())
            .or_else(|| self.keyword_suggest(note, categories))
    }
}

impl Default for CategorizationService {
    fn default() -> Self {
        Self::new(KeywordTable::default())
    }
}
