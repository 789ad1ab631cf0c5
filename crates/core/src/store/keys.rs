use crate::models::transaction::TransactionType;

/// One of the four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootKey {
    Transactions,
    Wallets,
    Categories,
    Budgets,
}

impl RootKey {
    pub const ALL: [RootKey; 4] = [
        RootKey::Transactions,
        RootKey::Wallets,
        RootKey::Categories,
        RootKey::Budgets,
    ];

    /// Key under which the collection is persisted as a JSON array.
    pub fn storage_key(self) -> &'static str {
        match self {
            RootKey::Transactions => "transactions",
            RootKey::Wallets => "wallets",
            RootKey::Categories => "categories",
            RootKey::Budgets => "budgets",
        }
    }
}

impl std::fmt::Display for RootKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}

/// A value computed from the roots and never persisted.
///
/// Parameterized variants are memoized per parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DerivedKey {
    ExpenseCategories,
    IncomeCategories,
    TotalBalance,
    SortedTransactions,
    CurrentMonthTransactions,
    MonthlyStats,
    /// Current-month breakdown of one transaction type by category.
    TransactionsByCategory(TransactionType),
    CurrentMonthBudget,
    CurrentMonthCategoryBudgets,
    BudgetStatus,
    /// Budget status of one category id.
    CategoryBudgetStatus(String),
    /// Trend over the last `n` months.
    MonthlyTrend(usize),
    WeeklyTrend,
    LearnedPatterns,
    Insights,
}

/// An input of a derived value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Root(RootKey),
    Derived(DerivedKey),
}

impl DerivedKey {
    /// Direct inputs. The graph is acyclic: derived inputs always sit
    /// closer to the roots than the key itself.
    pub fn dependencies(&self) -> Vec<Node> {
        use DerivedKey as D;
        use Node::{Derived, Root};

        match self {
            D::ExpenseCategories | D::IncomeCategories => vec![Root(RootKey::Categories)],
            D::TotalBalance => vec![Root(RootKey::Wallets)],
            D::SortedTransactions
            | D::MonthlyTrend(_)
            | D::WeeklyTrend
            | D::LearnedPatterns
            | D::Insights => vec![Root(RootKey::Transactions)],
            D::CurrentMonthTransactions => vec![Derived(D::SortedTransactions)],
            D::MonthlyStats | D::TransactionsByCategory(_) => {
                vec![Derived(D::CurrentMonthTransactions)]
            }
            D::CurrentMonthBudget | D::CurrentMonthCategoryBudgets => vec![Root(RootKey::Budgets)],
            D::BudgetStatus => vec![Derived(D::CurrentMonthBudget), Derived(D::MonthlyStats)],
            D::CategoryBudgetStatus(_) => vec![
                Derived(D::CurrentMonthCategoryBudgets),
                Derived(D::CurrentMonthTransactions),
            ],
        }
    }

    /// Every root this key reads, directly or through other derived keys.
    pub fn roots(&self) -> Vec<RootKey> {
        let mut roots = Vec::new();
        for node in self.dependencies() {
            match node {
                Node::Root(root) => roots.push(root),
                Node::Derived(key) => roots.extend(key.roots()),
            }
        }
        roots.sort();
        roots.dedup();
        roots
    }

    pub fn depends_on(&self, root: RootKey) -> bool {
        self.roots().contains(&root)
    }

    /// Whether the value changes with the calendar month of `now`, directly
    /// or through its inputs.
    pub fn is_time_dependent(&self) -> bool {
        use DerivedKey as D;

        let direct = matches!(
            self,
            D::CurrentMonthTransactions
                | D::CurrentMonthBudget
                | D::CurrentMonthCategoryBudgets
                | D::MonthlyTrend(_)
                | D::WeeklyTrend
                | D::Insights
        );
        direct
            || self.dependencies().iter().any(|node| match node {
                Node::Derived(key) => key.is_time_dependent(),
                Node::Root(_) => false,
            })
    }
}
