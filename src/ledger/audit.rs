use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::item::ItemKind;
use super::ledger::{Ledger, LedgerTotals};

const TOLERANCE: f64 = 1e-6;

/// Category whose recorded `spent` differs from what its items add up to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleCategory {
    pub id: Uuid,
    pub name: String,
    pub recorded: f64,
    pub expected: f64,
}

/// Result of recomputing every aggregate from the current items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerAudit {
    pub expected: LedgerTotals,
    pub recorded: LedgerTotals,
    /// Expense items whose category name matches no category.
    pub dangling_items: Vec<Uuid>,
    pub stale_categories: Vec<StaleCategory>,
}

impl LedgerAudit {
    pub fn totals_consistent(&self) -> bool {
        close(self.expected.total_income, self.recorded.total_income)
            && close(self.expected.total_expenses, self.recorded.total_expenses)
            && close(self.expected.balance, self.recorded.balance)
    }

    /// True when totals match and no category has drifted. Dangling items are
    /// tolerated.
    pub fn is_consistent(&self) -> bool {
        self.totals_consistent() && self.stale_categories.is_empty()
    }
}

impl Ledger {
    /// Recomputes aggregates from scratch and compares them with the
    /// incrementally maintained values. Diagnostic only.
    pub fn audit(&self) -> LedgerAudit {
        let mut expected = LedgerTotals::default();
        let mut per_category: HashMap<&str, f64> = HashMap::new();
        let mut dangling_items = Vec::new();

        for item in self.items() {
            match item.kind {
                ItemKind::Income => expected.total_income += item.amount,
                ItemKind::Expense => {
                    expected.total_expenses += item.amount;
                    if self.category_by_name(&item.category).is_some() {
                        *per_category.entry(item.category.as_str()).or_default() += item.amount;
                    } else {
                        dangling_items.push(item.id);
                    }
                }
            }
        }
        expected.balance = expected.total_income - expected.total_expenses;

        let stale_categories = self
            .categories()
            .iter()
            .filter_map(|category| {
                // Only the indexed category for a name receives spend.
                let owns_name = self
                    .category_by_name(&category.name)
                    .is_some_and(|owner| owner.id == category.id);
                let expected = if owns_name {
                    per_category.get(category.name.as_str()).copied().unwrap_or(0.0)
                } else {
                    0.0
                };
                (!close(expected, category.spent)).then(|| StaleCategory {
                    id: category.id,
                    name: category.name.clone(),
                    recorded: category.spent,
                    expected,
                })
            })
            .collect();

        LedgerAudit {
            expected,
            recorded: self.totals(),
            dangling_items,
            stale_categories,
        }
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE
}
