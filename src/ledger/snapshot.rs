use serde::{Deserialize, Serialize};
use tracing::warn;

use super::category::BudgetCategory;
use super::item::BudgetItem;
use super::ledger::{Ledger, DEFAULT_MONTHLY_BUDGET};

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Persisted form of a ledger. Aggregates are left out; they are rebuilt by
/// replaying the items on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    #[serde(default = "LedgerSnapshot::schema_version_default")]
    pub schema_version: u32,
    #[serde(default)]
    pub items: Vec<BudgetItem>,
    #[serde(default)]
    pub categories: Vec<BudgetCategory>,
    #[serde(default = "LedgerSnapshot::monthly_budget_default")]
    pub monthly_budget: f64,
}

impl LedgerSnapshot {
    pub fn schema_version_default() -> u32 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn monthly_budget_default() -> f64 {
        DEFAULT_MONTHLY_BUDGET
    }

    pub fn is_supported(&self) -> bool {
        self.schema_version <= CURRENT_SCHEMA_VERSION
    }
}

impl From<&Ledger> for LedgerSnapshot {
    fn from(ledger: &Ledger) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            items: ledger.items().to_vec(),
            categories: ledger.categories().to_vec(),
            monthly_budget: ledger.monthly_budget(),
        }
    }
}

impl Ledger {
    /// Rebuilds a ledger from a snapshot by replaying every item onto zeroed
    /// aggregates. Any persisted `spent` values are discarded, so the result
    /// satisfies the aggregate invariants regardless of what was stored.
    ///
    /// Items or categories repeating an earlier id are skipped.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let mut ledger = Ledger::empty();
        ledger.set_monthly_budget(snapshot.monthly_budget);
        for category in snapshot.categories {
            if ledger.category(category.id).is_some() {
                warn!(category = %category.id, "duplicate category id skipped during load");
                continue;
            }
            ledger.insert_category(category);
        }
        for item in snapshot.items {
            if ledger.contains_item(item.id) {
                warn!(item = %item.id, "duplicate item id skipped during load");
                continue;
            }
            ledger.insert_item(item);
        }
        ledger
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::from(self)
    }
}
