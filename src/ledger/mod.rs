//! Ledger domain models, the aggregate-maintaining store, and persistence
//! snapshots.

pub mod audit;
pub mod category;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod item;
pub mod snapshot;

pub use audit::{LedgerAudit, StaleCategory};
pub use category::{default_categories, BudgetCategory, CategoryDraft};
pub use item::{BudgetItem, ItemDraft, ItemKind};
pub use ledger::{Ledger, LedgerTotals, LedgerView, DEFAULT_MONTHLY_BUDGET};
pub use snapshot::{LedgerSnapshot, CURRENT_SCHEMA_VERSION};
