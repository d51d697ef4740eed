//! Shared handle over a single [`Ledger`].

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::ledger::{
    BudgetCategory, BudgetItem, CategoryDraft, ItemDraft, Ledger, LedgerAudit, LedgerSnapshot,
    LedgerTotals, LedgerView,
};

/// Cloneable handle passed explicitly to every consumer of the ledger.
///
/// Each command runs under one write lock, so readers never observe the item
/// set and the aggregates out of step.
#[derive(Debug, Clone, Default)]
pub struct LedgerHandle {
    inner: Arc<RwLock<Ledger>>,
}

impl LedgerHandle {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn add_item(&self, draft: ItemDraft) -> Uuid {
        self.write().add_item(draft)
    }

    pub fn update_item(&self, item: BudgetItem) -> bool {
        self.write().update_item(item)
    }

    pub fn delete_item(&self, id: Uuid) -> Option<BudgetItem> {
        self.write().delete_item(id)
    }

    pub fn add_category(&self, draft: CategoryDraft) -> Uuid {
        self.write().add_category(draft)
    }

    pub fn update_category(&self, category: BudgetCategory) -> bool {
        self.write().update_category(category)
    }

    pub fn delete_category(&self, id: Uuid) -> Option<BudgetCategory> {
        self.write().delete_category(id)
    }

    pub fn set_monthly_budget(&self, value: f64) {
        self.write().set_monthly_budget(value);
    }

    pub fn reset(&self) {
        self.write().reset();
    }

    /// Swaps in a whole ledger, e.g. one rebuilt from storage.
    pub fn replace(&self, ledger: Ledger) {
        *self.write() = ledger;
    }

    pub fn view(&self) -> LedgerView {
        self.read(Ledger::view)
    }

    pub fn totals(&self) -> LedgerTotals {
        self.read(Ledger::totals)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.read(Ledger::snapshot)
    }

    pub fn audit(&self) -> LedgerAudit {
        self.read(Ledger::audit)
    }

    /// Runs `f` against a consistent view of the ledger.
    pub fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        let guard = self.read_guard();
        f(&*guard)
    }

    /// Runs `f` as one command under the write lock.
    pub fn with_mut<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        let mut guard = self.write();
        f(&mut *guard)
    }

    // Commands finish their aggregate bookkeeping before anything that could
    // panic, so a poisoned lock still guards a consistent ledger.
    fn read_guard(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::thread;

    #[test]
    fn clones_share_state() {
        let handle = LedgerHandle::new(Ledger::new());
        let other = handle.clone();
        other.add_item(ItemDraft::income("Salary", 10.0, Utc::now()));
        assert_eq!(handle.totals().total_income, 10.0);
    }

    #[test]
    fn readers_never_see_partial_commands() {
        let handle = LedgerHandle::new(Ledger::new());
        let writer = {
            let handle = handle.clone();
            thread::spawn(move || {
                for n in 0..200 {
                    let id = handle.add_item(ItemDraft::expense(
                        format!("item {n}"),
                        2.0,
                        "Shopping",
                        Utc::now(),
                    ));
                    if n % 2 == 0 {
                        handle.delete_item(id);
                    }
                }
            })
        };

        for _ in 0..200 {
            let audit = handle.audit();
            assert!(audit.is_consistent(), "inconsistent audit: {audit:?}");
        }
        writer.join().expect("writer thread");
        assert_eq!(handle.read(Ledger::item_count), 100);
    }
}
