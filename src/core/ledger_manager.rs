use tracing::{info, warn};
use uuid::Uuid;

use crate::core::services::{CategoryService, ServiceResult, TransactionService};
use crate::core::store::LedgerHandle;
use crate::errors::LedgerError;
use crate::ledger::{BudgetCategory, BudgetItem, CategoryDraft, ItemDraft, Ledger};
use crate::storage::StorageBackend;

/// Facade that couples the ledger handle with a storage backend.
///
/// Commands run on the handle first; persistence follows outside the write
/// lock. A failed save is reported to the caller but never rolls back the
/// command, so the in-memory ledger stays consistent either way.
pub struct LedgerManager {
    handle: LedgerHandle,
    storage: Box<dyn StorageBackend>,
    autosave: bool,
}

impl LedgerManager {
    /// Opens the persisted ledger, or starts from a freshly seeded one when
    /// storage is empty.
    pub fn open(storage: Box<dyn StorageBackend>, autosave: bool) -> Result<Self, LedgerError> {
        let ledger = match storage.load()? {
            Some(snapshot) => Ledger::from_snapshot(snapshot),
            None => {
                info!(location = %storage.describe(), "no saved ledger, starting fresh");
                Ledger::new()
            }
        };
        Ok(Self {
            handle: LedgerHandle::new(ledger),
            storage,
            autosave,
        })
    }

    pub fn handle(&self) -> &LedgerHandle {
        &self.handle
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn autosave(&self) -> bool {
        self.autosave
    }

    pub fn set_autosave(&mut self, enabled: bool) {
        self.autosave = enabled;
    }

    pub fn add_item(&self, draft: ItemDraft) -> ServiceResult<Uuid> {
        let id = self
            .handle
            .with_mut(|ledger| TransactionService::add(ledger, draft))?;
        self.persist()?;
        Ok(id)
    }

    pub fn update_item(&self, item: BudgetItem) -> ServiceResult<()> {
        self.handle
            .with_mut(|ledger| TransactionService::update(ledger, item))?;
        self.persist()?;
        Ok(())
    }

    pub fn delete_item(&self, id: Uuid) -> ServiceResult<BudgetItem> {
        let removed = self
            .handle
            .with_mut(|ledger| TransactionService::remove(ledger, id))?;
        self.persist()?;
        Ok(removed)
    }

    pub fn add_category(&self, draft: CategoryDraft) -> ServiceResult<Uuid> {
        let id = self
            .handle
            .with_mut(|ledger| CategoryService::add(ledger, draft))?;
        self.persist()?;
        Ok(id)
    }

    pub fn update_category(&self, category: BudgetCategory) -> ServiceResult<()> {
        self.handle
            .with_mut(|ledger| CategoryService::edit(ledger, category))?;
        self.persist()?;
        Ok(())
    }

    pub fn delete_category(&self, id: Uuid) -> ServiceResult<BudgetCategory> {
        let removed = self
            .handle
            .with_mut(|ledger| CategoryService::remove(ledger, id))?;
        self.persist()?;
        Ok(removed)
    }

    pub fn set_monthly_budget(&self, value: f64) -> ServiceResult<()> {
        crate::core::services::validate_amount("Monthly budget", value)?;
        self.handle.set_monthly_budget(value);
        self.persist()?;
        Ok(())
    }

    /// Writes the current snapshot regardless of the autosave setting.
    pub fn save(&self) -> Result<(), LedgerError> {
        let snapshot = self.handle.snapshot();
        self.storage.save(&snapshot)?;
        info!(
            location = %self.storage.describe(),
            items = snapshot.items.len(),
            "ledger saved"
        );
        Ok(())
    }

    /// Replaces in-memory state with whatever storage holds. Returns `false`
    /// when storage is empty, leaving the ledger untouched.
    pub fn reload(&self) -> Result<bool, LedgerError> {
        match self.storage.load()? {
            Some(snapshot) => {
                self.handle.replace(Ledger::from_snapshot(snapshot));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn persist(&self) -> Result<(), LedgerError> {
        if !self.autosave {
            return Ok(());
        }
        self.save().inspect_err(|err| {
            warn!(error = %err, "autosave failed; in-memory ledger kept");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerSnapshot;
    use crate::storage::MemoryStorage;
    use chrono::Utc;
    use std::sync::Arc;

    struct SharedMemory(Arc<MemoryStorage>);

    impl StorageBackend for SharedMemory {
        fn load(&self) -> crate::errors::Result<Option<LedgerSnapshot>> {
            self.0.load()
        }

        fn save(&self, snapshot: &LedgerSnapshot) -> crate::errors::Result<()> {
            self.0.save(snapshot)
        }

        fn describe(&self) -> String {
            self.0.describe()
        }
    }

    struct FailingStorage;

    impl StorageBackend for FailingStorage {
        fn load(&self) -> crate::errors::Result<Option<LedgerSnapshot>> {
            Ok(None)
        }

        fn save(&self, _snapshot: &LedgerSnapshot) -> crate::errors::Result<()> {
            Err(LedgerError::Persistence("disk full".into()))
        }

        fn describe(&self) -> String {
            "failing".into()
        }
    }

    #[test]
    fn autosave_writes_after_each_command() {
        let memory = Arc::new(MemoryStorage::new());
        let manager = LedgerManager::open(Box::new(SharedMemory(memory.clone())), true).unwrap();
        manager
            .add_item(ItemDraft::income("Salary", 1200.0, Utc::now()))
            .unwrap();

        let stored = memory.load().unwrap().expect("snapshot saved");
        assert_eq!(stored.items.len(), 1);
    }

    #[test]
    fn failed_save_keeps_command_applied() {
        let manager = LedgerManager::open(Box::new(FailingStorage), true).unwrap();
        let err = manager
            .add_item(ItemDraft::expense("Bus", 3.0, "Transportation", Utc::now()))
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));

        let audit = manager.handle().audit();
        assert_eq!(audit.recorded.total_expenses, 3.0);
        assert!(audit.is_consistent());
    }

    #[test]
    fn reload_replays_stored_items() {
        let memory = Arc::new(MemoryStorage::new());
        let manager = LedgerManager::open(Box::new(SharedMemory(memory.clone())), false).unwrap();
        manager
            .add_item(ItemDraft::expense("Lunch", 15.0, "Food & Dining", Utc::now()))
            .unwrap();
        assert!(memory.load().unwrap().is_none(), "autosave disabled");

        manager.save().unwrap();
        manager.handle().reset();
        assert!(manager.reload().unwrap());
        assert_eq!(manager.handle().totals().total_expenses, 15.0);
    }
}
