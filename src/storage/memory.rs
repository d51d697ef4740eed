use std::sync::{Mutex, PoisonError};

use crate::{
    errors::Result,
    ledger::LedgerSnapshot,
    utils::persistence::parse_snapshot,
};

use super::StorageBackend;

/// Keeps the serialized snapshot in memory. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a raw JSON blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Mutex::new(Some(blob.into())),
        }
    }

    pub fn blob(&self) -> Option<String> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Result<Option<LedgerSnapshot>> {
        self.blob().as_deref().map(parse_snapshot).transpose()
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(json);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;

    #[test]
    fn empty_store_loads_nothing() {
        assert!(MemoryStorage::new().load().unwrap().is_none());
    }

    #[test]
    fn saved_snapshot_loads_back() {
        let storage = MemoryStorage::new();
        let snapshot = Ledger::new().snapshot();
        storage.save(&snapshot).unwrap();
        assert_eq!(storage.load().unwrap(), Some(snapshot));
    }
}
