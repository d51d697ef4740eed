//! Persistence collaborators. The ledger never calls these itself; the
//! [`LedgerManager`](crate::core::ledger_manager::LedgerManager) drives them.

pub mod json_backend;
pub mod memory;

use crate::{errors::Result, ledger::LedgerSnapshot};

/// Abstraction over an opaque blob store holding one ledger snapshot.
pub trait StorageBackend: Send + Sync {
    /// Returns `None` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<LedgerSnapshot>>;
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()>;
    /// Human-readable location, used in logs and CLI output.
    fn describe(&self) -> String;
}

pub use json_backend::{BackupInfo, JsonStorage};
pub use memory::MemoryStorage;
