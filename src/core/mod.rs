pub mod ledger_manager;
pub mod services;
pub mod store;

pub use ledger_manager::LedgerManager;
pub use store::LedgerHandle;
