#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use budgetai_core::{
    config::ConfigManager, core::LedgerManager, storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated managers backed by unique directories for each test.
pub fn setup_test_env() -> (LedgerManager, ConfigManager, PathBuf) {
    let base = temp_base();
    let ledger_root = base.join("ledger");
    let storage = JsonStorage::new(ledger_root.clone(), Some(3)).expect("create json storage");
    let ledger_manager = LedgerManager::open(Box::new(storage), true).expect("open ledger");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");

    (ledger_manager, config_manager, ledger_root)
}

/// Deterministic pseudo-random sequence for command generation.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (self.0 >> 33) as u32
    }

    pub fn below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound.max(1)
    }
}
