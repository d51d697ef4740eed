#![doc(test(attr(deny(warnings))))]

//! BudgetAI core: an income/expense ledger with incrementally maintained
//! aggregates, JSON persistence, fuzzy search, and an AI insight layer that
//! reads ledger data without ever writing it.

pub mod ai;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod search;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("BudgetAI core tracing initialized.");
    });
}
