#![doc(test(attr(deny(warnings))))]

//! Finance Core keeps a personal ledger of income and expenses, tracks
//! category budgets against their periods, and raises reminders when spending
//! approaches or exceeds a budget.

pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod reminder;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}
