#![doc(test(attr(deny(warnings))))]

//! Habit Core authors structured habit records through a dynamic,
//! step-by-step terminal wizard and keeps them in a strictly validated JSON
//! schema file.

pub mod cli;
pub mod config;
pub mod errors;
pub mod habit;
pub mod storage;
pub mod utils;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing. Safe to call more than once.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Habit Core tracing initialized.");
    });
}
