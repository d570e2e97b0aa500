#![doc(test(attr(deny(warnings))))]

//! Tally categorizes expense-tracker transactions from user keyword rules and
//! a built-in keyword table, and materializes recurring transactions on a
//! scheduler tick.
//!
//! The engine lives in the `tally-*` workspace crates; this crate wires them
//! to configuration, tracing and the `tally_cli` binary.

pub mod cli;
pub mod clock;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter.
pub fn init() {
    init_with_filter(None);
}

/// Initializes global tracing. `filter` is used when `RUST_LOG` is unset.
pub fn init_with_filter(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::debug!("tally tracing initialized");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter(Some("tally=debug"));
    }
}
