//! tally-domain
//!
//! Pure domain models (Transaction, CategoryRule, Classification).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod classification;
pub mod common;
pub mod rule;
pub mod transaction;

pub use classification::*;
pub use common::*;
pub use rule::*;
pub use transaction::*;
