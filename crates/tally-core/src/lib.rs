//! tally-core
//!
//! Categorization and recurrence logic for Tally.
//! Depends on tally-domain. No CLI, no terminal I/O; persistence goes through
//! the [`TransactionStore`] trait.

pub mod categorizer;
pub mod error;
pub mod fallback;
pub mod recurrence;
pub mod recurrence_service;
pub mod rule_service;
pub mod storage;
pub mod time;
pub mod transaction_service;

pub use categorizer::*;
pub use error::CoreError;
pub use fallback::{categorize_by_keywords, FallbackCategory, FALLBACK_TABLE};
pub use recurrence::*;
pub use recurrence_service::*;
pub use rule_service::*;
pub use storage::TransactionStore;
pub use time::{Clock, FixedClock};
pub use transaction_service::*;
