//! tally-config
//!
//! Engine settings and their on-disk persistence.

pub mod atomic;
pub mod error;
pub mod manager;
pub mod model;

pub use atomic::write_atomic;
pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::Config;
