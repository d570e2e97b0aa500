use std::path::PathBuf;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const DATA_FILE_NAME: &str = "tally.json";

/// Upper bound for `due_window_hours` (one leap year).
pub const MAX_DUE_WINDOW_HOURS: i64 = 24 * 366;
/// Upper bound for `default_recurrence_span_days` (a century).
pub const MAX_RECURRENCE_SPAN_DAYS: i64 = 36_500;

/// Settings for the categorization and recurrence engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Store file. Defaults to `<data dir>/tally/tally.json`.
    pub data_path: Option<PathBuf>,

    /// An occurrence is materialized once it falls within this many hours of now.
    #[serde(default = "Config::default_due_window_hours")]
    pub due_window_hours: i64,

    /// Lifetime of a recurring definition created without an end date.
    #[serde(default = "Config::default_recurrence_span_days")]
    pub default_recurrence_span_days: i64,

    /// `tracing` filter directive, e.g. `tally=debug`. `RUST_LOG` wins when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            due_window_hours: Self::default_due_window_hours(),
            default_recurrence_span_days: Self::default_recurrence_span_days(),
            log_filter: None,
        }
    }
}

impl Config {
    fn default_due_window_hours() -> i64 {
        24
    }

    fn default_recurrence_span_days() -> i64 {
        365
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=MAX_DUE_WINDOW_HOURS).contains(&self.due_window_hours) {
            return Err(ConfigError::Invalid(format!(
                "due_window_hours must be between 0 and {MAX_DUE_WINDOW_HOURS}, got {}",
                self.due_window_hours
            )));
        }
        if !(1..=MAX_RECURRENCE_SPAN_DAYS).contains(&self.default_recurrence_span_days) {
            return Err(ConfigError::Invalid(format!(
                "default_recurrence_span_days must be between 1 and {MAX_RECURRENCE_SPAN_DAYS}, got {}",
                self.default_recurrence_span_days
            )));
        }
        Ok(())
    }

    pub fn due_window(&self) -> Result<Duration, ConfigError> {
        Duration::try_hours(self.due_window_hours).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "due_window_hours {} is out of range",
                self.due_window_hours
            ))
        })
    }

    pub fn recurrence_span(&self) -> Result<Duration, ConfigError> {
        Duration::try_days(self.default_recurrence_span_days).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "default_recurrence_span_days {} is out of range",
                self.default_recurrence_span_days
            ))
        })
    }

    pub fn resolve_data_path(&self) -> PathBuf {
        if let Some(path) = &self.data_path {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("tally").join(DATA_FILE_NAME)
    }
}
