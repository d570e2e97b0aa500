use std::io;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("Recurring definition {0} has a missing or unrecognized pattern")]
    InvalidRecurrencePattern(Uuid),
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
    #[error("Instance of {definition_id} dated {date} already exists")]
    DuplicateInstance {
        definition_id: Uuid,
        date: DateTime<Utc>,
    },
    #[error("Validation failed: {0}")]
    Validation(String),
}
