use tally_config::ConfigError;
use tally_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the `tally` front end.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TallyError>;
