//! Error types surfaced by the booster core.

use thiserror::Error;

/// Validation failures returned to the caller. None of them mutate state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoosterError {
    #[error("a booster timer is already running")]
    AlreadyActiveTimer,
    #[error("unknown booster type: {0}")]
    UnknownBoosterType(String),
    #[error("booster pack has no card templates")]
    InvalidCatalog,
    #[error("no timer with id {0}")]
    TimerNotFound(String),
    #[error("timer {0} is not ready to open yet")]
    TimerNotReady(String),
    #[error("invalid timer duration: {0} hours")]
    InvalidDuration(f64),
}

/// Backend failures. The persistence layer logs and absorbs these.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage backend rejected write: {0}")]
    Backend(String),
}
