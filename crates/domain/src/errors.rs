//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for slotbook
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SlotbookError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Slot not available: {0}")]
    SlotUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A concurrent writer won the same storage commit (busy, locked, or a
    /// uniqueness conflict). Callers may translate this into a
    /// domain-specific rejection.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("External sync error: {0}")]
    ExternalSync(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for slotbook operations
pub type Result<T> = std::result::Result<T, SlotbookError>;
