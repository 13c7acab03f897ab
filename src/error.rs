//! Error types
//!
//! Per-event errors ([`Error::Validation`], [`Error::Serialization`], [`Error::Publish`]) are recovered from by the caller,
//! whereas the other variants end the current run.

use thiserror::Error;

use crate::validation::ValidationIssue;

/// The main error type of this crate
#[derive(Debug, Error)]
pub enum Error {
    /// The language model output could not be turned into events
    #[error("{0}")]
    Extraction(String),

    /// An event did not pass validation
    #[error("Invalid event data for '{summary}': {issue}")]
    Validation {
        summary: String,
        issue: ValidationIssue,
    },

    /// An event could not be turned into an iCal document
    #[error("Failed to serialize event '{summary}': {reason}")]
    Serialization {
        summary: String,
        reason: String,
    },

    /// An event could not be uploaded
    #[error("Failed to add event '{filename}': {reason}")]
    Publish {
        filename: String,
        reason: String,
    },

    /// The CalDAV client could not be set up, or the target calendar does not exist
    #[error("CalDAV initialization error: {0}")]
    TransportInit(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// The message every unrecoverable extraction failure carries
pub const EXTRACTION_FAILED: &str = "Failed to process events";

pub fn extraction_error() -> Error {
    Error::Extraction(EXTRACTION_FAILED.to_string())
}

pub fn transport_init_error<S: ToString>(message: S) -> Error {
    Error::TransportInit(message.to_string())
}

pub fn config_error<S: ToString>(message: S) -> Error {
    Error::Config(message.to_string())
}
