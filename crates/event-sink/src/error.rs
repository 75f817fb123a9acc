//! Error types for the event sink.

use thiserror::Error;

/// Errors that can occur talking to the event sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Transport or decoding error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
