//! Error handling for the mocap-rs crate
//!
//! This module defines the crate-wide error type and a Result alias used
//! throughout the library.

use thiserror::Error;

/// Main error type for mocap-rs operations
#[derive(Error, Debug)]
pub enum MocapError {
    /// Errors raised by the transient key-value store
    #[error("Store error: {0}")]
    Store(String),

    /// Errors raised while staging or finishing a file export
    #[error("Export error: {0}")]
    Export(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication with the host
    #[error("Channel error: {0}")]
    Channel(String),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MocapError>,
    },
}

impl MocapError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MocapError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for mocap-rs operations
pub type Result<T> = std::result::Result<T, MocapError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<MocapError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
