//! Error types for Trellis operations.
//!
//! This module provides the main error type [`TrellisError`]. Model mutations
//! report `NotFound` and `Validation` synchronously; nothing is retried.

use std::io;

use thiserror::Error;

use crate::model::NodeId;

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Node not found: {0}")]
    NotFound(NodeId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl TrellisError {
    /// Create a new `Validation` error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<toml::de::Error> for TrellisError {
    fn from(err: toml::de::Error) -> Self {
        Self::Store(format!("failed to parse document: {err}"))
    }
}

impl From<toml::ser::Error> for TrellisError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Store(format!("failed to serialize document: {err}"))
    }
}
