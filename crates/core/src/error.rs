// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for jt-core operations.

use thiserror::Error;

/// All possible errors that can occur in jt-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    /// Failure reported by the document store. Displays the backend's own
    /// description verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("corrupted note {id}: {reason}")]
    CorruptedData { id: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("no async runtime available to drive the notes subscription")]
    NoRuntime,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for jt-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
