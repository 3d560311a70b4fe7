//! Error types for Emlang operations.
//!
//! This module provides the main error type [`EmlangError`] which wraps
//! the error conditions that can occur while processing a model.

use std::io;

use thiserror::Error;

use emlang_parser::error::ParseError;

/// The main error type for Emlang operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the parse error, so
/// callers can render the offending line for rich error reporting.
#[derive(Debug, Error)]
pub enum EmlangError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EmlangError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
