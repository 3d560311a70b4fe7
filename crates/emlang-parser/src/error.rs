//! Error and diagnostic system for the Emlang parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - A source location for every error
//! - Severity levels
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, a source
//! location, and help text. Validation is fail-fast: the first diagnostic
//! aborts parsing and is returned wrapped in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use emlang_parser::error::{Diagnostic, ErrorCode};
//! # use emlang_parser::Location;
//!
//! let diag = Diagnostic::error("unknown top-level key `slice`")
//!     .with_code(ErrorCode::E101)
//!     .with_location(Location::new(1, 1))
//!     .with_help("the only top-level key is `slices`");
//! ```

mod diagnostic;
mod error_code;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use parse_error::ParseError;
pub use severity::Severity;
