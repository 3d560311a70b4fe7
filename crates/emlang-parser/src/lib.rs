//! # Emlang Parser
//!
//! Grammar validator for Emlang event modeling documents. This crate turns
//! YAML source text into the immutable [`Document`] model.
//!
//! ## Usage
//!
//! ```
//! # use emlang_parser::{parse, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//! slices:
//!   checkout:
//!     - t: Customer/Cart
//!     - c: PlaceOrder
//!     - e: Orders/OrderPlaced
//! "#;
//!
//!     let document = parse(source)?;
//!     assert_eq!(document.slices().len(), 1);
//!     Ok(())
//! }
//! ```

pub mod error;
mod location;
mod parser;
mod yaml;

pub use error::ParseError;
pub use location::Location;

use log::{debug, info};

use emlang_core::Document;

/// Parse source text into a document.
///
/// This is the main entry point for parsing Emlang source. It runs the
/// complete pipeline:
///
/// 1. **Load** - Split the source into physical YAML documents and build a
///    located node tree for each
/// 2. **Validate** - Check each tree against the Emlang grammar and build
///    its sub-document
/// 3. **Merge** - Append every sub-document; later slices replace earlier
///    ones of the same name in the merged map
///
/// Parsing stops at the first error. No partial document is returned.
///
/// # Arguments
///
/// * `source` - The complete Emlang source text
///
/// # Returns
///
/// Returns the parsed [`Document`] on success, or a [`ParseError`] holding
/// the diagnostic with location information on failure.
pub fn parse(source: &str) -> Result<Document, ParseError> {
    info!(source_len = source.len(); "Parsing source");

    let trees = yaml::load(source)?;
    debug!(documents = trees.len(); "Loaded YAML documents");

    let mut document = Document::new(source);
    for tree in &trees {
        let sub_doc = parser::build_sub_doc(tree)?;
        document.push(sub_doc);
    }

    info!(
        documents = document.sub_docs().len(),
        slices = document.slices().len();
        "Parsing completed"
    );
    Ok(document)
}
