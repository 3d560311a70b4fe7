//! Emlang - A YAML-based language for event modeling.
//!
//! Parsing, layout, linting, formatting and HTML rendering for Emlang
//! models. A model is a set of named slices, each an ordered list of
//! triggers, commands, events, exceptions and views, optionally with
//! given/when/then tests.

pub mod config;
pub mod export;
pub mod format;
pub mod layout;
pub mod lint;

mod error;

pub use emlang_core::{
    Document, Element, ElementType, PropEntry, PropValue, Slice, SubDoc, Test, document,
    element, slice, value,
};

pub use error::EmlangError;

use log::{debug, info, trace};

use config::AppConfig;
use export::HtmlExporter;
use format::FormatOptions;
use layout::LayoutGeometry;
use lint::{Issue, Linter};

/// Builder for parsing and processing Emlang models.
///
/// This provides an API for the whole pipeline: parsing, layout, linting,
/// formatting and HTML rendering. Configuration only affects the stages
/// after parsing.
///
/// # Examples
///
/// ```rust
/// use emlang::{DocumentBuilder, config::AppConfig};
///
/// let source = "slices:\n  register:\n    - c: RegisterUser\n    - e: UserRegistered\n";
///
/// let builder = DocumentBuilder::new(AppConfig::default());
///
/// // Parse source to the document model
/// let document = builder.parse(source).expect("Failed to parse");
/// assert_eq!(document.slices().len(), 1);
///
/// // Render the document to HTML
/// let html = builder.render_html(&document);
/// assert!(html.contains("RegisterUser"));
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    config: AppConfig,
}

impl DocumentBuilder {
    /// Create a new document builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration for linting, formatting and diagrams
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// The configuration this builder was created with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse source text into a document.
    ///
    /// Every YAML document in the source becomes one sub-document; the
    /// document also exposes the merged slices of all of them.
    ///
    /// # Errors
    ///
    /// Returns `EmlangError::Parse` with the source attached for YAML
    /// syntax errors and schema violations.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use emlang::DocumentBuilder;
    ///
    /// let builder = DocumentBuilder::default();
    /// assert!(builder.parse("slices:\n  a:\n    - c: Do\n").is_ok());
    /// assert!(builder.parse("slices: [").is_err());
    /// ```
    pub fn parse(&self, source: &str) -> Result<Document, EmlangError> {
        info!(bytes = source.len(); "Parsing document");

        let document = emlang_parser::parse(source)
            .map_err(|err| EmlangError::new_parse_error(err, source))?;

        debug!(
            sub_docs = document.sub_docs().len(),
            slices = document.slices().len();
            "Document parsed successfully"
        );
        trace!(document:?; "Parsed document");

        Ok(document)
    }

    /// Compute the grid layout of every sub-document, in order.
    pub fn layout<'a>(&self, document: &'a Document) -> Vec<LayoutGeometry<'a>> {
        document
            .sub_docs()
            .iter()
            .map(layout::compute_layout)
            .collect()
    }

    /// Lint the document, suppressing the rules ignored by configuration.
    pub fn lint(&self, document: &Document) -> Vec<Issue> {
        let linter = self
            .config
            .lint()
            .ignore()
            .iter()
            .fold(Linter::new(), |linter, rule| linter.ignore(rule.as_str()));
        linter.lint(document)
    }

    /// Format the document canonically with the configured key style.
    pub fn format(&self, document: &Document) -> String {
        format::format(document, &FormatOptions::new(self.config.fmt().keys()))
    }

    /// Render the document as an HTML diagram fragment.
    ///
    /// CSS overrides from configuration are applied on top of the base rules.
    pub fn render_html(&self, document: &Document) -> String {
        let html = HtmlExporter::new()
            .with_css_overrides(self.config.diagram().css().clone())
            .export(document);
        info!(bytes = html.len(); "HTML rendered successfully");
        html
    }
}
