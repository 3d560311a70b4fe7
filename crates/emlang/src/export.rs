//! Diagram exporters.
//!
//! Exporters consume the grid layout of every sub-document and render it to
//! an output format. HTML is the only format; its output is a self-contained
//! fragment that can be embedded in a page.

mod html;

pub use html::HtmlExporter;
