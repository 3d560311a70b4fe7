//! HTML grid diagrams.
//!
//! The output is a `<style>` block followed by one
//! `<div class="emlang-documents">` wrapper holding a grid per sub-document.
//! Each row of a document is a grid with the document's column template;
//! the `n`th child of a row is placed on the columns of the `n`th slice
//! (after the lane label cell, when the document has swimlanes).

use std::{collections::BTreeMap, fmt};

use log::{debug, info, warn};

use emlang_core::{Document, Element, PropEntry, Test};

use crate::layout::{self, DocumentLayout, LayoutGeometry, Row, RowKind};

/// Rules shared by every document. Colors are custom properties so they
/// can be overridden from configuration.
const BASE_CSS: &str = "\
.emlang-documents {
  --trigger-color: #e9ecef;
  --command-color: #cfe2ff;
  --event-color: #ffe5b4;
  --exception-color: #f8d7da;
  --view-color: #d1e7dd;
  --border-color: #adb5bd;
  display: flex;
  flex-direction: column;
  gap: 2rem;
  font-family: system-ui, sans-serif;
  font-size: 14px;
}
.emlang-document {
  display: flex;
  flex-direction: column;
  gap: 0.5rem;
}
.emlang-row {
  display: grid;
  column-gap: 0.5rem;
}
.emlang-row + .emlang-row {
  border-top: 1px dashed var(--border-color);
  padding-top: 0.5rem;
}
.emlang-slice {
  display: grid;
  grid-auto-columns: minmax(8rem, auto);
  column-gap: 0.5rem;
  align-items: start;
}
.emlang-slicename {
  font-weight: bold;
}
.emlang-swimlane {
  font-style: italic;
}
.emlang-trigger, .emlang-command, .emlang-event, .emlang-exception, .emlang-view {
  border-radius: 4px;
  padding: 0.5rem;
}
.emlang-trigger { background: var(--trigger-color); }
.emlang-command { background: var(--command-color); }
.emlang-event { background: var(--event-color); }
.emlang-exception { background: var(--exception-color); }
.emlang-view { background: var(--view-color); }
.emlang-props {
  margin: 0.25rem 0 0;
  font-size: 12px;
}
.emlang-props dt {
  font-weight: bold;
}
.emlang-props dd {
  margin: 0 0 0 0.5rem;
}
.emlang-test {
  border: 1px solid var(--border-color);
  border-radius: 4px;
  padding: 0.5rem;
  margin-bottom: 0.5rem;
}
.emlang-testname {
  font-weight: bold;
}
.emlang-test-label {
  font-size: 11px;
  font-weight: bold;
}
";

/// Characters that could close a declaration, its rule or the `<style>`
/// element.
const CSS_FORBIDDEN: [char; 5] = ['<', '>', ';', '{', '}'];

/// Renders documents as HTML grid diagrams.
#[derive(Debug, Clone, Default)]
pub struct HtmlExporter {
    css_overrides: BTreeMap<String, String>,
}

impl HtmlExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set CSS custom property overrides, such as `--trigger-color`.
    ///
    /// Overrides are emitted in key order after the base rules. Overrides
    /// whose name or value contains `<`, `>`, `;`, `{` or `}` are dropped.
    pub fn with_css_overrides(mut self, css_overrides: BTreeMap<String, String>) -> Self {
        self.css_overrides = css_overrides
            .into_iter()
            .filter(|(key, value)| {
                let safe = is_safe_declaration(key, value);
                if !safe {
                    warn!(property = key.as_str(); "Ignoring CSS override with markup characters");
                }
                safe
            })
            .collect();
        self
    }

    /// Render a document.
    ///
    /// A document without sub-documents renders as the empty string.
    pub fn export(&self, document: &Document) -> String {
        if document.is_empty() {
            debug!("Document is empty, nothing to export");
            return String::new();
        }

        let layouts = layout::layout_document(document);
        info!(documents = layouts.len(); "Exporting HTML diagram");

        Diagram {
            css_overrides: &self.css_overrides,
            layouts: &layouts,
        }
        .to_string()
    }
}

fn is_safe_declaration(key: &str, value: &str) -> bool {
    !key.trim().is_empty()
        && !key.contains(&CSS_FORBIDDEN[..])
        && !value.contains(&CSS_FORBIDDEN[..])
}

/// The full HTML fragment.
struct Diagram<'a> {
    css_overrides: &'a BTreeMap<String, String>,
    layouts: &'a [DocumentLayout<'a>],
}

impl fmt::Display for Diagram<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<style>")?;
        f.write_str(BASE_CSS)?;
        if !self.css_overrides.is_empty() {
            writeln!(f, ".emlang-documents {{")?;
            for (key, value) in self.css_overrides {
                writeln!(f, "  {key}: {value};")?;
            }
            writeln!(f, "}}")?;
        }
        for layout in self.layouts {
            write_grid_rules(f, layout)?;
        }
        writeln!(f, "</style>")?;

        writeln!(f, "<div class=\"emlang-documents\">")?;
        for layout in self.layouts {
            write_document(f, layout)?;
        }
        writeln!(f, "</div>")
    }
}

fn write_grid_rules(f: &mut fmt::Formatter<'_>, layout: &DocumentLayout<'_>) -> fmt::Result {
    let id = layout.id();
    let geometry = layout.geometry();

    writeln!(
        f,
        "#{id} .emlang-row {{ grid-template-columns: repeat({}, auto); }}",
        geometry.total_columns()
    )?;

    let mut child = 1;
    if geometry.has_swimlanes() {
        writeln!(
            f,
            "#{id} .emlang-row > :nth-child(1) {{ grid-column: 1 / span 1; }}"
        )?;
        child += 1;
    }
    for column in geometry.slice_columns() {
        writeln!(
            f,
            "#{id} .emlang-row > :nth-child({child}) {{ grid-column: {} / span {}; \
             grid-template-columns: repeat({}, 1fr); }}",
            column.start(),
            column.span(),
            column.span()
        )?;
        child += 1;
    }
    Ok(())
}

fn write_document(f: &mut fmt::Formatter<'_>, layout: &DocumentLayout<'_>) -> fmt::Result {
    let geometry = layout.geometry();
    writeln!(f, "<div class=\"emlang-document\" id=\"{}\">", layout.id())?;

    writeln!(f, "<div class=\"emlang-row emlang-row-slices\">")?;
    if geometry.has_swimlanes() {
        writeln!(f, "<div class=\"emlang-cell\"></div>")?;
    }
    for column in geometry.slice_columns() {
        let name = match column.name() {
            "" => "(anonymous)",
            name => name,
        };
        writeln!(
            f,
            "<div class=\"emlang-cell\"><span class=\"emlang-slicename\">{}</span></div>",
            Escaped(name)
        )?;
    }
    writeln!(f, "</div>")?;

    for row in geometry.rows() {
        write_row(f, geometry, row)?;
    }

    writeln!(f, "</div>")
}

fn write_row(f: &mut fmt::Formatter<'_>, geometry: &LayoutGeometry<'_>, row: &Row<'_>) -> fmt::Result {
    let class = match row.kind() {
        RowKind::Trigger(_) => "emlang-row-triggers",
        RowKind::Main => "emlang-row-main",
        RowKind::Event(_) => "emlang-row-events",
        RowKind::Tests => "emlang-row-tests",
    };
    writeln!(f, "<div class=\"emlang-row {class}\">")?;

    if geometry.has_swimlanes() {
        match row.kind().swimlane() {
            Some(lane) => writeln!(
                f,
                "<div class=\"emlang-cell\"><span class=\"emlang-swimlane\">{}</span></div>",
                Escaped(lane)
            )?,
            None => writeln!(f, "<div class=\"emlang-cell\"></div>")?,
        }
    }

    for row_slice in row.slices() {
        writeln!(f, "<div class=\"emlang-slice\">")?;
        if row.kind() == RowKind::Tests {
            for test in row_slice.slice().tests().values() {
                write_test(f, test)?;
            }
        } else {
            for placed in row_slice.elements() {
                write_element(f, placed.element(), Some(placed.column()))?;
            }
        }
        writeln!(f, "</div>")?;
    }

    writeln!(f, "</div>")
}

fn write_element(f: &mut fmt::Formatter<'_>, element: &Element, column: Option<usize>) -> fmt::Result {
    write!(f, "<div class=\"emlang-{}\"", element.element_type())?;
    if let Some(column) = column {
        write!(f, " style=\"grid-column: {column}\"")?;
    }
    write!(
        f,
        "><span class=\"emlang-name\">{}</span>",
        Escaped(element.name())
    )?;
    write_props(f, element.props())?;
    writeln!(f, "</div>")
}

fn write_props(f: &mut fmt::Formatter<'_>, props: &[PropEntry]) -> fmt::Result {
    if props.is_empty() {
        return Ok(());
    }
    write!(f, "<dl class=\"emlang-props\">")?;
    for entry in props {
        write!(
            f,
            "<dt>{}</dt><dd>{}</dd>",
            Escaped(entry.key()),
            Escaped(&entry.value().to_string())
        )?;
    }
    write!(f, "</dl>")
}

fn write_test(f: &mut fmt::Formatter<'_>, test: &Test) -> fmt::Result {
    writeln!(f, "<div class=\"emlang-test\">")?;
    writeln!(
        f,
        "<span class=\"emlang-testname\">{}</span>",
        Escaped(test.name())
    )?;

    let sections = [
        ("GIVEN", test.has_given(), test.given()),
        ("WHEN", test.has_when(), test.when()),
        ("THEN", test.has_then(), test.then()),
    ];
    for (label, present, elements) in sections {
        if !present {
            continue;
        }
        writeln!(f, "<div class=\"emlang-test-section\">")?;
        writeln!(f, "<span class=\"emlang-test-label\">{label}</span>")?;
        for element in elements {
            write_element(f, element, None)?;
        }
        writeln!(f, "</div>")?;
    }

    writeln!(f, "</div>")
}

/// HTML-escapes text on display.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&#39;")?,
                c => write!(f, "{c}")?,
            }
        }
        Ok(())
    }
}
