//! Canonical source formatting.
//!
//! [`format`] writes a parsed [`Document`] back as Emlang YAML in one
//! canonical layout: two-space indentation, one element per line, type keys
//! in the chosen [`KeyStyle`], tests sorted by name, and strings quoted only
//! when a plain scalar would read back differently. Formatting the parse of
//! formatted output gives the same text.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

use emlang_core::{Document, Element, ElementType, PropEntry, PropValue, Slice, SubDoc, Test};

/// Characters that may not start a plain scalar.
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

/// Characters that end a plain scalar inside flow collections.
const FLOW_INDICATORS: &[char] = &[',', '[', ']', '{', '}'];

/// Which element type keys the formatter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// Single letters: `t`, `c`, `e`, `x`, `v`.
    #[default]
    Short,
    /// Full names: `trigger`, `command`, `event`, `exception`, `view`.
    Long,
}

impl KeyStyle {
    fn key(&self, element_type: ElementType) -> &'static str {
        match self {
            KeyStyle::Short => element_type.short_key(),
            KeyStyle::Long => element_type.as_str(),
        }
    }
}

impl fmt::Display for KeyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyStyle::Short => f.write_str("short"),
            KeyStyle::Long => f.write_str("long"),
        }
    }
}

/// Error returned when a string does not name a key style.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key style `{0}`, expected `short` or `long`")]
pub struct UnknownKeyStyle(pub String);

impl FromStr for KeyStyle {
    type Err = UnknownKeyStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(KeyStyle::Short),
            "long" => Ok(KeyStyle::Long),
            _ => Err(UnknownKeyStyle(s.to_string())),
        }
    }
}

/// Options for [`format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatOptions {
    key_style: KeyStyle,
}

impl FormatOptions {
    pub fn new(key_style: KeyStyle) -> Self {
        Self { key_style }
    }

    pub fn key_style(&self) -> KeyStyle {
        self.key_style
    }
}

/// Render a document in canonical form.
///
/// Sub-documents are separated by `---` lines. A document with no
/// sub-documents renders as the empty string.
pub fn format(document: &Document, options: &FormatOptions) -> String {
    let mut writer = Writer {
        out: String::new(),
        style: options.key_style,
    };
    for (index, sub_doc) in document.sub_docs().iter().enumerate() {
        if index > 0 {
            writer.out.push_str("---\n");
        }
        writer.sub_doc(sub_doc);
    }
    writer.out
}

struct Writer {
    out: String,
    style: KeyStyle,
}

impl Writer {
    fn line(&mut self, level: usize, text: &str) {
        self.indent(level);
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str("  ");
        }
    }

    fn sub_doc(&mut self, sub_doc: &SubDoc) {
        self.out.push_str("slices:\n");
        for slice in sub_doc.slices() {
            self.slice(slice);
        }
    }

    fn slice(&mut self, slice: &Slice) {
        self.line(1, &format!("{}:", scalar(slice.name())));

        if !slice.has_tests() {
            self.elements(2, slice.elements());
            return;
        }

        self.line(2, "steps:");
        self.elements(3, slice.elements());
        self.line(2, "tests:");

        let mut tests: Vec<&Test> = slice.tests().values().collect();
        tests.sort_by(|a, b| a.name().cmp(b.name()));
        for test in tests {
            self.test(test);
        }
    }

    fn test(&mut self, test: &Test) {
        self.line(3, &format!("{}:", scalar(test.name())));
        let sections = [
            ("given", test.has_given(), test.given()),
            ("when", test.has_when(), test.when()),
            ("then", test.has_then(), test.then()),
        ];
        for (key, present, elements) in sections {
            if present {
                self.line(4, &format!("{key}:"));
                self.elements(5, elements);
            }
        }
    }

    fn elements(&mut self, level: usize, elements: &[Element]) {
        for element in elements {
            self.element(level, element);
        }
    }

    fn element(&mut self, level: usize, element: &Element) {
        let name = if element.has_swimlane() || element.name().contains('/') {
            format!("{}/{}", element.swimlane(), element.name())
        } else {
            element.name().to_string()
        };
        let key = self.style.key(element.element_type());
        self.line(level, &format!("- {key}: {}", scalar(&name)));

        if !element.props().is_empty() {
            self.line(level + 1, "props:");
            for entry in element.props() {
                self.prop(level + 2, entry);
            }
        }
    }

    fn prop(&mut self, level: usize, entry: &PropEntry) {
        self.line(
            level,
            &format!("{}: {}", scalar(entry.key()), value(entry.value(), false)),
        );
    }
}

/// Render a value; composites use flow style.
fn value(value: &PropValue, in_flow: bool) -> String {
    match value {
        PropValue::Null => "null".to_string(),
        PropValue::Bool(b) => b.to_string(),
        PropValue::Integer(i) => i.to_string(),
        PropValue::Float(x) => float(*x),
        PropValue::String(s) => quote_if_needed(s, in_flow),
        PropValue::Sequence(items) => {
            let items: Vec<String> = items.iter().map(|item| self::value(item, true)).collect();
            format!("[{}]", items.join(", "))
        }
        PropValue::Mapping(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|entry| {
                    format!(
                        "{}: {}",
                        quote_if_needed(entry.key(), true),
                        self::value(entry.value(), true)
                    )
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn float(x: f64) -> String {
    if x.is_nan() {
        ".nan".to_string()
    } else if x == f64::INFINITY {
        ".inf".to_string()
    } else if x == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{x:?}")
    }
}

/// A block-context scalar: names and keys.
fn scalar(s: &str) -> String {
    quote_if_needed(s, false)
}

fn quote_if_needed(s: &str, in_flow: bool) -> String {
    if needs_quotes(s, in_flow) {
        double_quoted(s)
    } else {
        s.to_string()
    }
}

fn needs_quotes(s: &str, in_flow: bool) -> bool {
    let Some(first) = s.chars().next() else {
        return true;
    };
    INDICATORS.contains(&first)
        || first.is_whitespace()
        || s.ends_with(char::is_whitespace)
        || s.ends_with(':')
        || s.contains(": ")
        || s.contains(" #")
        || s.chars().any(char::is_control)
        || (in_flow && s.contains(FLOW_INDICATORS))
        || resolves_to_non_string(s)
}

/// Whether a plain scalar with this text would read back as null, a bool
/// or a number.
fn resolves_to_non_string(s: &str) -> bool {
    matches!(
        s,
        "~" | "null"
            | "Null"
            | "NULL"
            | "true"
            | "True"
            | "TRUE"
            | "false"
            | "False"
            | "FALSE"
            | ".inf"
            | ".Inf"
            | ".INF"
            | "+.inf"
            | "+.Inf"
            | "+.INF"
            | "-.inf"
            | "-.Inf"
            | "-.INF"
            | ".nan"
            | ".NaN"
            | ".NAN"
    ) || s.parse::<f64>().is_ok()
        || s.parse::<i64>().is_ok()
        || s.strip_prefix("0x")
            .is_some_and(|hex| i64::from_str_radix(hex, 16).is_ok())
        || s.strip_prefix("0o")
            .is_some_and(|octal| i64::from_str_radix(octal, 8).is_ok())
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
