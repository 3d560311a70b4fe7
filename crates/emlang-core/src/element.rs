//! Element types and the element model.
//!
//! An [`Element`] is a single modeling step: a trigger, command, event,
//! exception or view. Elements carry an optional swimlane, free-form
//! properties and the source location they were declared at.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::value::PropEntry;

/// The kind of a modeling step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Trigger,
    Command,
    Event,
    Exception,
    View,
}

/// Every source key accepted for an element type, with the type it selects.
///
/// Keys are case-sensitive.
const TYPE_KEYS: &[(&str, ElementType)] = &[
    ("t", ElementType::Trigger),
    ("trg", ElementType::Trigger),
    ("trigger", ElementType::Trigger),
    ("c", ElementType::Command),
    ("cmd", ElementType::Command),
    ("command", ElementType::Command),
    ("e", ElementType::Event),
    ("evt", ElementType::Event),
    ("event", ElementType::Event),
    ("x", ElementType::Exception),
    ("err", ElementType::Exception),
    ("exception", ElementType::Exception),
    ("v", ElementType::View),
    ("view", ElementType::View),
];

impl ElementType {
    /// All element types in declaration order.
    pub const ALL: [ElementType; 5] = [
        ElementType::Trigger,
        ElementType::Command,
        ElementType::Event,
        ElementType::Exception,
        ElementType::View,
    ];

    /// Look up the element type selected by a source key such as `c` or `evt`.
    ///
    /// Returns `None` when the key is not a type alias.
    pub fn from_key(key: &str) -> Option<Self> {
        TYPE_KEYS
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, element_type)| *element_type)
    }

    /// Returns the lowercase name of the type (e.g. `"command"`).
    ///
    /// This is also the long-form source key.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Trigger => "trigger",
            ElementType::Command => "command",
            ElementType::Event => "event",
            ElementType::Exception => "exception",
            ElementType::View => "view",
        }
    }

    /// Returns the single-letter source key (e.g. `"c"`).
    pub fn short_key(&self) -> &'static str {
        match self {
            ElementType::Trigger => "t",
            ElementType::Command => "c",
            ElementType::Event => "e",
            ElementType::Exception => "x",
            ElementType::View => "v",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name an element type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element type `{0}`")]
pub struct UnknownElementType(pub String);

impl FromStr for ElementType {
    type Err = UnknownElementType;

    /// Parses any accepted source key, short, medium or long.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| UnknownElementType(s.to_string()))
    }
}

/// A single step of a slice or test section.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    element_type: ElementType,
    name: String,
    swimlane: String,
    props: Vec<PropEntry>,
    line: usize,
    column: usize,
}

impl Element {
    /// Create an element with no swimlane, no props and no source location.
    pub fn new(element_type: ElementType, name: impl Into<String>) -> Self {
        Self {
            element_type,
            name: name.into(),
            swimlane: String::new(),
            props: Vec::new(),
            line: 0,
            column: 0,
        }
    }

    /// Set the swimlane (builder style).
    pub fn with_swimlane(mut self, swimlane: impl Into<String>) -> Self {
        self.swimlane = swimlane.into();
        self
    }

    /// Set the properties (builder style).
    pub fn with_props(mut self, props: Vec<PropEntry>) -> Self {
        self.props = props;
        self
    }

    /// Set the 1-based source location (builder style).
    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// The element name, without its swimlane prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The swimlane, or the empty string when the element has none.
    pub fn swimlane(&self) -> &str {
        &self.swimlane
    }

    /// Returns `true` if the element carries a non-empty swimlane.
    pub fn has_swimlane(&self) -> bool {
        !self.swimlane.is_empty()
    }

    /// The name as written in source, `Swimlane/Name` when a swimlane is set.
    pub fn qualified_name(&self) -> String {
        if self.swimlane.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.swimlane, self.name)
        }
    }

    /// Properties in source order.
    pub fn props(&self) -> &[PropEntry] {
        &self.props
    }

    /// 1-based source line, or 0 for programmatically built elements.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based source column, or 0 for programmatically built elements.
    pub fn column(&self) -> usize {
        self.column
    }
}
