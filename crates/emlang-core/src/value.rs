//! Free-form property values attached to elements.

use std::fmt;

/// A decoded property value.
///
/// Mirrors the generic scalar and composite kinds of the source tree.
/// Mappings keep their entries in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<PropValue>),
    Mapping(Vec<PropEntry>),
}

impl PropValue {
    /// Returns the string if this value is a [`PropValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    /// Human-readable rendering used by summaries and exported diagrams.
    ///
    /// Composite values use a compact flow notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("null"),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Integer(i) => write!(f, "{i}"),
            PropValue::Float(x) => write!(f, "{x}"),
            PropValue::String(s) => f.write_str(s),
            PropValue::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            PropValue::Mapping(entries) => {
                f.write_str("{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", entry.key(), entry.value())?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A single key/value property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropEntry {
    key: String,
    value: PropValue,
}

impl PropEntry {
    pub fn new(key: impl Into<String>, value: PropValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &PropValue {
        &self.value
    }
}
