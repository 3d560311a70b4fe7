//! Error codes for the Emlang diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Syntax errors (malformed YAML)
//! - `E1xx` - Schema errors (node kinds, keys)
//! - `E2xx` - Semantic errors (names, element types)

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E0xx)
    // =========================================================================
    /// Malformed YAML.
    ///
    /// The source could not be read as YAML at all. The message is the one
    /// reported by the YAML scanner.
    E001,

    /// Unknown alias.
    ///
    /// An alias refers to an anchor that is not defined before it, or to a
    /// node that contains the alias itself.
    E002,

    /// Excessive aliasing.
    ///
    /// Expanding the aliases inside `props` would produce far more values
    /// than the document contains, as with nested anchors that each repeat
    /// the previous one.
    E003,

    // =========================================================================
    // Schema Errors (E1xx)
    // =========================================================================
    /// Unexpected node kind.
    ///
    /// A mapping, sequence or scalar appeared where the grammar expects a
    /// different kind of node.
    E100,

    /// Unknown key.
    ///
    /// A mapping contains a key that is not recognized at this position.
    E101,

    /// Missing required key.
    ///
    /// An extended slice has no `steps` key.
    E102,

    /// Duplicate key.
    ///
    /// The same key appears twice in one mapping.
    E103,

    /// Element missing type.
    ///
    /// An element mapping has none of the type keys (`t`, `c`, `e`, `x`, `v`
    /// or their long forms).
    E104,

    /// Multiple type keys.
    ///
    /// An element mapping has more than one type key.
    E105,

    /// Empty element list.
    ///
    /// A slice or its `steps` is an empty sequence. Use a null value for a
    /// placeholder slice instead.
    E106,

    // =========================================================================
    // Semantic Errors (E2xx)
    // =========================================================================
    /// Invalid element name.
    ///
    /// The element name is empty, ends with `/`, or has a swimlane but no
    /// name after it.
    E200,

    /// Element type not allowed.
    ///
    /// A test section contains an element type it does not accept.
    E201,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            // Schema errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            ErrorCode::E106 => "E106",
            // Semantic errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Syntax errors
            ErrorCode::E001 => "malformed yaml",
            ErrorCode::E002 => "unknown alias",
            ErrorCode::E003 => "excessive aliasing",
            // Schema errors
            ErrorCode::E100 => "unexpected node kind",
            ErrorCode::E101 => "unknown key",
            ErrorCode::E102 => "missing required key",
            ErrorCode::E103 => "duplicate key",
            ErrorCode::E104 => "element missing type",
            ErrorCode::E105 => "multiple type keys",
            ErrorCode::E106 => "empty element list",
            // Semantic errors
            ErrorCode::E200 => "invalid element name",
            ErrorCode::E201 => "element type not allowed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E100.to_string(), "E100");
        assert_eq!(ErrorCode::E200.to_string(), "E200");
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::E002.as_str(), "E002");
        assert_eq!(ErrorCode::E003.as_str(), "E003");
        assert_eq!(ErrorCode::E106.as_str(), "E106");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E001.description(), "malformed yaml");
        assert_eq!(ErrorCode::E105.description(), "multiple type keys");
        assert_eq!(ErrorCode::E201.description(), "element type not allowed");
    }
}
