//! Source locations for diagnostics.

use std::fmt;

/// A 1-based line and column in the source text.
///
/// Columns count characters, not bytes. Locations order by line, then
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Location {
    line: usize,
    column: usize,
}

impl Location {
    /// Create a location from a 1-based line and column.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Convert this location into a byte offset within `source`.
    ///
    /// Out-of-range lines clamp to the end of the source and out-of-range
    /// columns clamp to the end of the line.
    pub fn byte_offset(&self, source: &str) -> usize {
        let mut offset = 0;
        for (index, line) in source.split_inclusive('\n').enumerate() {
            if index + 1 == self.line {
                let column = self.column.saturating_sub(1);
                let within = line
                    .char_indices()
                    .nth(column)
                    .map_or(line.trim_end_matches(['\r', '\n']).len(), |(i, _)| i);
                return offset + within;
            }
            offset += line.len();
        }
        source.len()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Location::new(3, 7).to_string(), "line 3, column 7");
    }

    #[test]
    fn test_byte_offset() {
        let source = "slices:\n  a:\n    - e: Foo\n";

        assert_eq!(Location::new(1, 1).byte_offset(source), 0);
        assert_eq!(Location::new(2, 3).byte_offset(source), 10);
        assert_eq!(&source[Location::new(3, 7).byte_offset(source)..][..1], "e");
    }

    #[test]
    fn test_byte_offset_multibyte_columns() {
        let source = "é: x\n";
        assert_eq!(Location::new(1, 2).byte_offset(source), 2);
    }

    #[test]
    fn test_byte_offset_clamps() {
        let source = "ab\ncd";
        assert_eq!(Location::new(1, 10).byte_offset(source), 2);
        assert_eq!(Location::new(9, 1).byte_offset(source), source.len());
    }
}
