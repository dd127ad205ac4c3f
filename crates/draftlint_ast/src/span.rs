//! Position and range types for source locations.
//!
//! Elements are located by line/column pairs as reported by the structural
//! parser, not by byte offsets: cached diagnostics are replayed onto these
//! coordinates when an element moves.

use serde::{Deserialize, Serialize};

/// A position in source text.
///
/// Lines and columns are 0-indexed, matching editor conventions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    /// Line number (0-indexed).
    pub line: u32,
    /// Column number (0-indexed).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A range between two positions, end exclusive.
///
/// The derived ordering compares the start position first and the end
/// position second, which is the positional part of document order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Range {
    /// Start position (inclusive).
    pub start: Position,
    /// End position (exclusive).
    pub end: Position,
}

impl Range {
    /// Creates a new range.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a range from raw line/column numbers.
    #[inline]
    pub const fn from_coords(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start: Position::new(start_line, start_column),
            end: Position::new(end_line, end_column),
        }
    }

    /// Returns true if the range covers no text.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns true if this range contains the given position.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Returns the number of lines this range touches.
    #[inline]
    pub const fn line_count(&self) -> u32 {
        self.end.line.saturating_sub(self.start.line) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let pos = Position::new(3, 7);
        assert_eq!(pos.line, 3);
        assert_eq!(pos.column, 7);
    }

    #[test]
    fn test_position_ordering_is_line_major() {
        assert!(Position::new(1, 40) < Position::new(2, 0));
        assert!(Position::new(2, 0) < Position::new(2, 1));
    }

    #[test]
    fn test_range_contains() {
        let range = Range::from_coords(1, 4, 1, 10);
        assert!(range.contains(Position::new(1, 4)));
        assert!(range.contains(Position::new(1, 9)));
        assert!(!range.contains(Position::new(1, 10)));
        assert!(!range.contains(Position::new(0, 5)));
    }

    #[test]
    fn test_empty_range() {
        let range = Range::from_coords(2, 3, 2, 3);
        assert!(range.is_empty());
        assert!(!range.contains(Position::new(2, 3)));
    }

    #[test]
    fn test_range_ordering_compares_start_then_end() {
        let a = Range::from_coords(1, 0, 1, 5);
        let b = Range::from_coords(1, 0, 2, 0);
        let c = Range::from_coords(1, 1, 1, 2);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(Range::from_coords(4, 0, 4, 12).line_count(), 1);
        assert_eq!(Range::from_coords(4, 0, 6, 2).line_count(), 3);
    }

    #[test]
    fn test_range_serialization() {
        let range = Range::from_coords(0, 1, 2, 3);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(
            json,
            r#"{"start":{"line":0,"column":1},"end":{"line":2,"column":3}}"#
        );
    }
}
