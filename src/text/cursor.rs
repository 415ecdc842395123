//! Text positions.
//!
//! A [`Cursor`] is a `(line_index, offset)` pair. Offsets count `char`s from
//! the start of the line; `offset == line.len()` is the position after the
//! last character.

use serde::{Deserialize, Serialize};

/// A position in the document as (line index, char offset within the line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub line_index: usize,
    pub offset: usize,
}

impl Cursor {
    pub fn new(line_index: usize, offset: usize) -> Self {
        Self { line_index, offset }
    }

    /// Start of a line.
    pub fn line_start(line_index: usize) -> Self {
        Self {
            line_index,
            offset: 0,
        }
    }

    /// The (0, 0) position.
    pub fn zero() -> Self {
        Self {
            line_index: 0,
            offset: 0,
        }
    }

    /// Strictly before `other` in document order.
    pub fn is_before(&self, other: &Cursor) -> bool {
        self < other
    }
}

/// Shorthand constructor, mirroring the `c(line, offset)` helper used
/// throughout the codebase.
pub fn c(line_index: usize, offset: usize) -> Cursor {
    Cursor::new(line_index, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_ordering() {
        let a = c(0, 5);
        let b = c(0, 10);
        let d = c(1, 0);

        assert!(a < b);
        assert!(b < d);
        assert!(a.is_before(&d));
        assert!(!d.is_before(&a));
    }

    #[test]
    fn test_cursor_equality() {
        assert_eq!(c(2, 3), Cursor::new(2, 3));
        assert_ne!(c(2, 3), c(3, 2));
    }
}
