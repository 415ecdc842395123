//! Structural (AST) selections.
//!
//! An [`AstSelection`] is a half-open line range `[start_line_index,
//! end_line_index)` covering one or more complete sibling structural
//! elements — never a partial statement. A zero-width range denotes an
//! insertion point between elements.

use serde::{Deserialize, Serialize};

use crate::document::line::Line;

/// A half-open range of whole lines denoting complete structural elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstSelection {
    pub start_line_index: usize,
    pub end_line_index: usize,
}

/// Shorthand constructor.
pub fn a(start_line_index: usize, end_line_index: usize) -> AstSelection {
    AstSelection::new(start_line_index, end_line_index)
}

impl AstSelection {
    pub fn new(start_line_index: usize, end_line_index: usize) -> Self {
        Self {
            start_line_index,
            end_line_index,
        }
    }

    /// A zero-width insertion point before `line_index`.
    pub fn insertion_point(line_index: usize) -> Self {
        Self::new(line_index, line_index)
    }

    /// True if the selection covers at least one line.
    pub fn is_full(&self) -> bool {
        self.end_line_index > self.start_line_index
    }

    pub fn is_multiline(&self) -> bool {
        self.end_line_index > self.start_line_index + 1
    }

    pub fn line_count(&self) -> usize {
        self.end_line_index - self.start_line_index
    }

    pub fn equals(&self, other: &AstSelection) -> bool {
        self == other
    }

    /// True if `line_index` falls inside the selection.
    pub fn contains_line(&self, line_index: usize) -> bool {
        line_index >= self.start_line_index && line_index < self.end_line_index
    }

    /// True if `self` lies within `other` (boundaries may touch).
    pub fn is_within(&self, other: &AstSelection) -> bool {
        self.start_line_index >= other.start_line_index
            && self.end_line_index <= other.end_line_index
    }

    /// True iff the two selections differ only by an intervening blank-line
    /// gap with no other structural content between them.
    pub fn is_adjacent(&self, other: &AstSelection, lines: &[Line]) -> bool {
        let (first, second) = if self.start_line_index <= other.start_line_index {
            (self, other)
        } else {
            (other, self)
        };

        if second.start_line_index < first.end_line_index {
            return false;
        }

        lines[first.end_line_index..second.start_line_index]
            .iter()
            .all(|line| line.is_blank())
    }

    /// Re-validate against the current document, e.g. after lines were
    /// deleted. Clamps to the line count; a range that collapses becomes an
    /// insertion point.
    pub fn trim(&self, lines: &[Line]) -> AstSelection {
        let start = self.start_line_index.min(lines.len());
        let end = self.end_line_index.min(lines.len());

        AstSelection::new(start, end.max(start))
    }
}

/// One line of a drag payload: indent level relative to the selection's
/// shallowest line, plus the trimmed text. Storing indentation relative to
/// the origin lets a moved block be re-indented at an arbitrary destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionLine {
    pub indent_level_delta: usize,
    pub string: String,
}

/// Convert document lines to the indent-relative payload form.
pub fn lines_to_selection_lines(lines: &[Line]) -> Vec<SelectionLine> {
    let base = lines
        .iter()
        .filter(|line| !line.is_blank())
        .map(|line| line.indent_level)
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| SelectionLine {
            indent_level_delta: line.indent_level.saturating_sub(base),
            string: line.trimmed.clone(),
        })
        .collect()
}

/// Convert payload lines back to absolute strings indented at
/// `indent_level`. Blank payload lines stay empty.
pub fn selection_lines_to_strings(
    selection_lines: &[SelectionLine],
    indent_str: &str,
    indent_level: usize,
) -> Vec<String> {
    selection_lines
        .iter()
        .map(|line| {
            if line.string.is_empty() {
                String::new()
            } else {
                format!(
                    "{}{}",
                    indent_str.repeat(indent_level + line.indent_level_delta),
                    line.string
                )
            }
        })
        .collect()
}

/// Compute the insertion range for a pointer position between the lines at
/// `above_line_index` and `below_line_index`. If the pointer falls inside a
/// blank-line gap, the range covers the whole gap; otherwise it is a
/// zero-width point at the boundary. At the top of the document both indexes
/// are 0.
pub fn insertion_range(
    lines: &[Line],
    above_line_index: usize,
    below_line_index: usize,
) -> AstSelection {
    let mut start = below_line_index.max(above_line_index).min(lines.len());
    let mut end = start;

    while start > 0 && lines[start - 1].is_blank() {
        start -= 1;
    }

    while end < lines.len() && lines[end].is_blank() {
        end += 1;
    }

    AstSelection::new(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileDetails;
    use crate::text::indent::Indentation;

    fn make_lines(strings: &[&str]) -> Vec<Line> {
        let file_details = FileDetails::new("script", "\n", Indentation::tabs(4), 4);

        strings
            .iter()
            .map(|string| Line::new((*string).to_string(), &file_details, 0))
            .collect()
    }

    #[test]
    fn test_predicates() {
        let sel = a(1, 3);

        assert!(sel.is_full());
        assert!(sel.is_multiline());
        assert!(sel.contains_line(1));
        assert!(sel.contains_line(2));
        assert!(!sel.contains_line(3));

        assert!(!AstSelection::insertion_point(2).is_full());
        assert!(a(1, 3).is_within(&a(0, 4)));
        assert!(!a(1, 5).is_within(&a(0, 4)));
    }

    #[test]
    fn test_is_adjacent() {
        let lines = make_lines(&["a();", "", "b();", "c();"]);

        // separated only by a blank line
        assert!(a(0, 1).is_adjacent(&a(2, 3), &lines));

        // directly touching
        assert!(a(2, 3).is_adjacent(&a(3, 4), &lines));

        // content in between
        assert!(!a(0, 1).is_adjacent(&a(3, 4), &lines));

        // overlapping is not adjacent
        assert!(!a(0, 3).is_adjacent(&a(2, 4), &lines));
    }

    #[test]
    fn test_trim_after_deletion() {
        let lines = make_lines(&["a();", "b();"]);

        assert_eq!(a(1, 5).trim(&lines), a(1, 2));
        assert_eq!(a(4, 6).trim(&lines), a(2, 2));
    }

    #[test]
    fn test_selection_line_round_trip() {
        let lines = make_lines(&["\tif (x) {", "\t\ty();", "\t}"]);
        let selection_lines = lines_to_selection_lines(&lines);

        assert_eq!(
            selection_lines,
            vec![
                SelectionLine {
                    indent_level_delta: 0,
                    string: "if (x) {".to_string()
                },
                SelectionLine {
                    indent_level_delta: 1,
                    string: "y();".to_string()
                },
                SelectionLine {
                    indent_level_delta: 0,
                    string: "}".to_string()
                },
            ]
        );

        // re-indent two levels deeper than the origin
        let strings = selection_lines_to_strings(&selection_lines, "\t", 3);

        assert_eq!(strings, vec!["\t\t\tif (x) {", "\t\t\t\ty();", "\t\t\t}"]);
    }

    #[test]
    fn test_insertion_range_between_elements() {
        let lines = make_lines(&["a();", "b();"]);

        assert_eq!(insertion_range(&lines, 0, 1), a(1, 1));
    }

    #[test]
    fn test_insertion_range_in_blank_gap() {
        let lines = make_lines(&["a();", "", "", "b();"]);

        assert_eq!(insertion_range(&lines, 0, 1), a(1, 3));
        assert_eq!(insertion_range(&lines, 1, 2), a(1, 3));
    }
}
