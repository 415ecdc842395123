//! Derived per-line metadata.
//!
//! A [`Line`] is a snapshot rebuilt from scratch on every parse: raw text,
//! indent measurements, display-width decomposition, plus the decorations
//! (syntax nodes, render hints, opener/closer markers) that the language
//! ranges attach afterwards. Lines are never patched incrementally.

use serde::{Deserialize, Serialize};

use super::FileDetails;
use crate::syntax::lang::RenderHint;
use crate::text::indent::expand_tabs;
use crate::text::selection::Selection;

/// One segment of a line's variable-width decomposition: either a literal
/// run or a tab stop whose width depends on the column it starts at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinePart {
    Str(String),
    Tab(usize),
}

/// An opener or closer marker for a multi-line construct, attached to the
/// line where the construct opens or closes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub lang_code: String,
    pub kind: String,
}

/// A syntax node attached to the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttachment {
    pub lang_code: String,
    pub kind: String,
    pub range: Selection,
}

/// One line of the document plus everything derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub string: String,
    /// Left-trimmed view of `string`.
    pub trimmed: String,
    /// Char index of the line start within the document.
    pub start_index: usize,
    /// Display width with tabs expanded.
    pub width: usize,
    pub indent_level: usize,
    pub indent_cols: usize,
    pub variable_width_parts: Vec<LinePart>,
    pub render_hints: Vec<RenderHint>,
    pub openers: Vec<Boundary>,
    pub closers: Vec<Boundary>,
    pub nodes: Vec<NodeAttachment>,
}

impl Line {
    pub fn new(string: String, file_details: &FileDetails, start_index: usize) -> Self {
        let indent = file_details.indentation.measure(&string);
        let tab_width = file_details.tab_width;
        let width = expand_tabs(&string, tab_width).chars().count();

        // decompose into literal runs and column-dependent tab stops
        let mut variable_width_parts = Vec::new();
        let parts: Vec<&str> = string.split('\t').collect();

        for (i, part) in parts.iter().enumerate() {
            variable_width_parts.push(LinePart::Str((*part).to_string()));

            if i < parts.len() - 1 {
                variable_width_parts
                    .push(LinePart::Tab(tab_width - part.chars().count() % tab_width));
            }
        }

        Self {
            trimmed: string.trim_start().to_string(),
            string,
            start_index,
            width,
            indent_level: indent.level,
            indent_cols: indent.cols,
            variable_width_parts,
            render_hints: Vec::new(),
            openers: Vec::new(),
            closers: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// True if the line contains nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.trimmed.is_empty()
    }

    /// Char length of the raw string.
    pub fn len(&self) -> usize {
        self.string.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.string.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::indent::Indentation;

    fn file_details() -> FileDetails {
        FileDetails::new("script", "\n", Indentation::tabs(4), 4)
    }

    #[test]
    fn test_line_derivation() {
        let line = Line::new("\t\tlet x = 1;".to_string(), &file_details(), 10);

        assert_eq!(line.indent_level, 2);
        assert_eq!(line.indent_cols, 8);
        assert_eq!(line.trimmed, "let x = 1;");
        assert_eq!(line.start_index, 10);
        assert_eq!(line.width, 8 + "let x = 1;".len());
    }

    #[test]
    fn test_variable_width_parts() {
        let line = Line::new("ab\tc".to_string(), &file_details(), 0);

        assert_eq!(
            line.variable_width_parts,
            vec![
                LinePart::Str("ab".to_string()),
                LinePart::Tab(2),
                LinePart::Str("c".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_lines() {
        assert!(Line::new("".to_string(), &file_details(), 0).is_blank());
        assert!(Line::new("\t  ".to_string(), &file_details(), 0).is_blank());
        assert!(!Line::new("x".to_string(), &file_details(), 0).is_blank());
    }
}
