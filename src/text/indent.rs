//! Indentation model.
//!
//! A document declares its indentation unit once (a tab, or N spaces); lines
//! report their indent level by counting whole units at the start of the
//! line.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LEADING_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\t ]*").expect("static regex"));

/// The indentation unit for a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indentation {
    /// One level of indentation, e.g. `"\t"` or `"    "`.
    pub string: String,
    /// Display columns per level.
    pub cols_per_indent: usize,
    #[serde(skip, default = "default_re")]
    re: Regex,
}

fn default_re() -> Regex {
    LEADING_WHITESPACE.clone()
}

impl Indentation {
    pub fn new(string: impl Into<String>, cols_per_indent: usize) -> Self {
        Self {
            string: string.into(),
            cols_per_indent,
            re: LEADING_WHITESPACE.clone(),
        }
    }

    /// Tab indentation displayed at `tab_width` columns.
    pub fn tabs(tab_width: usize) -> Self {
        Self::new("\t", tab_width)
    }

    /// Space indentation, `count` spaces per level.
    pub fn spaces(count: usize) -> Self {
        Self::new(" ".repeat(count), count)
    }

    /// Measure the indent at the start of `string`.
    pub fn measure(&self, string: &str) -> IndentLevel {
        let indent_str = self
            .re
            .find(string)
            .map(|m| m.as_str())
            .unwrap_or("");

        let level = indent_str.chars().count() / self.string.chars().count().max(1);

        IndentLevel {
            level,
            cols: level * self.cols_per_indent,
            offset: indent_str.chars().count(),
        }
    }
}

impl PartialEq for Indentation {
    fn eq(&self, other: &Self) -> bool {
        self.string == other.string && self.cols_per_indent == other.cols_per_indent
    }
}

/// The measured indent of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndentLevel {
    /// Whole indentation units.
    pub level: usize,
    /// Display columns the indent occupies.
    pub cols: usize,
    /// Char offset of the first non-indent character.
    pub offset: usize,
}

/// Expand tabs to spaces for display-width calculations. Tab width is
/// variable: each tab advances to the next multiple of `tab_width`.
pub fn expand_tabs(string: &str, tab_width: usize) -> String {
    let mut out = String::with_capacity(string.len());
    let mut col = 0;

    for ch in string.chars() {
        if ch == '\t' {
            let width = tab_width - col % tab_width;

            for _ in 0..width {
                out.push(' ');
            }

            col += width;
        } else {
            out.push(ch);
            col += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_tabs() {
        let indentation = Indentation::tabs(4);

        let indent = indentation.measure("\t\tfoo");

        assert_eq!(indent.level, 2);
        assert_eq!(indent.cols, 8);
        assert_eq!(indent.offset, 2);
    }

    #[test]
    fn test_measure_spaces() {
        let indentation = Indentation::spaces(4);

        let indent = indentation.measure("        x = 1");

        assert_eq!(indent.level, 2);
        assert_eq!(indent.cols, 8);
        assert_eq!(indent.offset, 8);
    }

    #[test]
    fn test_measure_no_indent() {
        let indentation = Indentation::tabs(4);

        assert_eq!(indentation.measure("foo").level, 0);
        assert_eq!(indentation.measure("").level, 0);
    }

    #[test]
    fn test_expand_tabs_variable_width() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("ab\tx", 4), "ab  x");
        assert_eq!(expand_tabs("abcd\tx", 4), "abcd    x");
    }
}
