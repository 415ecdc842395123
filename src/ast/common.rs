//! Shared structural-boundary machinery.
//!
//! Works over decorated [`Line`]s using indent levels plus opener/closer
//! markers: a *header* opens a block (`if (x) {`), a *footer* closes one
//! (`}`), and a ladder line does both (`} else {`). All brace-and-indent
//! languages share these lookups; languages with different structure
//! override [`CodeIntel::selection_from_line_index`] instead.
//!
//! [`CodeIntel::selection_from_line_index`]: crate::syntax::lang::CodeIntel::selection_from_line_index

use crate::ast::selection::AstSelection;
use crate::document::line::Line;
use crate::document::{Document, Edit};

/// Scan direction for line searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Up,
    Down,
}

impl Dir {
    fn step(self, i: usize, len: usize) -> Option<usize> {
        match self {
            Dir::Up => i.checked_sub(1),
            Dir::Down => {
                if i + 1 < len {
                    Some(i + 1)
                } else {
                    None
                }
            }
        }
    }
}

/// Index of the nearest non-blank line strictly beyond `line_index` in
/// direction `dir`.
pub fn next_non_blank(lines: &[Line], line_index: usize, dir: Dir) -> Option<usize> {
    let mut i = line_index;

    while let Some(next) = dir.step(i, lines.len()) {
        i = next;

        if !lines[i].is_blank() {
            return Some(i);
        }
    }

    None
}

/// True if the line opens a block: the next non-blank line is indented one
/// level deeper.
pub fn is_header(lines: &[Line], line_index: usize) -> bool {
    match next_non_blank(lines, line_index, Dir::Down) {
        Some(below) => lines[below].indent_level == lines[line_index].indent_level + 1,
        None => false,
    }
}

/// True if the line closes a block: the previous non-blank line is indented
/// one level deeper.
pub fn is_footer(lines: &[Line], line_index: usize) -> bool {
    match next_non_blank(lines, line_index, Dir::Up) {
        Some(above) => lines[above].indent_level == lines[line_index].indent_level + 1,
        None => false,
    }
}

/// Find the header that the footer at `footer_index` closes, following
/// ladder lines (`} else {`) up to the start of the construct.
pub fn find_header_index(lines: &[Line], footer_index: usize) -> Option<usize> {
    let level = lines[footer_index].indent_level;
    let mut i = footer_index;

    loop {
        i = next_non_blank(lines, i, Dir::Up)?;

        let line = &lines[i];

        if line.indent_level < level {
            // left the block without finding a same-level header
            return None;
        }

        if line.indent_level == level {
            if is_footer(lines, i) {
                // ladder: keep climbing to the construct's first header
                continue;
            }

            return Some(i);
        }
    }
}

/// Find the footer that the header at `header_index` opens, following
/// ladder lines down to the end of the construct.
pub fn find_footer_index(lines: &[Line], header_index: usize) -> Option<usize> {
    let level = lines[header_index].indent_level;
    let mut i = header_index;

    loop {
        i = next_non_blank(lines, i, Dir::Down)?;

        let line = &lines[i];

        if line.indent_level < level {
            return None;
        }

        if line.indent_level == level {
            if is_header(lines, i) {
                continue;
            }

            return Some(i);
        }
    }
}

/// The smallest complete structural element containing `line_index`: a plain
/// line is its own element; a header or footer expands to the whole
/// construct including ladder continuations. A blank line yields a
/// zero-width insertion point.
pub fn element_at(lines: &[Line], line_index: usize) -> AstSelection {
    if line_index >= lines.len() || lines[line_index].is_blank() {
        return AstSelection::insertion_point(line_index.min(lines.len()));
    }

    let header = is_header(lines, line_index);
    let footer = is_footer(lines, line_index);

    let start = if footer {
        find_header_index(lines, line_index).unwrap_or(line_index)
    } else {
        line_index
    };

    let end = if header {
        find_footer_index(lines, line_index).unwrap_or(line_index)
    } else {
        line_index
    };

    AstSelection::new(start, end + 1)
}

/// Expand a raw line range to the smallest enclosing set of complete sibling
/// structural elements. Expanding one boundary can pull new headers or
/// footers into range, so the expansion runs to a fixpoint.
pub fn from_line_range(lines: &[Line], start_line: usize, end_line: usize) -> AstSelection {
    debug_assert!(end_line > start_line);

    let mut start = start_line;
    let mut end = end_line;

    loop {
        let (prev_start, prev_end) = (start, end);

        for i in prev_start..prev_end.min(lines.len()) {
            let element = element_at(lines, i);

            start = start.min(element.start_line_index);
            end = end.max(element.end_line_index);
        }

        if (start, end) == (prev_start, prev_end) {
            return AstSelection::new(start, end);
        }
    }
}

/// Indent level for an element inserted immediately before `line_index`.
pub fn find_indent_level(lines: &[Line], line_index: usize) -> usize {
    if lines.is_empty() {
        return 0;
    }

    if line_index < lines.len() && !lines[line_index].is_blank() {
        let line = &lines[line_index];

        // inserting above a closing line means inserting as the block's last
        // child
        if !line.closers.is_empty() || line.trimmed.starts_with('}') {
            return line.indent_level + 1;
        }

        return line.indent_level;
    }

    match next_non_blank(lines, line_index.min(lines.len().saturating_sub(1)) + 1, Dir::Up) {
        Some(above) => {
            let line = &lines[above];

            if !line.openers.is_empty() || line.trimmed.ends_with('{') {
                line.indent_level + 1
            } else {
                line.indent_level
            }
        }
        None => 0,
    }
}

/// Nearest sibling (same indent level, no blanks skipped past content) of
/// the line at `line_index`, scanning in `dir`.
pub fn find_sibling_index(
    lines: &[Line],
    line_index: usize,
    indent_level: usize,
    dir: Dir,
) -> Option<usize> {
    if line_index >= lines.len() {
        return None;
    }

    let i = if lines[line_index].is_blank() {
        next_non_blank(lines, line_index, dir)?
    } else {
        line_index
    };

    if lines[i].indent_level == indent_level {
        Some(i)
    } else {
        None
    }
}

/// Blank spacer lines for a gap between siblings.
pub fn create_spaces(count: usize, indent_level: usize, indent_str: &str) -> Vec<String> {
    vec![indent_str.repeat(indent_level); count]
}

/// Indent every line by `levels` levels.
pub fn indent_lines(lines: &[String], indent_str: &str, levels: usize) -> Vec<String> {
    lines
        .iter()
        .map(|line| format!("{}{}", indent_str.repeat(levels), line))
        .collect()
}

/// The result of removing a structural selection: the edit plus the line
/// counts needed to correct indices computed before the removal.
#[derive(Debug, Clone)]
pub struct RemovedSelection {
    pub edit: Edit,
    pub removed_line_count: usize,
    pub inserted_line_count: usize,
}

/// Remove the lines covered by `selection`. If the removal would leave a
/// doubled blank gap (blank lines both above and below the selection), the
/// gap below is absorbed so one gap remains.
pub fn remove_ast_selection(document: &Document, selection: &AstSelection) -> RemovedSelection {
    let lines = &document.lines;
    let start = selection.start_line_index;
    let mut end = selection.end_line_index;

    let blank_above = start > 0 && lines[start - 1].is_blank();

    if blank_above {
        while end < lines.len() && lines[end].is_blank() {
            end += 1;
        }
    }

    RemovedSelection {
        edit: document.line_edit(start, end - start, &[]),
        removed_line_count: end - start,
        inserted_line_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::selection::a;
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
    fn test_header_footer_detection() {
        let lines = make_lines(&["if (a) {", "\tb();", "}"]);

        assert!(is_header(&lines, 0));
        assert!(!is_footer(&lines, 0));
        assert!(!is_header(&lines, 1));
        assert!(!is_footer(&lines, 1));
        assert!(is_footer(&lines, 2));
        assert!(!is_header(&lines, 2));
    }

    #[test]
    fn test_element_at_plain_line() {
        let lines = make_lines(&["if (a) {", "\tb();", "}"]);

        assert_eq!(element_at(&lines, 1), a(1, 2));
    }

    #[test]
    fn test_element_at_header_and_footer() {
        let lines = make_lines(&["if (a) {", "\tb();", "}", "c();"]);

        assert_eq!(element_at(&lines, 0), a(0, 3));
        assert_eq!(element_at(&lines, 2), a(0, 3));
        assert_eq!(element_at(&lines, 3), a(3, 4));
    }

    #[test]
    fn test_element_at_ladder() {
        let lines = make_lines(&[
            "if (a) {",  // 0
            "\tb();",    // 1
            "} else {",  // 2
            "\tc();",    // 3
            "}",         // 4
        ]);

        // the ladder line and both braces all resolve to the whole construct
        assert_eq!(element_at(&lines, 0), a(0, 5));
        assert_eq!(element_at(&lines, 2), a(0, 5));
        assert_eq!(element_at(&lines, 4), a(0, 5));

        // inner lines stay single statements
        assert_eq!(element_at(&lines, 1), a(1, 2));
        assert_eq!(element_at(&lines, 3), a(3, 4));
    }

    #[test]
    fn test_element_at_blank_line() {
        let lines = make_lines(&["a();", "", "b();"]);

        assert_eq!(element_at(&lines, 1), a(1, 1));
    }

    #[test]
    fn test_from_line_range_spans_elements() {
        let lines = make_lines(&["a();", "if (b) {", "\tc();", "}", "d();"]);

        assert_eq!(from_line_range(&lines, 0, 1), a(0, 1));
        assert_eq!(from_line_range(&lines, 2, 3), a(2, 3));
        assert_eq!(from_line_range(&lines, 1, 2), a(1, 4));

        // a range ending inside a block pulls the whole block in
        assert_eq!(from_line_range(&lines, 0, 3), a(0, 4));
    }

    #[test]
    fn test_find_indent_level() {
        let lines = make_lines(&["if (a) {", "\tb();", "}", "c();"]);

        // before a plain statement: that statement's level
        assert_eq!(find_indent_level(&lines, 3), 0);
        assert_eq!(find_indent_level(&lines, 1), 1);

        // before a footer: last-child position
        assert_eq!(find_indent_level(&lines, 2), 1);

        // at end of document: follows the previous line
        assert_eq!(find_indent_level(&lines, 4), 0);
    }

    #[test]
    fn test_find_sibling_index() {
        let lines = make_lines(&["a();", "", "b();", "\tnot_sibling();"]);

        assert_eq!(find_sibling_index(&lines, 1, 0, Dir::Up), Some(0));
        assert_eq!(find_sibling_index(&lines, 1, 0, Dir::Down), Some(2));
        assert_eq!(find_sibling_index(&lines, 3, 0, Dir::Down), None);
    }
}
