//! The shared structural drag-and-drop edit engine.
//!
//! [`drop_generic`] turns a drop gesture into a list of text edits. It never
//! applies anything itself; callers feed the resulting edits through the
//! document's history so the whole drop is one undo step.

use log::debug;

use crate::ast::common::{
    create_spaces, find_indent_level, find_sibling_index, remove_ast_selection, Dir,
};
use crate::ast::selection::{a, selection_lines_to_strings, AstSelection, SelectionLine};
use crate::document::line::Line;
use crate::document::{Document, Edit};

/// A pending edit containing a `[[%tabstop:]]` placeholder that the frontend
/// should expand into an editable snippet session instead of applying
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetEdit {
    pub insert_index: usize,
    pub remove_line_count: usize,
    pub insert_lines: Vec<String>,
}

/// The outcome of a drop: edits to apply, the structural selection to show
/// afterwards, and optionally a snippet edit to run instead of a plain
/// insertion.
#[derive(Debug, Default)]
pub struct DropResult {
    pub edits: Vec<Edit>,
    pub new_selection: Option<AstSelection>,
    pub snippet_edit: Option<SnippetEdit>,
}

/// A named drop target: a language-specific composite edit offered when the
/// payload is dropped onto a particular element, e.g. wrapping an `if` block's
/// footer to append an `else` branch.
pub trait DropTarget: Send + Sync {
    /// Stable identifier used in drag payloads and target lookup.
    fn key(&self) -> &'static str;

    /// Human-readable label shown on the target hilite.
    fn label(&self) -> &'static str;

    /// Whether this target applies to the hovered element.
    fn is_available(&self, lines: &[Line], selection: &AstSelection) -> bool;

    fn handle_drop(
        &self,
        document: &Document,
        from_selection: Option<AstSelection>,
        to_selection: AstSelection,
        selection_lines: &[SelectionLine],
        is_move: bool,
        option: Option<&str>,
    ) -> DropResult;
}

/// Compute the edits for a structural drop, in priority order:
///
/// 1. a named target handles the drop itself;
/// 2. a drop next to an adjacent sibling is a pure whitespace resize;
/// 3. otherwise remove the source (for moves), re-indent the payload to the
///    destination and insert it.
///
/// When the destination sits below a removed source, indices computed before
/// the removal are corrected by the removal's line-count delta.
pub fn drop_generic(
    document: &Document,
    from_selection: Option<AstSelection>,
    to_selection: Option<AstSelection>,
    selection_lines: &[SelectionLine],
    is_move: bool,
    option: Option<&str>,
    target: Option<&'static dyn DropTarget>,
) -> DropResult {
    if let (Some(target), Some(to_selection)) = (target, to_selection) {
        debug!("drop via named target {:?}", target.key());

        return target.handle_drop(
            document,
            from_selection,
            to_selection,
            selection_lines,
            is_move,
            option,
        );
    }

    let lines = &document.lines;
    let indent_str = document.file_details.indentation.string.clone();

    if let (Some(from), Some(to)) = (from_selection, to_selection) {
        if from.is_adjacent(&to, lines) {
            return resize_sibling_gap(document, &from, &to, &indent_str);
        }
    }

    let mut edits = Vec::new();
    let mut new_selection = None;
    let mut remove_diff = 0;

    if is_move {
        if let Some(from) = &from_selection {
            let removed = remove_ast_selection(document, from);

            if let Some(to) = &to_selection {
                if from.end_line_index < to.end_line_index {
                    remove_diff = removed.removed_line_count - removed.inserted_line_count;
                }
            }

            edits.push(removed.edit);
        }
    }

    if let Some(to) = to_selection {
        let insert_indent_level = find_indent_level(lines, to.start_line_index);
        let insert_lines =
            selection_lines_to_strings(selection_lines, &indent_str, insert_indent_level);

        if to.start_line_index == to.end_line_index {
            // insert between lines
            edits.push(document.line_edit(to.start_line_index, 0, &insert_lines));

            let start = to.start_line_index - remove_diff;

            new_selection = Some(a(start, start + insert_lines.len()));
        } else {
            // insert into a blank gap - insert after the gap and re-create
            // the gap below the insertion
            let mut with_spaces = insert_lines.clone();

            with_spaces.extend(create_spaces(
                to.line_count(),
                insert_indent_level,
                &indent_str,
            ));

            edits.push(document.line_edit(to.end_line_index, 0, &with_spaces));

            let start = to.end_line_index - remove_diff;

            new_selection = Some(a(start, start + insert_lines.len()));
        }
    }

    DropResult {
        edits,
        new_selection,
        snippet_edit: None,
    }
}

/// A drop between a selection and its adjacent sibling moves no content; it
/// resizes the blank gap on the far side of the selection to the width of the
/// drop range.
fn resize_sibling_gap(
    document: &Document,
    from: &AstSelection,
    to: &AstSelection,
    indent_str: &str,
) -> DropResult {
    let lines = &document.lines;
    let (from_start, from_end) = (from.start_line_index, from.end_line_index);
    let moving_down = from_start < to.start_line_index;

    let indent_level = lines[from_start].indent_level;

    let (dir, index, add_spaces_at) = if moving_down {
        (Dir::Up, from_start.checked_sub(1), from_start)
    } else {
        (Dir::Down, Some(from_end), from_end)
    };

    let sibling = index.and_then(|i| find_sibling_index(lines, i, indent_level, dir));

    let (Some(index), Some(sibling)) = (index, sibling) else {
        return DropResult::default();
    };

    let existing_spaces = index.abs_diff(sibling);
    let spaces = to.line_count().saturating_sub(existing_spaces);
    let adjust = if moving_down { spaces } else { 0 };

    DropResult {
        edits: vec![document.line_edit(
            add_spaces_at,
            0,
            &create_spaces(spaces, indent_level, indent_str),
        )],
        new_selection: Some(a(from_start + adjust, from_end + adjust)),
        snippet_edit: None,
    }
}
