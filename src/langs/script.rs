//! The script language: a brace-and-indent C-family grammar.
//!
//! Blocks open on lines ending `{`, close on lines starting `}`, and a
//! ladder line (`} else {`) does both. This is the language with the full
//! structural mode: element selection plus the `+ else` / `+ else if` drop
//! targets.

use once_cell::sync::Lazy;
use regex::Regex;

use super::split_lines;
use crate::ast::common::{element_at, indent_lines, remove_ast_selection};
use crate::ast::drop::{DropResult, DropTarget, SnippetEdit};
use crate::ast::selection::{a, AstSelection, SelectionLine};
use crate::document::line::Line;
use crate::document::Document;
use crate::error::ParseError;
use crate::syntax::lang::{CodeIntel, HintKind, Lang, OpenerAndCloser, RenderHint, SupportLevel};
use crate::syntax::tree::{NodeId, Tree, ERROR_KIND};
use crate::text::{c, s2, Selection};

static KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(break|case|catch|const|continue|default|do|else|finally|for|function|if|in|instanceof|let|new|of|return|switch|throw|try|typeof|var|while|yield)\b",
    )
    .expect("static regex")
});

static STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#).expect("static regex"));

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*$").expect("static regex"));

pub struct Script;

impl Lang for Script {
    fn code(&self) -> &'static str {
        "script"
    }

    fn name(&self) -> &'static str {
        "Script"
    }

    fn parse(&self, code: &str, range: &Selection) -> Result<Tree, ParseError> {
        let range = range.sort();
        let lines = split_lines(code);

        let mut tree = Tree::new("module", range);
        let root = tree.root();
        let mut stack: Vec<NodeId> = Vec::new();

        let start_row = range.start.line_index;
        let mut end_row = range.end.line_index.min(lines.len().saturating_sub(1));

        // a range ending at column 0 excludes that row
        if range.end.offset == 0 && end_row > start_row {
            end_row -= 1;
        }

        for row in start_row..=end_row {
            let line = lines[row];
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            let indent = leading_char_count(line);
            let len = line.chars().count();
            let parent = stack.last().copied().unwrap_or(root);

            if trimmed.starts_with('}') {
                let Some(block) = stack.pop() else {
                    // stray closer
                    tree.push(parent, ERROR_KIND, s2(c(row, indent), c(row, len)));
                    continue;
                };

                tree.push(block, "brace_close", s2(c(row, indent), c(row, indent + 1)));
                tree.set_range(block, s2(tree.node(block).range.start, c(row, indent + 1)));

                if trimmed.ends_with('{') && trimmed.len() > 1 {
                    // ladder: the same line opens the next block
                    let sibling_parent = stack.last().copied().unwrap_or(root);
                    let ladder =
                        tree.push(sibling_parent, "block", s2(c(row, indent), c(row, len)));

                    push_token_nodes(&mut tree, ladder, row, line);
                    tree.push(ladder, "brace_open", s2(c(row, len - 1), c(row, len)));
                    stack.push(ladder);
                }
            } else if trimmed.ends_with('{') {
                let block = tree.push(parent, "block", s2(c(row, indent), c(row, len)));

                push_token_nodes(&mut tree, block, row, line);
                tree.push(block, "brace_open", s2(c(row, len - 1), c(row, len)));
                stack.push(block);
            } else {
                let statement = tree.push(parent, "statement", s2(c(row, indent), c(row, len)));

                push_token_nodes(&mut tree, statement, row, line);
            }
        }

        // anything still open at the end of the range is malformed
        for block in stack {
            tree.set_kind(block, ERROR_KIND);
            tree.set_range(block, s2(tree.node(block).range.start, range.end));
        }

        Ok(tree)
    }

    fn generate_render_hints(&self, tree: &Tree, node: NodeId) -> Vec<RenderHint> {
        hint_for_token(tree, node, self.code())
    }

    fn get_opener_and_closer(&self, tree: &Tree, node: NodeId) -> Option<OpenerAndCloser> {
        brace_opener_and_closer(tree, node)
    }

    fn get_support_level(&self, _code: &str, path: Option<&str>) -> Option<SupportLevel> {
        match path {
            Some(path) if path.ends_with(".js") || path.ends_with(".script") => {
                Some(SupportLevel::Specific)
            }
            // fallback language for anything unrecognised
            _ => Some(SupportLevel::General),
        }
    }

    fn code_intel(&self) -> Option<&dyn CodeIntel> {
        Some(&ScriptCodeIntel)
    }
}

/// Attach keyword/string/comment token nodes for one line under `parent`.
fn push_token_nodes(tree: &mut Tree, parent: NodeId, row: usize, line: &str) {
    for (kind, regex) in [
        ("comment", &*LINE_COMMENT),
        ("string", &*STRING),
        ("keyword", &*KEYWORD),
    ] {
        for m in regex.find_iter(line) {
            let start = line[..m.start()].chars().count();
            let end = start + m.as_str().chars().count();

            tree.push(parent, kind, s2(c(row, start), c(row, end)));
        }
    }
}

fn hint_for_token(tree: &Tree, node: NodeId, lang_code: &str) -> Vec<RenderHint> {
    let node = tree.node(node);

    let kind = match node.kind.as_str() {
        "keyword" => HintKind::Keyword,
        "string" => HintKind::String_,
        "comment" => HintKind::Comment,
        _ => return Vec::new(),
    };

    vec![RenderHint {
        kind,
        offset: node.start().offset,
        lang_code: lang_code.to_string(),
    }]
}

/// Opener/closer pair for a brace block: its `brace_open`/`brace_close`
/// children.
fn brace_opener_and_closer(tree: &Tree, node: NodeId) -> Option<OpenerAndCloser> {
    let children = &tree.node(node).children;

    let opener = children
        .iter()
        .copied()
        .find(|&id| tree.node(id).kind == "brace_open")?;

    let closer = children
        .iter()
        .rev()
        .copied()
        .find(|&id| tree.node(id).kind == "brace_close")?;

    Some(OpenerAndCloser { opener, closer })
}

fn leading_char_count(line: &str) -> usize {
    line.chars().count() - line.trim_start().chars().count()
}

pub struct ScriptCodeIntel;

impl CodeIntel for ScriptCodeIntel {
    fn selection_from_line_index(&self, lines: &[Line], line_index: usize) -> AstSelection {
        element_at(lines, line_index)
    }

    fn drop_targets(&self) -> &[&'static dyn DropTarget] {
        &DROP_TARGETS
    }
}

static ADD_SELECTION_TO_NEW_ELSE: AddSelectionToNewElse = AddSelectionToNewElse;
static ADD_SELECTION_TO_NEW_ELSE_IF: AddSelectionToNewElseIf = AddSelectionToNewElseIf;

static DROP_TARGETS: [&dyn DropTarget; 2] =
    [&ADD_SELECTION_TO_NEW_ELSE, &ADD_SELECTION_TO_NEW_ELSE_IF];

/// True if the hovered element is an `if`-style construct whose footer is a
/// bare `}`, i.e. one that can grow an `else` branch.
fn accepts_else_branch(lines: &[Line], selection: &AstSelection) -> bool {
    if !selection.is_multiline() || selection.end_line_index > lines.len() {
        return false;
    }

    let header = &lines[selection.start_line_index];
    let footer = &lines[selection.end_line_index - 1];

    header.trimmed.starts_with("if") && footer.trimmed == "}"
}

/// Rewrite the target block's footer so the payload lands in a new `else`
/// branch: the bare `}` becomes `} else {`, the payload follows one level
/// deeper, and a new `}` closes the construct.
fn drop_into_new_branch(
    document: &Document,
    from_selection: Option<AstSelection>,
    to_selection: AstSelection,
    selection_lines: &[SelectionLine],
    is_move: bool,
    branch_header: &str,
) -> (Vec<crate::document::Edit>, usize, Vec<String>, usize) {
    let indent_str = document.file_details.indentation.string.clone();
    let mut edits = Vec::new();
    let mut remove_diff = 0;

    if is_move {
        if let Some(from) = &from_selection {
            let removed = remove_ast_selection(document, from);

            if from.end_line_index < to_selection.end_line_index {
                remove_diff = removed.removed_line_count - removed.inserted_line_count;
            }

            edits.push(removed.edit);
        }
    }

    let footer_line_index = to_selection.end_line_index - 1;
    let footer_line = &document.lines[footer_line_index];

    let payload: Vec<String> = selection_lines
        .iter()
        .map(|line| format!("{}{}", indent_str.repeat(line.indent_level_delta), line.string))
        .collect();

    let mut block = vec![branch_header.to_string()];

    block.extend(indent_lines(&payload, &indent_str, 1));
    block.push("}".to_string());

    let insert_lines = indent_lines(&block, &indent_str, footer_line.indent_level);

    (edits, footer_line_index, insert_lines, remove_diff)
}

pub struct AddSelectionToNewElse;

impl DropTarget for AddSelectionToNewElse {
    fn key(&self) -> &'static str {
        "addSelectionToNewElse"
    }

    fn label(&self) -> &'static str {
        "+ else"
    }

    fn is_available(&self, lines: &[Line], selection: &AstSelection) -> bool {
        accepts_else_branch(lines, selection)
    }

    fn handle_drop(
        &self,
        document: &Document,
        from_selection: Option<AstSelection>,
        to_selection: AstSelection,
        selection_lines: &[SelectionLine],
        is_move: bool,
        _option: Option<&str>,
    ) -> DropResult {
        let (mut edits, footer_line_index, insert_lines, remove_diff) = drop_into_new_branch(
            document,
            from_selection,
            to_selection,
            selection_lines,
            is_move,
            "} else {",
        );

        edits.push(document.line_edit(footer_line_index, 1, &insert_lines));

        let new_start = footer_line_index + 1 - remove_diff;

        DropResult {
            edits,
            new_selection: Some(a(new_start, new_start + selection_lines.len())),
            snippet_edit: None,
        }
    }
}

pub struct AddSelectionToNewElseIf;

impl DropTarget for AddSelectionToNewElseIf {
    fn key(&self) -> &'static str {
        "addSelectionToNewElseIf"
    }

    fn label(&self) -> &'static str {
        "+ else if"
    }

    fn is_available(&self, lines: &[Line], selection: &AstSelection) -> bool {
        accepts_else_branch(lines, selection)
    }

    /// The new branch's condition is left as a `[[%tabstop:]]` placeholder,
    /// so the insertion is returned as a snippet edit for the frontend to
    /// expand rather than applied verbatim.
    fn handle_drop(
        &self,
        document: &Document,
        from_selection: Option<AstSelection>,
        to_selection: AstSelection,
        selection_lines: &[SelectionLine],
        is_move: bool,
        _option: Option<&str>,
    ) -> DropResult {
        let (edits, footer_line_index, insert_lines, remove_diff) = drop_into_new_branch(
            document,
            from_selection,
            to_selection,
            selection_lines,
            is_move,
            "} else if ([[%tabstop:]]) {",
        );

        let new_start = footer_line_index + 1 - remove_diff;

        DropResult {
            edits,
            new_selection: Some(a(new_start, new_start + selection_lines.len())),
            snippet_edit: Some(SnippetEdit {
                insert_index: footer_line_index,
                remove_line_count: 1,
                insert_lines,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Cursor;

    fn parse(code: &str) -> Tree {
        let lines: Vec<&str> = code.split('\n').collect();
        let last = lines.len() - 1;
        let range = s2(Cursor::zero(), c(last, lines[last].chars().count()));

        Script.parse(code, &range).expect("parse")
    }

    #[test]
    fn test_blocks_and_statements() {
        let tree = parse("if (a) {\n\tb();\n}");
        let root = tree.root();

        let block = tree.node(root).children[0];

        assert_eq!(tree.node(block).kind, "block");
        assert_eq!(tree.node(block).range, s2(c(0, 0), c(2, 1)));

        let kinds: Vec<&str> = tree
            .node(block)
            .children
            .iter()
            .map(|&id| tree.node(id).kind.as_str())
            .collect();

        assert_eq!(kinds, vec!["keyword", "brace_open", "statement", "brace_close"]);
    }

    #[test]
    fn test_ladder_opens_sibling_block() {
        let tree = parse("if (a) {\n\tb();\n} else {\n\tc();\n}");
        let root = tree.root();

        let blocks = &tree.node(root).children;

        assert_eq!(blocks.len(), 2);
        assert_eq!(tree.node(blocks[0]).range, s2(c(0, 0), c(2, 1)));
        assert_eq!(tree.node(blocks[1]).range, s2(c(2, 0), c(4, 1)));
    }

    #[test]
    fn test_unclosed_block_is_error() {
        let tree = parse("if (a) {\n\tb();");
        let root = tree.root();

        let block = tree.node(root).children[0];

        assert!(tree.node(block).is_error());
    }

    #[test]
    fn test_stray_closer_is_error() {
        let tree = parse("}");
        let root = tree.root();

        assert!(tree.node(tree.node(root).children[0]).is_error());
    }

    #[test]
    fn test_opener_and_closer() {
        let tree = parse("while (x) {\n\ty();\n}");
        let block = tree.node(tree.root()).children[0];

        let pair = Script.get_opener_and_closer(&tree, block).expect("pair");

        assert_eq!(tree.node(pair.opener).kind, "brace_open");
        assert_eq!(tree.node(pair.closer).kind, "brace_close");
    }

    #[test]
    fn test_keyword_hints() {
        let tree = parse("return x;");
        let statement = tree.node(tree.root()).children[0];
        let keyword = tree.node(statement).children[0];

        let hints = Script.generate_render_hints(&tree, keyword);

        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].kind, HintKind::Keyword);
        assert_eq!(hints[0].offset, 0);
    }
}
