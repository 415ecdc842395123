//! The style language: rule-based (`selector {`, declarations, `}`).
//!
//! Structurally it is the script grammar without ladders; its AST mode uses
//! the generic drop engine with no named targets.

use once_cell::sync::Lazy;
use regex::Regex;

use super::split_lines;
use crate::ast::common::element_at;
use crate::ast::selection::AstSelection;
use crate::document::line::Line;
use crate::error::ParseError;
use crate::syntax::lang::{CodeIntel, HintKind, Lang, OpenerAndCloser, RenderHint, SupportLevel};
use crate::syntax::tree::{NodeId, Tree, ERROR_KIND};
use crate::text::{c, s2, Selection};

static PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-A-Za-z]+\s*:").expect("static regex"));

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\*.*?\*/").expect("static regex"));

pub struct Style;

impl Lang for Style {
    fn code(&self) -> &'static str {
        "style"
    }

    fn name(&self) -> &'static str {
        "Style"
    }

    fn parse(&self, code: &str, range: &Selection) -> Result<Tree, ParseError> {
        let range = range.sort();
        let lines = split_lines(code);

        let mut tree = Tree::new("stylesheet", range);
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
                let Some(rule) = stack.pop() else {
                    tree.push(parent, ERROR_KIND, s2(c(row, indent), c(row, len)));
                    continue;
                };

                tree.push(rule, "brace_close", s2(c(row, indent), c(row, indent + 1)));
                tree.set_range(rule, s2(tree.node(rule).range.start, c(row, indent + 1)));
            } else if trimmed.ends_with('{') {
                let rule = tree.push(parent, "rule", s2(c(row, indent), c(row, len)));

                tree.push(rule, "selector", s2(c(row, indent), c(row, len - 1)));
                tree.push(rule, "brace_open", s2(c(row, len - 1), c(row, len)));
                stack.push(rule);
            } else {
                let declaration =
                    tree.push(parent, "declaration", s2(c(row, indent), c(row, len)));

                push_token_nodes(&mut tree, declaration, row, line, trimmed, indent);
            }
        }

        for rule in stack {
            tree.set_kind(rule, ERROR_KIND);
            tree.set_range(rule, s2(tree.node(rule).range.start, range.end));
        }

        Ok(tree)
    }

    fn generate_render_hints(&self, tree: &Tree, node: NodeId) -> Vec<RenderHint> {
        let node = tree.node(node);

        let kind = match node.kind.as_str() {
            "property" => HintKind::Property,
            "comment" => HintKind::Comment,
            _ => return Vec::new(),
        };

        vec![RenderHint {
            kind,
            offset: node.start().offset,
            lang_code: self.code().to_string(),
        }]
    }

    fn get_opener_and_closer(&self, tree: &Tree, node: NodeId) -> Option<OpenerAndCloser> {
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

    fn get_support_level(&self, _code: &str, path: Option<&str>) -> Option<SupportLevel> {
        match path {
            Some(path) if path.ends_with(".css") || path.ends_with(".style") => {
                Some(SupportLevel::Specific)
            }
            _ => None,
        }
    }

    fn code_intel(&self) -> Option<&dyn CodeIntel> {
        Some(&StyleCodeIntel)
    }
}

fn push_token_nodes(
    tree: &mut Tree,
    parent: NodeId,
    row: usize,
    line: &str,
    trimmed: &str,
    indent: usize,
) {
    if let Some(m) = PROPERTY.find(trimmed) {
        let end = indent + m.as_str().trim_end_matches(':').trim_end().chars().count();

        tree.push(parent, "property", s2(c(row, indent), c(row, end)));
    }

    for m in BLOCK_COMMENT.find_iter(line) {
        let start = line[..m.start()].chars().count();
        let end = start + m.as_str().chars().count();

        tree.push(parent, "comment", s2(c(row, start), c(row, end)));
    }
}

fn leading_char_count(line: &str) -> usize {
    line.chars().count() - line.trim_start().chars().count()
}

pub struct StyleCodeIntel;

impl CodeIntel for StyleCodeIntel {
    fn selection_from_line_index(&self, lines: &[Line], line_index: usize) -> AstSelection {
        element_at(lines, line_index)
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

        Style.parse(code, &range).expect("parse")
    }

    #[test]
    fn test_rules_and_declarations() {
        let tree = parse("body {\n\tcolor: red;\n}");
        let rule = tree.node(tree.root()).children[0];

        assert_eq!(tree.node(rule).kind, "rule");
        assert_eq!(tree.node(rule).range, s2(c(0, 0), c(2, 1)));

        let kinds: Vec<&str> = tree
            .node(rule)
            .children
            .iter()
            .map(|&id| tree.node(id).kind.as_str())
            .collect();

        assert_eq!(
            kinds,
            vec!["selector", "brace_open", "declaration", "brace_close"]
        );
    }

    #[test]
    fn test_property_hint() {
        let tree = parse("a {\n\tcolor: red;\n}");
        let rule = tree.node(tree.root()).children[0];
        let declaration = tree.node(rule).children[2];
        let property = tree.node(declaration).children[0];

        let hints = Style.generate_render_hints(&tree, property);

        assert_eq!(hints.len(), 1);
        assert_eq!(hints[0].kind, HintKind::Property);
        assert_eq!(hints[0].offset, 1);
    }

    #[test]
    fn test_unclosed_rule_is_error() {
        let tree = parse("body {\n\tcolor: red;");
        let rule = tree.node(tree.root()).children[0];

        assert!(tree.node(rule).is_error());
    }
}
