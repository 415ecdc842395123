//! The markup language: tag-based, line-oriented.
//!
//! `<script>` and `<style>` element bodies become `raw_text` nodes, which the
//! injection hook hands to the script/style languages. Markup has no
//! structural mode of its own.

use once_cell::sync::Lazy;
use regex::Regex;

use super::split_lines;
use crate::error::ParseError;
use crate::syntax::lang::{HintKind, Lang, OpenerAndCloser, RenderHint, SupportLevel};
use crate::syntax::tree::{NodeId, Tree, ERROR_KIND};
use crate::text::{c, s2, Selection};

static OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([A-Za-z][A-Za-z0-9-]*)").expect("static regex"));

static CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^</([A-Za-z][A-Za-z0-9-]*)\s*>").expect("static regex"));

pub struct Markup;

struct OpenElement {
    node: NodeId,
    tag: String,
    row: usize,
}

impl Lang for Markup {
    fn code(&self) -> &'static str {
        "markup"
    }

    fn name(&self) -> &'static str {
        "Markup"
    }

    fn parse(&self, code: &str, range: &Selection) -> Result<Tree, ParseError> {
        let range = range.sort();
        let lines = split_lines(code);

        let mut tree = Tree::new("document", range);
        let root = tree.root();
        let mut stack: Vec<OpenElement> = Vec::new();

        let start_row = range.start.line_index;
        let end_row = range.end.line_index.min(lines.len().saturating_sub(1));

        for row in start_row..=end_row {
            let line = lines[row];
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            let indent = leading_char_count(line);
            let len = line.chars().count();
            let parent = stack.last().map_or(root, |open| open.node);

            if let Some(captures) = CLOSE_TAG.captures(trimmed) {
                let tag = &captures[1];

                let matches_open = stack
                    .last()
                    .map_or(false, |open| open.tag.eq_ignore_ascii_case(tag));

                if !matches_open {
                    tree.push(parent, ERROR_KIND, s2(c(row, indent), c(row, len)));
                    continue;
                }

                // stack is non-empty here
                let Some(open) = stack.pop() else {
                    continue;
                };

                if is_raw_element(&open.tag) && row > open.row + 1 {
                    tree.push(open.node, "raw_text", s2(c(open.row + 1, 0), c(row, 0)));
                }

                tree.push(open.node, "tag_close", s2(c(row, indent), c(row, len)));
                tree.set_range(open.node, s2(tree.node(open.node).range.start, c(row, len)));
            } else if let Some(captures) = OPEN_TAG.captures(trimmed) {
                let tag = captures[1].to_string();
                let closed_inline = trimmed.ends_with("/>")
                    || trimmed.contains(&format!("</{tag}>"));

                let element = tree.push(
                    parent,
                    element_kind(&tag),
                    s2(c(row, indent), c(row, len)),
                );

                tree.push(element, "tag_open", s2(c(row, indent), c(row, len)));

                if !closed_inline {
                    stack.push(OpenElement {
                        node: element,
                        tag,
                        row,
                    });
                }
            } else if !stack.last().map_or(false, |open| is_raw_element(&open.tag)) {
                // body lines of raw elements belong to the injected language
                tree.push(parent, "text", s2(c(row, indent), c(row, len)));
            }
        }

        for open in stack {
            tree.set_kind(open.node, ERROR_KIND);
            tree.set_range(open.node, s2(tree.node(open.node).range.start, range.end));
        }

        Ok(tree)
    }

    fn get_injection_lang(&self, tree: &Tree, node: NodeId) -> Option<&'static str> {
        let node = tree.node(node);

        if node.kind != "raw_text" {
            return None;
        }

        match node.parent.map(|parent| tree.node(parent).kind.as_str()) {
            Some("script_element") => Some("script"),
            Some("style_element") => Some("style"),
            _ => None,
        }
    }

    fn generate_render_hints(&self, tree: &Tree, node: NodeId) -> Vec<RenderHint> {
        let node = tree.node(node);

        if node.kind != "tag_open" && node.kind != "tag_close" {
            return Vec::new();
        }

        vec![RenderHint {
            kind: HintKind::Tag,
            offset: node.start().offset,
            lang_code: self.code().to_string(),
        }]
    }

    fn get_opener_and_closer(&self, tree: &Tree, node: NodeId) -> Option<OpenerAndCloser> {
        let children = &tree.node(node).children;

        let opener = children
            .iter()
            .copied()
            .find(|&id| tree.node(id).kind == "tag_open")?;

        let closer = children
            .iter()
            .rev()
            .copied()
            .find(|&id| tree.node(id).kind == "tag_close")?;

        Some(OpenerAndCloser { opener, closer })
    }

    fn get_support_level(&self, code: &str, path: Option<&str>) -> Option<SupportLevel> {
        match path {
            Some(path) if path.ends_with(".html") || path.ends_with(".xml") => {
                Some(SupportLevel::Specific)
            }
            _ if code.trim_start().starts_with('<') => Some(SupportLevel::General),
            _ => None,
        }
    }
}

fn element_kind(tag: &str) -> &'static str {
    if tag.eq_ignore_ascii_case("script") {
        "script_element"
    } else if tag.eq_ignore_ascii_case("style") {
        "style_element"
    } else {
        "element"
    }
}

fn is_raw_element(tag: &str) -> bool {
    tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("style")
}

fn leading_char_count(line: &str) -> usize {
    line.chars().count() - line.trim_start().chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Cursor;

    fn parse(code: &str) -> Tree {
        let lines: Vec<&str> = code.split('\n').collect();
        let last = lines.len() - 1;
        let range = s2(Cursor::zero(), c(last, lines[last].chars().count()));

        Markup.parse(code, &range).expect("parse")
    }

    #[test]
    fn test_elements_and_text() {
        let tree = parse("<div>\n\thello\n</div>");
        let element = tree.node(tree.root()).children[0];

        assert_eq!(tree.node(element).kind, "element");
        assert_eq!(tree.node(element).range, s2(c(0, 0), c(2, 6)));

        let kinds: Vec<&str> = tree
            .node(element)
            .children
            .iter()
            .map(|&id| tree.node(id).kind.as_str())
            .collect();

        assert_eq!(kinds, vec!["tag_open", "text", "tag_close"]);
    }

    #[test]
    fn test_script_element_has_raw_text_body() {
        let tree = parse("<script>\n\tlet x = 1;\n\tuse(x);\n</script>");
        let element = tree.node(tree.root()).children[0];

        assert_eq!(tree.node(element).kind, "script_element");

        let raw_text = tree
            .node(element)
            .children
            .iter()
            .copied()
            .find(|&id| tree.node(id).kind == "raw_text")
            .expect("raw_text");

        assert_eq!(tree.node(raw_text).range, s2(c(1, 0), c(3, 0)));
        assert_eq!(Markup.get_injection_lang(&tree, raw_text), Some("script"));
    }

    #[test]
    fn test_style_injection_lang() {
        let tree = parse("<style>\n\tbody { color: red; }\n</style>");
        let element = tree.node(tree.root()).children[0];

        let raw_text = tree
            .node(element)
            .children
            .iter()
            .copied()
            .find(|&id| tree.node(id).kind == "raw_text")
            .expect("raw_text");

        assert_eq!(Markup.get_injection_lang(&tree, raw_text), Some("style"));
    }

    #[test]
    fn test_unclosed_element_is_error() {
        let tree = parse("<div>\n\thello");
        let element = tree.node(tree.root()).children[0];

        assert!(tree.node(element).is_error());
    }

    #[test]
    fn test_mismatched_close_is_error() {
        let tree = parse("<div>\n</span>\n</div>");
        let element = tree.node(tree.root()).children[0];

        let error = tree
            .node(element)
            .children
            .iter()
            .copied()
            .find(|&id| tree.node(id).is_error());

        assert!(error.is_some());
    }

    #[test]
    fn test_inline_element_does_not_open() {
        let tree = parse("<p>hi</p>\n<p>there</p>");
        let children = &tree.node(tree.root()).children;

        assert_eq!(children.len(), 2);
        assert_eq!(tree.node(children[0]).kind, "element");
        assert_eq!(tree.node(children[1]).kind, "element");
    }
}
