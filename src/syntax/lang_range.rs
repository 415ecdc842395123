//! Multi-language composition.
//!
//! A [`LangRange`] owns one language's parse tree over one region of the
//! document. Where the tree contains an injection node (a `<script>` element
//! in markup, say), a child `LangRange` is spawned for the injected language
//! over that node's range, recursively. Decoration then walks the whole
//! composition, so a single document can carry any nesting of languages.

use std::collections::HashMap;
use std::sync::Arc;

use log::error;

use super::lang::{Lang, OpenerAndCloser};
use super::registry::LangRegistry;
use super::tree::{NodeId, Tree};
use crate::document::edit::Edit;
use crate::document::line::{Boundary, Line, NodeAttachment};
use crate::error::ParseError;
use crate::syntax::lang::{HintKind, RenderHint};
use crate::text::{Cursor, Selection};

/// One language's parse over one range of the document, plus child ranges
/// for injections.
pub struct LangRange {
    lang: Arc<dyn Lang>,
    range: Selection,
    tree: Tree,
    children: Vec<LangRange>,
    children_by_node: HashMap<NodeId, usize>,
    // Children indexed by (lang, start cursor). An edit above or below an
    // injection only shifts its start cursor, so a future incremental path
    // can match saved children against the new tree by adjusted cursor and
    // reuse them instead of reparsing.
    children_by_cursor: HashMap<(&'static str, Cursor), usize>,
}

impl LangRange {
    pub fn new(
        lang: Arc<dyn Lang>,
        code: &str,
        range: Selection,
        registry: &LangRegistry,
    ) -> Result<Self, ParseError> {
        let tree = lang.parse(code, &range)?;

        let mut lang_range = Self {
            lang,
            range,
            tree,
            children: Vec::new(),
            children_by_node: HashMap::new(),
            children_by_cursor: HashMap::new(),
        };

        lang_range.spawn_children(code, registry);

        Ok(lang_range)
    }

    pub fn lang_code(&self) -> &'static str {
        self.lang.code()
    }

    pub fn range(&self) -> &Selection {
        &self.range
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn children(&self) -> &[LangRange] {
        &self.children
    }

    /// The child range for an injection starting at `cursor`, if any.
    pub fn child_at(&self, lang_code: &str, cursor: Cursor) -> Option<&LangRange> {
        self.children_by_cursor
            .iter()
            .find(|((code, start), _)| *code == lang_code && *start == cursor)
            .map(|(_, &i)| &self.children[i])
    }

    /// Walk the fresh tree and create a child range for every injection
    /// node. A child whose own parse fails is logged and skipped; the rest
    /// of the composition stands.
    fn spawn_children(&mut self, code: &str, registry: &LangRegistry) {
        for node_id in self.tree.walk() {
            let node = self.tree.node(node_id);

            let Some(injection_lang) = self.injection_lang(node_id, registry) else {
                continue;
            };

            match LangRange::new(Arc::clone(&injection_lang), code, node.range, registry) {
                Ok(child) => {
                    let index = self.children.len();

                    self.children_by_node.insert(node_id, index);
                    self.children_by_cursor
                        .insert((injection_lang.code(), node.range.sort().start), index);
                    self.children.push(child);
                }
                Err(parse_error) => {
                    error!("injection parse failed, skipping range: {parse_error}");
                }
            }
        }
    }

    fn injection_lang(
        &self,
        node_id: NodeId,
        registry: &LangRegistry,
    ) -> Option<Arc<dyn Lang>> {
        let node = self.tree.node(node_id);

        if !node.range.is_full() {
            return None;
        }

        let code = self.lang.get_injection_lang(&self.tree, node_id)?;

        registry.get(code)
    }

    /// Reparse after an edit. The baseline strategy reparses the whole
    /// subtree from scratch; on failure the previous tree and children are
    /// kept and the error is reported to the caller.
    pub fn edit(
        &mut self,
        _edit: &Edit,
        new_range: Selection,
        code: &str,
        registry: &LangRegistry,
    ) -> Result<(), ParseError> {
        match LangRange::new(Arc::clone(&self.lang), code, new_range, registry) {
            Ok(fresh) => {
                *self = fresh;

                Ok(())
            }
            Err(parse_error) => {
                error!(
                    "{} reparse failed, keeping previous tree: {parse_error}",
                    self.lang.code()
                );

                Err(parse_error)
            }
        }
    }

    /// Attach this range's decorations to the lines it covers, recursing
    /// into injected child ranges at their nodes.
    pub fn decorate_lines(&self, lines: &mut [Line]) {
        let root = self.tree.root();

        for node_id in self.tree.walk() {
            if node_id == root {
                continue;
            }

            let node = self.tree.node(node_id);
            let row = node.start().line_index;

            if let Some(line) = lines.get_mut(row) {
                line.nodes.push(NodeAttachment {
                    lang_code: self.lang.code().to_string(),
                    kind: node.kind.clone(),
                    range: node.range,
                });

                line.render_hints.extend(self.render_hints(node_id));
            }

            if let Some(OpenerAndCloser { opener, closer }) = self.opener_and_closer(node_id) {
                let opener_node = self.tree.node(opener);
                let closer_node = self.tree.node(closer);

                if let Some(line) = lines.get_mut(opener_node.start().line_index) {
                    line.openers.push(Boundary {
                        lang_code: self.lang.code().to_string(),
                        kind: opener_node.kind.clone(),
                    });
                }

                if let Some(line) = lines.get_mut(closer_node.start().line_index) {
                    // closers nest inside out
                    line.closers.insert(
                        0,
                        Boundary {
                            lang_code: self.lang.code().to_string(),
                            kind: closer_node.kind.clone(),
                        },
                    );
                }
            }

            if let Some(&child) = self.children_by_node.get(&node_id) {
                self.children[child].decorate_lines(lines);
            }
        }
    }

    fn render_hints(&self, node_id: NodeId) -> Vec<RenderHint> {
        let node = self.tree.node(node_id);

        if node.is_error() {
            return vec![RenderHint {
                kind: HintKind::ParseError,
                offset: node.start().offset,
                lang_code: self.lang.code().to_string(),
            }];
        }

        self.lang.generate_render_hints(&self.tree, node_id)
    }

    fn opener_and_closer(&self, node_id: NodeId) -> Option<OpenerAndCloser> {
        let node = self.tree.node(node_id);

        if node.is_error() || !node.is_multiline() {
            return None;
        }

        self.lang.get_opener_and_closer(&self.tree, node_id)
    }
}
