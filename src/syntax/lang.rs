//! The language capability interface.
//!
//! Every language the editor can host implements [`Lang`]. All capabilities
//! beyond parsing have no-op defaults, so a language with no structural mode
//! or no injections simply leaves them out.

use serde::{Deserialize, Serialize};

use super::tree::{NodeId, Tree};
use crate::ast::drop::{drop_generic, DropResult, DropTarget};
use crate::ast::selection::{AstSelection, SelectionLine};
use crate::document::line::Line;
use crate::document::Document;
use crate::error::ParseError;
use crate::text::selection::Selection;

/// How well a language matches a file, used for registry selection.
/// Precedence is `Specific > General > Alternate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SupportLevel {
    Alternate,
    General,
    Specific,
}

/// A render hint attached to a line, consumed by the (external) renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderHint {
    pub kind: HintKind,
    /// Char offset within the line.
    pub offset: usize,
    pub lang_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintKind {
    /// Malformed input; rendered but still selectable and editable.
    ParseError,
    Keyword,
    String_,
    Comment,
    Tag,
    Property,
    Symbol,
}

/// The opener/closer node pair for a construct spanning multiple lines,
/// e.g. the braces of a block or the open/close tags of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenerAndCloser {
    pub opener: NodeId,
    pub closer: NodeId,
}

/// A language's capabilities. `parse` is required; everything else defaults
/// to "not supported".
pub trait Lang: Send + Sync {
    /// Short identifier, e.g. `"script"`.
    fn code(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Build a parse tree for `code` constrained to the line/column
    /// rectangle `range` (absolute document coordinates).
    fn parse(&self, code: &str, range: &Selection) -> Result<Tree, ParseError>;

    /// If `node`'s text should be parsed by a different language, return
    /// that language's code.
    fn get_injection_lang(&self, _tree: &Tree, _node: NodeId) -> Option<&'static str> {
        None
    }

    fn generate_render_hints(&self, _tree: &Tree, _node: NodeId) -> Vec<RenderHint> {
        Vec::new()
    }

    /// Only called for non-error nodes spanning more than one line.
    fn get_opener_and_closer(&self, _tree: &Tree, _node: NodeId) -> Option<OpenerAndCloser> {
        None
    }

    /// How well this language supports a file. `None` means not at all.
    fn get_support_level(&self, _code: &str, _path: Option<&str>) -> Option<SupportLevel> {
        None
    }

    /// The structural edit engine for this language, if it has one.
    fn code_intel(&self) -> Option<&dyn CodeIntel> {
        None
    }
}

/// Per-language structural editing: structural selection lookup and
/// drag-and-drop edit computation.
pub trait CodeIntel: Send + Sync {
    /// The smallest complete structural element at `line_index`, for
    /// hovering and picking.
    fn selection_from_line_index(&self, lines: &[Line], line_index: usize) -> AstSelection;

    /// Named drop targets beyond plain insert/move (e.g. "wrap in
    /// else-branch").
    fn drop_targets(&self) -> &[&'static dyn DropTarget] {
        &[]
    }

    fn drop_target(&self, key: &str) -> Option<&'static dyn DropTarget> {
        self.drop_targets()
            .iter()
            .copied()
            .find(|target| target.key() == key)
    }

    /// Compute the text edits for a structural drop. The default is the
    /// shared engine: named target first, then adjacent-sibling whitespace
    /// resize, then general move/copy.
    #[allow(clippy::too_many_arguments)]
    fn drop(
        &self,
        document: &Document,
        from_selection: Option<AstSelection>,
        to_selection: Option<AstSelection>,
        selection_lines: &[SelectionLine],
        is_move: bool,
        option: Option<&str>,
        target: Option<&str>,
    ) -> DropResult {
        let target = target.and_then(|key| self.drop_target(key));

        drop_generic(
            document,
            from_selection,
            to_selection,
            selection_lines,
            is_move,
            option,
            target,
        )
    }
}
