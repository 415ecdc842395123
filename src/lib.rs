//! astedit: a dual-mode source editor core.
//!
//! Ordinary character-grained editing (cursors, selections, reversible edits,
//! undo history) coexists with a structural mode that selects, drags and
//! drops whole syntactic constructs, while the document stays parsed by
//! several languages at once via injection (markup hosting script and style
//! regions).
//!
//! Rendering, windowing and platform plumbing are external collaborators:
//! this crate consumes hit-tested positions and produces edits, hilites and
//! parse decorations.

pub mod ast;
pub mod document;
pub mod error;
pub mod interaction;
pub mod langs;
pub mod syntax;
pub mod text;

pub use ast::{a, AstSelection, DropResult, DropTarget, SelectionLine, SnippetEdit};
pub use document::{Document, DocumentEvent, Edit, EditResult, FileDetails, HistoryEntry, Line};
pub use error::{EditError, ParseError};
pub use interaction::{
    AstInteraction, DragPayload, DropEffect, DropRequest, InteractionState, PointerPosition,
};
pub use langs::default_registry;
pub use syntax::{CodeIntel, Lang, LangRange, LangRegistry, RenderHint, SupportLevel, Tree};
pub use text::{c, s, s2, Cursor, Indentation, Selection};
