//! Structural (AST-level) selection and editing.

pub mod common;
pub mod drop;
pub mod selection;

pub use drop::{drop_generic, DropResult, DropTarget, SnippetEdit};
pub use selection::{a, AstSelection, SelectionLine};
