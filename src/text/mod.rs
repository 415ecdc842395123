//! Character-level text primitives: cursors, selections, indentation.

pub mod cursor;
pub mod indent;
pub mod selection;

pub use cursor::{c, Cursor};
pub use indent::{expand_tabs, IndentLevel, Indentation};
pub use selection::{s, s2, Selection};
