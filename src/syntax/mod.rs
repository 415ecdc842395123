//! Parsing, language capabilities and multi-language composition.

pub mod lang;
pub mod lang_range;
pub mod registry;
pub mod tree;

pub use lang::{CodeIntel, HintKind, Lang, OpenerAndCloser, RenderHint, SupportLevel};
pub use lang_range::LangRange;
pub use registry::LangRegistry;
pub use tree::{Node, NodeId, Tree, ERROR_KIND};
