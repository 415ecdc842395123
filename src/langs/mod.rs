//! Built-in languages.

pub mod markup;
pub mod script;
pub mod style;

use std::sync::Arc;

pub use markup::Markup;
pub use script::Script;
pub use style::Style;

use crate::syntax::registry::LangRegistry;

/// A registry holding the three built-in languages.
pub fn default_registry() -> Arc<LangRegistry> {
    let mut registry = LangRegistry::new();

    registry.add(Arc::new(Markup));
    registry.add(Arc::new(Script));
    registry.add(Arc::new(Style));

    Arc::new(registry)
}

/// Split document text into lines, tolerating `\r\n` input.
pub(crate) fn split_lines(code: &str) -> Vec<&str> {
    code.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}
