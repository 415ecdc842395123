//! Reversible text edits.

use serde::{Deserialize, Serialize};

use crate::text::Selection;

/// One reversible text replacement. `selection` covers `string` in the text
/// the edit applies to; `new_selection` covers `replace_with` in the text it
/// produces. Holding both sides makes the inverse a pure swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub selection: Selection,
    pub string: String,
    pub replace_with: String,
    pub new_selection: Selection,
}

impl Edit {
    /// The exact algebraic inverse: applying `edit` then `edit.reverse()`
    /// restores the original text.
    pub fn reverse(&self) -> Edit {
        Edit {
            selection: self.new_selection,
            string: self.replace_with.clone(),
            replace_with: self.string.clone(),
            new_selection: self.selection,
        }
    }
}
