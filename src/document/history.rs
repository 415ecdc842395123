//! Undo history entries.

use super::edit::Edit;

/// One atomic undo step: the edits that produced it and the edits that
/// reverse it. `undo` is the reversed `redo` list with each edit inverted,
/// so multi-edit entries unwind in the right order.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub undo: Vec<Edit>,
    pub redo: Vec<Edit>,
}
