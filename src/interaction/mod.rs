//! The structural pointer-interaction controller.
//!
//! Consumes already-hit-tested pointer positions (the frontend owns pixels)
//! and drives the structural editing flow: hover hilites, picking, dragging
//! with the encoded transport payload, and drop dispatch into the language's
//! structural edit engine. Every exit path clears the transient drag state,
//! so an aborted drag can never leave a stale hilite or payload behind.

pub mod transport;

use std::sync::Arc;

use log::debug;

use crate::ast::drop::DropTarget;
use crate::ast::selection::{insertion_range, lines_to_selection_lines, AstSelection};
use crate::document::Document;

pub use transport::DragPayload;

/// Where the controller is in the interaction flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering,
    Dragging,
    /// Our payload was dropped into another window; we only wait for the
    /// drag-end notification.
    DroppingExternal,
}

/// A hit-tested pointer position: the row under the pointer plus the line
/// boundaries above and below it.
#[derive(Debug, Clone, Copy)]
pub struct PointerPosition {
    pub line_index: usize,
    pub above_line_index: usize,
    pub below_line_index: usize,
}

/// Copy vs. move, reported back to the platform during dragover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropEffect {
    Copy,
    Move,
}

/// Everything the frontend knows at the moment of a drop.
#[derive(Debug, Clone)]
pub struct DropRequest<'a> {
    /// Type labels offered by the platform's drag transfer.
    pub labels: &'a [String],
    pub position: PointerPosition,
    /// The drag started in this window.
    pub from_us: bool,
    /// The drop landed in this window.
    pub to_us: bool,
    /// Named drop target under the pointer, if any.
    pub target: Option<&'a str>,
    pub copy_modifier: bool,
}

struct DragState {
    selection: AstSelection,
    payload: DragPayload,
}

/// The structural-mode interaction state machine:
/// `Idle → Hovering → Dragging → (Idle | DroppingExternal)`.
#[derive(Default)]
pub struct AstInteraction {
    state: InteractionState,
    ast_selection: Option<AstSelection>,
    selection_hilite: Option<AstSelection>,
    insertion_hilite: Option<AstSelection>,
    drag: Option<DragState>,
}

impl AstInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The committed structural selection, if any.
    pub fn ast_selection(&self) -> Option<AstSelection> {
        self.ast_selection
    }

    /// The element hilite to draw under the pointer.
    pub fn selection_hilite(&self) -> Option<AstSelection> {
        self.selection_hilite
    }

    /// The insertion hilite to draw during a drag.
    pub fn insertion_hilite(&self) -> Option<AstSelection> {
        self.insertion_hilite
    }

    /// Pointer moved over `line_index` outside of a drag.
    pub fn hover(&mut self, document: &Document, line_index: usize) {
        self.selection_hilite = self.hilite_at(document, line_index, false);

        if matches!(
            self.state(),
            InteractionState::Idle | InteractionState::Hovering
        ) {
            self.state = if self.selection_hilite.is_some() {
                InteractionState::Hovering
            } else {
                InteractionState::Idle
            };
        }
    }

    /// Pointer left the code area.
    pub fn leave(&mut self) {
        self.selection_hilite = None;

        if self.state() == InteractionState::Hovering {
            self.state = InteractionState::Idle;
        }
    }

    /// Click: commit the element under the pointer as the structural
    /// selection.
    pub fn click(&mut self, document: &Document, line_index: usize) -> Option<AstSelection> {
        let selection = self.hilite_at(document, line_index, true)?;

        self.ast_selection = Some(selection);
        self.selection_hilite = self.hilite_at(document, line_index, false);

        Some(selection)
    }

    /// Mouse-down on an element: commit it so a drag can start from it.
    pub fn pick(&mut self, document: &Document, line_index: usize) -> Option<AstSelection> {
        let selection = self.hilite_at(document, line_index, false)?;

        self.ast_selection = Some(selection);

        Some(selection)
    }

    /// Start dragging the committed selection. Returns the encoded transport
    /// label to hand to the platform, or `None` with no selection.
    pub fn begin_drag(&mut self, document: &Document, option: Option<&str>) -> Option<String> {
        let selection = self.ast_selection?;

        let lines = lines_to_selection_lines(
            &document.lines[selection.start_line_index..selection.end_line_index],
        );

        let payload = DragPayload {
            option: option.map(str::to_string),
            lines,
        };

        let encoded = transport::encode(&payload);

        self.drag = Some(DragState { selection, payload });
        self.state = InteractionState::Dragging;

        Some(encoded)
    }

    /// Continuous dragover: recompute the insertion hilite (suppressed while
    /// a named target is under the pointer) and report the drop effect.
    pub fn drag_over(
        &mut self,
        document: &Document,
        labels: &[String],
        position: PointerPosition,
        target: Option<&str>,
        copy_modifier: bool,
    ) -> DropEffect {
        let effect = if copy_modifier {
            DropEffect::Copy
        } else {
            DropEffect::Move
        };

        let recognized = self.drag.is_some()
            || transport::decode_types(labels.iter().map(String::as_str)).is_some();

        if !recognized {
            // foreign drag, leave it to the normal editing mode
            return effect;
        }

        self.insertion_hilite = if target.is_some() {
            None
        } else {
            Some(self.insertion_range_at(
                document,
                position.above_line_index,
                position.below_line_index,
            ))
        };

        effect
    }

    /// The named drop targets applicable to the element under the pointer.
    pub fn drop_targets_at(
        &self,
        document: &Document,
        line_index: usize,
    ) -> Vec<&'static dyn DropTarget> {
        let Some(selection) = self.hilite_at(document, line_index, false) else {
            return Vec::new();
        };

        let lang = Arc::clone(document.lang());

        lang.code_intel().map_or_else(Vec::new, |code_intel| {
            code_intel
                .drop_targets()
                .iter()
                .copied()
                .filter(|target| target.is_available(&document.lines, &selection))
                .collect()
        })
    }

    /// Dispatch a drop: resolve source and destination, hand them to the
    /// language's structural edit engine, and apply the resulting edits as
    /// one history entry. Returns the new structural selection, or `None`
    /// when the drop was a no-op. Transient drag state is cleared on every
    /// path.
    pub fn drop(
        &mut self,
        document: &mut Document,
        request: &DropRequest<'_>,
    ) -> Option<AstSelection> {
        self.insertion_hilite = None;
        self.selection_hilite = None;

        self.state = if request.to_us {
            InteractionState::Idle
        } else {
            InteractionState::DroppingExternal
        };

        let is_move = !request.copy_modifier;

        let (from_selection, payload) = if request.from_us {
            let drag = self.drag.take()?;

            (Some(drag.selection), drag.payload)
        } else {
            let payload = transport::decode_types(request.labels.iter().map(String::as_str))?;

            (None, payload)
        };

        let to_selection = if request.to_us {
            if request.target.is_some() {
                self.hilite_at(document, request.position.line_index, false)
            } else {
                Some(self.insertion_range_at(
                    document,
                    request.position.above_line_index,
                    request.position.below_line_index,
                ))
            }
        } else {
            None
        };

        // dropping an element into the gap right next to itself is a no-op
        if let (Some(from), Some(to)) = (&from_selection, &to_selection) {
            if !to.is_full() && from.is_adjacent(to, &document.lines) {
                debug!("drop adjacent to source, ignoring");

                return None;
            }
        }

        let lang = Arc::clone(document.lang());
        let code_intel = lang.code_intel()?;

        let result = code_intel.drop(
            document,
            from_selection,
            to_selection,
            &payload.lines,
            is_move,
            payload.option.as_deref(),
            request.target,
        );

        if result.edits.is_empty() {
            return None;
        }

        document.begin_batch();
        document.apply_and_add_history_entry(result.edits);
        document.end_batch();

        self.ast_selection = result.new_selection;

        result.new_selection
    }

    /// Drag finished (dropped or cancelled, here or elsewhere): clear all
    /// transient state.
    pub fn end_drag(&mut self) {
        self.drag = None;
        self.insertion_hilite = None;
        self.selection_hilite = None;
        self.state = InteractionState::Idle;
    }

    /// The element hilite for a pointer row: the committed selection when
    /// the pointer is inside it (unless `within_selection` forces a fresh
    /// lookup), otherwise the smallest element at that row.
    fn hilite_at(
        &self,
        document: &Document,
        line_index: usize,
        within_selection: bool,
    ) -> Option<AstSelection> {
        if line_index >= document.lines.len() {
            return None;
        }

        if !within_selection {
            if let Some(selection) = &self.ast_selection {
                if selection.contains_line(line_index) {
                    return Some(*selection);
                }
            }
        }

        let lang = Arc::clone(document.lang());
        let selection = lang
            .code_intel()
            .map(|code_intel| code_intel.selection_from_line_index(&document.lines, line_index));

        selection
    }

    /// The insertion range for a pointer between two lines. A range falling
    /// inside the committed selection collapses to the selection's start, so
    /// dragging within the selection offers dropping it back where it was.
    fn insertion_range_at(
        &self,
        document: &Document,
        above_line_index: usize,
        below_line_index: usize,
    ) -> AstSelection {
        let range = insertion_range(&document.lines, above_line_index, below_line_index);

        if let Some(selection) = &self.ast_selection {
            if range.is_within(selection) {
                return AstSelection::insertion_point(selection.start_line_index);
            }
        }

        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::selection::a;
    use crate::document::FileDetails;
    use crate::langs::default_registry;
    use crate::text::Indentation;

    fn make_document(code: &str) -> Document {
        let file_details = FileDetails::new("script", "\n", Indentation::tabs(4), 4);

        Document::new(code, file_details, default_registry()).expect("document")
    }

    #[test]
    fn test_hover_hilites_smallest_element() {
        let document = make_document("if (a) {\n\tb();\n}\nc();");
        let mut interaction = AstInteraction::new();

        interaction.hover(&document, 1);

        assert_eq!(interaction.state(), InteractionState::Hovering);
        assert_eq!(interaction.selection_hilite(), Some(a(1, 2)));

        interaction.hover(&document, 0);

        assert_eq!(interaction.selection_hilite(), Some(a(0, 3)));
    }

    #[test]
    fn test_hover_prefers_committed_selection() {
        let document = make_document("if (a) {\n\tb();\n}\nc();");
        let mut interaction = AstInteraction::new();

        interaction.click(&document, 0);

        assert_eq!(interaction.ast_selection(), Some(a(0, 3)));

        // inside the committed selection, the hilite is the selection itself
        interaction.hover(&document, 1);

        assert_eq!(interaction.selection_hilite(), Some(a(0, 3)));
    }

    #[test]
    fn test_drag_state_round_trip() {
        let mut document = make_document("a();\nb();\n\nc();");
        let mut interaction = AstInteraction::new();

        interaction.pick(&document, 0);

        let label = interaction.begin_drag(&document, None).expect("payload");

        assert_eq!(interaction.state(), InteractionState::Dragging);

        let labels = vec![label];
        let position = PointerPosition {
            line_index: 3,
            above_line_index: 3,
            below_line_index: 3,
        };

        let effect = interaction.drag_over(&document, &labels, position, None, false);

        assert_eq!(effect, DropEffect::Move);
        assert_eq!(interaction.insertion_hilite(), Some(a(2, 3)));

        let new_selection = interaction.drop(
            &mut document,
            &DropRequest {
                labels: &labels,
                position,
                from_us: true,
                to_us: true,
                target: None,
                copy_modifier: false,
            },
        );

        assert_eq!(document.text(), "b();\n\na();\n\nc();");
        assert_eq!(new_selection, Some(a(2, 3)));
        assert_eq!(interaction.state(), InteractionState::Idle);
        assert_eq!(interaction.insertion_hilite(), None);

        interaction.end_drag();

        assert_eq!(interaction.state(), InteractionState::Idle);
    }

    #[test]
    fn test_foreign_drag_is_ignored() {
        let document = make_document("a();");
        let mut interaction = AstInteraction::new();

        let labels = vec!["text/plain".to_string()];
        let position = PointerPosition {
            line_index: 0,
            above_line_index: 0,
            below_line_index: 0,
        };

        interaction.drag_over(&document, &labels, position, None, false);

        assert_eq!(interaction.insertion_hilite(), None);
    }

    #[test]
    fn test_drop_targets_for_if_block() {
        let document = make_document("if (a) {\n\tb();\n}");
        let interaction = AstInteraction::new();

        let targets = interaction.drop_targets_at(&document, 0);
        let keys: Vec<&str> = targets.iter().map(|target| target.key()).collect();

        assert_eq!(keys, vec!["addSelectionToNewElse", "addSelectionToNewElseIf"]);
    }
}
