// Structural selection containment and drag-and-drop edit computation

use astedit::ast::common::{element_at, from_line_range};
use astedit::ast::selection::lines_to_selection_lines;
use astedit::{
    a, default_registry, AstInteraction, AstSelection, Document, DropRequest, FileDetails,
    Indentation, PointerPosition, SelectionLine,
};

fn make_document(code: &str) -> Document {
    let file_details = FileDetails::new("script", "\n", Indentation::tabs(4), 4);

    Document::new(code, file_details, default_registry()).expect("document")
}

fn payload(document: &Document, selection: AstSelection) -> Vec<SelectionLine> {
    lines_to_selection_lines(
        &document.lines[selection.start_line_index..selection.end_line_index],
    )
}

#[test]
fn test_selections_cover_complete_elements() {
    let document =
        make_document("function f() {\n\tif (a) {\n\t\tb();\n\t}\n\tc();\n}\nd();");
    let lines = &document.lines;

    // a plain statement is its own element
    assert_eq!(element_at(lines, 2), a(2, 3));

    // a header expands to its whole block, a footer back to its header
    assert_eq!(element_at(lines, 1), a(1, 4));
    assert_eq!(element_at(lines, 3), a(1, 4));
    assert_eq!(element_at(lines, 0), a(0, 6));

    // nested elements stay within their ancestors
    assert!(a(2, 3).is_within(&a(1, 4)));
    assert!(a(1, 4).is_within(&a(0, 6)));

    // a raw range ending on a footer pulls the whole block in
    assert_eq!(from_line_range(lines, 2, 4), a(1, 4));
}

#[test]
fn test_move_down_corrects_selection_index() {
    let mut document = make_document("a();\nb();\nc();\nd();");
    let original = document.text().to_string();
    let from = a(0, 1);
    let lines = payload(&document, from);

    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(
        &document,
        Some(from),
        Some(AstSelection::insertion_point(3)),
        &lines,
        true,
        None,
        None,
    );

    // the destination index was computed before the removal above it
    assert_eq!(result.new_selection, Some(a(2, 3)));

    document.apply_and_add_history_entry(result.edits);

    assert_eq!(document.text(), "b();\nc();\na();\nd();");
    assert_eq!(document.lines[2].string, "a();");

    // the whole drop is one undo step
    document.undo();

    assert_eq!(document.text(), original);
}

#[test]
fn test_copy_keeps_source() {
    let mut document = make_document("a();\nb();\nc();\nd();");
    let from = a(0, 1);
    let lines = payload(&document, from);

    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(
        &document,
        Some(from),
        Some(AstSelection::insertion_point(3)),
        &lines,
        false,
        None,
        None,
    );

    assert_eq!(result.edits.len(), 1);
    assert_eq!(result.new_selection, Some(a(3, 4)));

    document.apply_and_add_history_entry(result.edits);

    assert_eq!(document.text(), "a();\nb();\nc();\na();\nd();");
}

#[test]
fn test_move_up_needs_no_correction() {
    let mut document = make_document("a();\nb();\nc();\nd();");
    let from = a(3, 4);
    let lines = payload(&document, from);

    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(
        &document,
        Some(from),
        Some(AstSelection::insertion_point(1)),
        &lines,
        true,
        None,
        None,
    );

    assert_eq!(result.new_selection, Some(a(1, 2)));

    document.apply_and_add_history_entry(result.edits);

    assert_eq!(document.text(), "a();\nd();\nb();\nc();");
}

#[test]
fn test_drop_into_block_reindents_payload() {
    let mut document = make_document("if (a) {\n\tb();\n}\nx();");
    let from = a(3, 4);
    let lines = payload(&document, from);

    // insertion point just above the footer: last-child position
    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(
        &document,
        Some(from),
        Some(AstSelection::insertion_point(2)),
        &lines,
        true,
        None,
        None,
    );

    assert_eq!(result.new_selection, Some(a(2, 3)));

    document.apply_and_add_history_entry(result.edits);

    assert_eq!(document.text(), "if (a) {\n\tb();\n\tx();\n}");
}

#[test]
fn test_adjacent_sibling_drop_resizes_gap() {
    let mut document = make_document("a();\n\nb();\nc();");
    let from = a(2, 3);
    let lines = payload(&document, from);

    // dropping b(); into the gap right above it moves nothing; the gap on
    // its far side is resized instead
    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(&document, Some(from), Some(a(1, 2)), &lines, true, None, None);

    assert_eq!(result.new_selection, Some(a(2, 3)));

    document.apply_and_add_history_entry(result.edits);

    assert_eq!(document.text(), "a();\n\nb();\n\nc();");
}

#[test]
fn test_adjacent_drop_with_equal_gap_changes_nothing() {
    let mut document = make_document("a();\n\nb();\n\nc();");
    let from = a(2, 3);
    let lines = payload(&document, from);

    // the gap on the far side already matches the drop range, so the resize
    // degenerates to no inserted lines
    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(&document, Some(from), Some(a(1, 2)), &lines, true, None, None);

    assert_eq!(result.new_selection, Some(a(2, 3)));

    document.apply_and_add_history_entry(result.edits);

    assert_eq!(document.text(), "a();\n\nb();\n\nc();");
}

#[test]
fn test_drop_next_to_source_is_noop() {
    let mut document = make_document("a();\nb();");
    let mut interaction = AstInteraction::new();

    interaction.pick(&document, 0);

    let label = interaction.begin_drag(&document, None).expect("payload");
    let labels = vec![label];

    let new_selection = interaction.drop(
        &mut document,
        &DropRequest {
            labels: &labels,
            position: PointerPosition {
                line_index: 1,
                above_line_index: 1,
                below_line_index: 1,
            },
            from_us: true,
            to_us: true,
            target: None,
            copy_modifier: false,
        },
    );

    assert_eq!(new_selection, None);
    assert_eq!(document.text(), "a();\nb();");
    assert_eq!(document.history_index(), 0);
}

#[test]
fn test_else_target_rewrites_footer() {
    let mut document = make_document("x();\nif (a) {\n\tb();\n}");
    let original = document.text().to_string();
    let from = a(0, 1);
    let lines = payload(&document, from);

    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(
        &document,
        Some(from),
        Some(a(1, 4)),
        &lines,
        true,
        None,
        Some("addSelectionToNewElse"),
    );

    assert_eq!(result.new_selection, Some(a(3, 4)));

    document.apply_and_add_history_entry(result.edits);

    assert_eq!(document.text(), "if (a) {\n\tb();\n} else {\n\tx();\n}");
    assert_eq!(document.lines[3].string, "\tx();");

    document.undo();

    assert_eq!(document.text(), original);
}

#[test]
fn test_else_if_target_returns_snippet_edit() {
    let document = make_document("x();\nif (a) {\n\tb();\n}");
    let lines = payload(&document, a(0, 1));

    let code_intel = document.lang().code_intel().expect("code intel");
    let result = code_intel.drop(
        &document,
        Some(a(0, 1)),
        Some(a(1, 4)),
        &lines,
        false,
        None,
        Some("addSelectionToNewElseIf"),
    );

    // a copy removes nothing, and the insertion is deferred to the snippet
    assert!(result.edits.is_empty());

    let snippet = result.snippet_edit.expect("snippet edit");

    assert_eq!(snippet.insert_index, 3);
    assert_eq!(snippet.remove_line_count, 1);
    assert_eq!(
        snippet.insert_lines,
        vec!["} else if ([[%tabstop:]]) {", "\tx();", "}"]
    );
    assert_eq!(result.new_selection, Some(a(4, 5)));
}
