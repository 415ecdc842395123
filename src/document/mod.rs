//! The document: text, derived lines, history and parse state.
//!
//! All positions are char-based (line index + char offset within the line).
//! Every mutation goes through [`Edit`] values so each one is reversible,
//! and the undo history stores whole edit lists as atomic entries.

pub mod edit;
pub mod history;
pub mod line;

use std::sync::Arc;

use log::error;

pub use edit::Edit;
pub use history::HistoryEntry;
pub use line::Line;

use crate::error::EditError;
use crate::syntax::lang::Lang;
use crate::syntax::lang_range::LangRange;
use crate::syntax::registry::LangRegistry;
use crate::text::selection::validate;
use crate::text::{c, s, s2, Cursor, Indentation, Selection};

/// Per-file settings the document is interpreted under.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDetails {
    pub lang_code: String,
    pub newline: String,
    pub indentation: Indentation,
    pub tab_width: usize,
    pub path: Option<String>,
}

impl FileDetails {
    pub fn new(
        lang_code: impl Into<String>,
        newline: impl Into<String>,
        indentation: Indentation,
        tab_width: usize,
    ) -> Self {
        Self {
            lang_code: lang_code.into(),
            newline: newline.into(),
            indentation,
            tab_width,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());

        self
    }
}

/// Notifications drained by the frontend after each operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    Edit,
    Undo,
    Redo,
    Save,
}

/// An edit paired with the selection to show once it is applied.
#[derive(Debug, Clone)]
pub struct EditResult {
    pub edit: Edit,
    pub new_selection: Selection,
}

pub struct Document {
    string: String,
    pub file_details: FileDetails,
    pub lines: Vec<Line>,
    lang: Arc<dyn Lang>,
    registry: Arc<LangRegistry>,
    lang_range: Option<LangRange>,
    history: Vec<HistoryEntry>,
    history_index: usize,
    history_index_at_save: usize,
    modified: bool,
    events: Vec<DocumentEvent>,
    batch_depth: usize,
    batch_edited: bool,
}

impl Document {
    pub fn new(
        code: &str,
        file_details: FileDetails,
        registry: Arc<LangRegistry>,
    ) -> Result<Self, EditError> {
        let lang = registry
            .get(&file_details.lang_code)
            .ok_or_else(|| EditError::UnknownLang(file_details.lang_code.clone()))?;

        let mut document = Self {
            string: code.to_string(),
            file_details,
            lines: Vec::new(),
            lang,
            registry,
            lang_range: None,
            history: Vec::new(),
            history_index: 0,
            history_index_at_save: 0,
            modified: false,
            events: Vec::new(),
            batch_depth: 0,
            batch_edited: false,
        };

        document.parse();

        Ok(document)
    }

    pub fn text(&self) -> &str {
        &self.string
    }

    pub fn lang(&self) -> &Arc<dyn Lang> {
        &self.lang
    }

    pub fn lang_range(&self) -> Option<&LangRange> {
        self.lang_range.as_ref()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    /// Suppress per-edit notifications until the matching [`end_batch`],
    /// which emits a single edit event for the whole batch.
    ///
    /// [`end_batch`]: Document::end_batch
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    pub fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);

        if self.batch_depth == 0 && self.batch_edited {
            self.batch_edited = false;
            self.events.push(DocumentEvent::Edit);
        }
    }

    /// Build a reversible edit replacing `selection` with `replace_with`.
    /// Pure: nothing is applied. A stale selection is clamped to the current
    /// line grid first. `new_selection` covers the inserted text, so its
    /// `end` is the caret position after the edit.
    pub fn edit(&self, selection: Selection, replace_with: &str) -> Edit {
        let selection = self.clamp(&selection);
        let string = self.get_selected_text(&selection);
        let sorted = selection.sort();
        let newline = &self.file_details.newline;

        let prefix: String = self.lines[sorted.start.line_index]
            .string
            .chars()
            .take(sorted.start.offset)
            .collect();

        // split always yields at least one element
        let insert_lines: Vec<&str> = replace_with.split(newline.as_str()).collect();
        let last = insert_lines.len() - 1;

        let end_offset = if last == 0 {
            prefix.chars().count() + insert_lines[0].chars().count()
        } else {
            insert_lines[last].chars().count()
        };

        Edit {
            selection,
            string,
            replace_with: replace_with.to_string(),
            new_selection: s2(sorted.start, c(sorted.start.line_index + last, end_offset)),
        }
    }

    /// Splice an edit into the text and reparse.
    pub fn apply(&mut self, edit: &Edit) {
        let sorted = edit.selection.sort();
        let start_char = self.index_from_cursor(sorted.start);
        let byte_start = byte_index(&self.string, start_char);
        let byte_end = byte_index(&self.string, start_char + edit.string.chars().count());

        self.string
            .replace_range(byte_start..byte_end, &edit.replace_with);

        self.reparse_after_edit(edit);

        self.modified = true;

        if self.batch_depth == 0 {
            self.events.push(DocumentEvent::Edit);
        } else {
            self.batch_edited = true;
        }
    }

    pub fn apply_edits(&mut self, edits: &[Edit]) {
        for edit in edits {
            self.apply(edit);
        }
    }

    /// Apply `edits` as one atomic undo step. Edits are sorted by descending
    /// start line first, so applying edit *k* never shifts the line indices
    /// the later edits still refer to. Any redo tail is truncated.
    pub fn apply_and_add_history_entry(&mut self, mut edits: Vec<Edit>) -> &HistoryEntry {
        edits.sort_by(|a, b| {
            b.selection
                .sort()
                .start
                .line_index
                .cmp(&a.selection.sort().start.line_index)
        });

        let undo = edits.iter().rev().map(Edit::reverse).collect();

        self.apply_edits(&edits);

        self.history.truncate(self.history_index);
        self.history.push(HistoryEntry { undo, redo: edits });
        self.history_index = self.history.len();

        &self.history[self.history_index - 1]
    }

    /// Apply `edits` and fold them into the most recent entry's redo side,
    /// without creating a new undo boundary. Only valid for same-line
    /// incremental edits (e.g. a typing run) that leave the entry's stored
    /// undo side applicable.
    pub fn apply_and_merge_with_last_history_entry(
        &mut self,
        edits: Vec<Edit>,
    ) -> Result<&HistoryEntry, EditError> {
        if self.history.is_empty() || self.history_index != self.history.len() {
            return Err(EditError::NoHistoryEntry);
        }

        self.apply_edits(&edits);

        let last = self.history.len() - 1;

        self.history[last].redo = edits;

        Ok(&self.history[last])
    }

    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.history_index == 0 {
            return None;
        }

        self.history_index -= 1;

        let edits = self.history[self.history_index].undo.clone();

        self.apply_edits(&edits);

        if self.history_index == self.history_index_at_save {
            self.modified = false;
        }

        self.events.push(DocumentEvent::Undo);

        Some(&self.history[self.history_index])
    }

    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.history_index == self.history.len() {
            return None;
        }

        let edits = self.history[self.history_index].redo.clone();

        self.history_index += 1;
        self.apply_edits(&edits);

        if self.history_index == self.history_index_at_save {
            self.modified = false;
        }

        self.events.push(DocumentEvent::Redo);

        Some(&self.history[self.history_index - 1])
    }

    /// Record the current history position as the on-disk state. The
    /// modified flag becomes false, and becomes false again whenever
    /// undo/redo returns to exactly this position.
    pub fn mark_saved(&mut self) {
        self.modified = false;
        self.history_index_at_save = self.history_index;

        self.events.push(DocumentEvent::Save);
    }

    /// Build an edit that replaces `remove_line_count` whole lines starting
    /// at `line_index` with `insert_lines`.
    pub fn line_edit(
        &self,
        line_index: usize,
        remove_line_count: usize,
        insert_lines: &[String],
    ) -> Edit {
        let newline = &self.file_details.newline;
        let line_count = self.lines.len();
        let line_index = line_index.min(line_count);
        let remove_line_count = remove_line_count.min(line_count - line_index);
        let insert = insert_lines.join(newline);

        if line_index + remove_line_count < line_count {
            let selection = s2(c(line_index, 0), c(line_index + remove_line_count, 0));

            let replace_with = if insert_lines.is_empty() {
                String::new()
            } else {
                format!("{insert}{newline}")
            };

            self.edit(selection, &replace_with)
        } else {
            // the range reaches the end of the document, so the separating
            // newline belongs to the line above
            let start = if line_index == 0 {
                Cursor::zero()
            } else {
                c(line_index - 1, self.lines[line_index - 1].len())
            };

            let end = c(line_count - 1, self.lines[line_count - 1].len());

            let replace_with = if insert_lines.is_empty() {
                String::new()
            } else if line_index == 0 {
                insert
            } else {
                format!("{newline}{insert}")
            };

            self.edit(s2(start, end), &replace_with)
        }
    }

    /// Replace `selection` with `string`, leaving the caret after the
    /// insertion.
    pub fn replace_selection(&self, selection: Selection, string: &str) -> EditResult {
        let edit = self.edit(selection, string);
        let new_selection = s(edit.new_selection.end);

        EditResult {
            edit,
            new_selection,
        }
    }

    pub fn insert(&self, selection: Selection, string: &str) -> EditResult {
        self.replace_selection(selection, string)
    }

    /// Backspace: delete the selection, or the char before the caret,
    /// joining lines at a line start. `None` at the very start of the
    /// document.
    pub fn backspace(&self, selection: Selection) -> Option<EditResult> {
        let selection = self.clamp(&selection);

        if selection.is_full() {
            return Some(self.replace_selection(selection, ""));
        }

        let cursor = selection.sort().start;

        if cursor.line_index == 0 && cursor.offset == 0 {
            return None;
        }

        let before = if cursor.offset == 0 {
            c(cursor.line_index - 1, self.lines[cursor.line_index - 1].len())
        } else {
            c(cursor.line_index, cursor.offset - 1)
        };

        Some(EditResult {
            edit: self.edit(s2(before, cursor), ""),
            new_selection: s(before),
        })
    }

    /// Forward delete: delete the selection, or the char after the caret,
    /// joining lines at a line end. `None` at the very end of the document.
    pub fn delete_forward(&self, selection: Selection) -> Option<EditResult> {
        let selection = self.clamp(&selection);

        if selection.is_full() {
            return Some(self.replace_selection(selection, ""));
        }

        let cursor = selection.sort().start;
        let line = &self.lines[cursor.line_index];

        if cursor.line_index == self.lines.len() - 1 && cursor.offset == line.len() {
            return None;
        }

        let after = if cursor.offset == line.len() {
            c(cursor.line_index + 1, 0)
        } else {
            c(cursor.line_index, cursor.offset + 1)
        };

        Some(EditResult {
            edit: self.edit(s2(cursor, after), ""),
            new_selection: s(cursor),
        })
    }

    /// Insert a newline, carrying the current line's indentation and adding
    /// a level when the caret sits at the end of a line that opens a block.
    pub fn insert_newline(&self, selection: Selection) -> EditResult {
        let cursor = self.clamp(&selection).sort().start;
        let line = &self.lines[cursor.line_index];

        let mut indent_level = line.indent_level;

        if cursor.offset == line.len() && !line.openers.is_empty() {
            indent_level += 1;
        }

        let indent = self.file_details.indentation.string.repeat(indent_level);

        self.replace_selection(
            selection,
            &format!("{}{indent}", self.file_details.newline),
        )
    }

    /// Char index within the whole text for a cursor.
    pub fn index_from_cursor(&self, cursor: Cursor) -> usize {
        let newline_len = self.file_details.newline.chars().count();

        let preceding: usize = self
            .lines
            .iter()
            .take(cursor.line_index)
            .map(|line| line.len() + newline_len)
            .sum();

        preceding + cursor.offset
    }

    /// Inverse of [`index_from_cursor`]. `None` past the end of the text.
    /// An index inside a multi-char newline separator clamps to the start of
    /// the following line.
    ///
    /// [`index_from_cursor`]: Document::index_from_cursor
    pub fn cursor_from_index(&self, index: usize) -> Option<Cursor> {
        let newline_len = self.file_details.newline.chars().count();
        let mut index = index;

        for (line_index, line) in self.lines.iter().enumerate() {
            if index <= line.len() {
                return Some(c(line_index, index));
            }

            match index.checked_sub(line.len() + newline_len) {
                Some(rest) => index = rest,
                None if line_index + 1 < self.lines.len() => {
                    return Some(c(line_index + 1, 0));
                }
                None => return None,
            }
        }

        None
    }

    pub fn get_selected_text(&self, selection: &Selection) -> String {
        let sorted = self.clamp(selection).sort();
        let (start, end) = (sorted.start, sorted.end);
        let newline = &self.file_details.newline;

        if start.line_index == end.line_index {
            return self.lines[start.line_index]
                .string
                .chars()
                .skip(start.offset)
                .take(end.offset - start.offset)
                .collect();
        }

        let mut text: String = self.lines[start.line_index]
            .string
            .chars()
            .skip(start.offset)
            .collect();

        for line in &self.lines[start.line_index + 1..end.line_index] {
            text.push_str(newline);
            text.push_str(&line.string);
        }

        text.push_str(newline);
        text.extend(self.lines[end.line_index].string.chars().take(end.offset));

        text
    }

    pub fn get_longest_line_width(&self) -> usize {
        self.lines.iter().map(|line| line.width).max().unwrap_or(0)
    }

    /// Full reparse: rebuild every line from the text, parse the whole
    /// document under the main language and decorate.
    pub fn parse(&mut self) {
        let mut lines = self.build_lines();
        let range = document_range(&lines);

        match LangRange::new(Arc::clone(&self.lang), &self.string, range, &self.registry) {
            Ok(root) => {
                root.decorate_lines(&mut lines);
                self.lang_range = Some(root);
            }
            Err(parse_error) => {
                error!("parse failed, lines left undecorated: {parse_error}");
                self.lang_range = None;
            }
        }

        self.lines = lines;
    }

    /// Reparse after one edit, routed through the existing range so a
    /// failure keeps the previous tree instead of discarding it.
    fn reparse_after_edit(&mut self, edit: &Edit) {
        let mut lines = self.build_lines();
        let range = document_range(&lines);

        if let Some(root) = self.lang_range.as_mut() {
            if root.edit(edit, range, &self.string, &self.registry).is_ok() {
                root.decorate_lines(&mut lines);
            }
        } else {
            match LangRange::new(Arc::clone(&self.lang), &self.string, range, &self.registry) {
                Ok(root) => {
                    root.decorate_lines(&mut lines);
                    self.lang_range = Some(root);
                }
                Err(parse_error) => {
                    error!("parse failed, lines left undecorated: {parse_error}");
                }
            }
        }

        self.lines = lines;
    }

    /// Clamp a possibly stale selection to the current line grid.
    fn clamp(&self, selection: &Selection) -> Selection {
        let line_lengths: Vec<usize> = self.lines.iter().map(Line::len).collect();

        validate(&line_lengths, selection)
    }

    fn build_lines(&self) -> Vec<Line> {
        let newline = self.file_details.newline.clone();
        let newline_len = newline.chars().count();

        let mut lines = Vec::new();
        let mut start_index = 0;

        for line_string in self.string.split(newline.as_str()) {
            let len = line_string.chars().count();

            lines.push(Line::new(
                line_string.to_string(),
                &self.file_details,
                start_index,
            ));

            start_index += len + newline_len;
        }

        lines
    }
}

fn document_range(lines: &[Line]) -> Selection {
    let last = lines.len().saturating_sub(1);
    let last_len = lines.last().map_or(0, Line::len);

    s2(Cursor::zero(), c(last, last_len))
}

fn byte_index(string: &str, char_index: usize) -> usize {
    string
        .char_indices()
        .nth(char_index)
        .map_or(string.len(), |(i, _)| i)
}
