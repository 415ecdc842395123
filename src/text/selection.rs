//! Selections and selection arithmetic.
//!
//! A [`Selection`] is an anchor/end pair of cursors. It is not pre-sorted:
//! `start` is where a drag began and `end` is where it was released, so `end`
//! can be before `start` in document order. [`Selection::sort`] yields
//! textual order.
//!
//! The arithmetic functions here adjust a selection for an edit that happened
//! earlier in the document. They return `None` when the edit overlaps the
//! selection destructively, in which case the caller must drop the derived
//! selection rather than propagate an invalid position.

use serde::{Deserialize, Serialize};

use super::cursor::{c, Cursor};

/// An anchor/end pair of cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: Cursor,
    pub end: Cursor,
}

/// Shorthand for a collapsed selection at `cursor`.
pub fn s(cursor: Cursor) -> Selection {
    Selection {
        start: cursor,
        end: cursor,
    }
}

/// Shorthand for a selection from `start` to `end`.
pub fn s2(start: Cursor, end: Cursor) -> Selection {
    Selection { start, end }
}

impl Selection {
    pub fn new(start: Cursor, end: Cursor) -> Self {
        Self { start, end }
    }

    /// Sort so that `start` is before `end` in document order.
    pub fn sort(&self) -> Selection {
        let flip = self.end.line_index < self.start.line_index
            || (self.end.line_index == self.start.line_index
                && self.end.offset < self.start.offset);

        if flip {
            Selection {
                start: self.end,
                end: self.start,
            }
        } else {
            *self
        }
    }

    /// True if the selection covers at least one character.
    pub fn is_full(&self) -> bool {
        self.start != self.end
    }

    /// True if start and end are on different lines.
    pub fn is_multiline(&self) -> bool {
        self.start.line_index != self.end.line_index
    }

    /// True if `self` ends before `other` starts.
    pub fn is_before(&self, other: &Selection) -> bool {
        self.sort().end.is_before(&other.sort().start)
    }

    /// True if `self`'s sorted start is before `other`'s sorted start.
    pub fn starts_before(&self, other: &Selection) -> bool {
        self.sort().start.is_before(&other.sort().start)
    }

    /// True if `cursor` is strictly inside the selection (touching either
    /// boundary doesn't count).
    pub fn cursor_is_within(&self, cursor: Cursor) -> bool {
        let Selection { start, end } = self.sort();
        let Cursor { line_index, offset } = cursor;

        !(line_index < start.line_index
            || line_index > end.line_index
            || (line_index == start.line_index && offset <= start.offset)
            || (line_index == end.line_index && offset >= end.offset))
    }

    /// True if the character at `char_cursor` is covered by the selection.
    /// Unlike [`cursor_is_within`](Self::cursor_is_within), a character at
    /// the selection's start is covered.
    pub fn char_is_within(&self, char_cursor: Cursor) -> bool {
        let Selection { start, end } = self.sort();
        let Cursor { line_index, offset } = char_cursor;

        !(line_index < start.line_index
            || line_index > end.line_index
            || (line_index == start.line_index && offset < start.offset)
            || (line_index == end.line_index && offset >= end.offset))
    }

    /// True if `cursor` equals either boundary.
    pub fn cursor_is_next_to(&self, cursor: Cursor) -> bool {
        cursor == self.start || cursor == self.end
    }

    pub fn cursor_is_within_or_next_to(&self, cursor: Cursor) -> bool {
        self.cursor_is_next_to(cursor) || self.cursor_is_within(cursor)
    }

    /// True if the selections share any strictly interior position.
    pub fn is_overlapping(&self, other: &Selection) -> bool {
        self.cursor_is_within(other.start)
            || self.cursor_is_within(other.end)
            || other.cursor_is_within(self.start)
            || other.cursor_is_within(self.end)
    }

    /// True if the selections cover the same range, ignoring anchor
    /// orientation.
    pub fn equals(&self, other: &Selection) -> bool {
        let a = self.sort();
        let b = other.sort();

        a.start == b.start && a.end == b.end
    }

    /// True if `self` lies within `other` (boundaries may touch).
    pub fn is_within(&self, other: &Selection) -> bool {
        other.cursor_is_within_or_next_to(self.start)
            && other.cursor_is_within_or_next_to(self.end)
    }
}

/// The selection covering `string` if it were inserted at `start`.
pub fn contain_string(start: Cursor, string: &str, newline: &str) -> Selection {
    let lines: Vec<&str> = string.split(newline).collect();

    let end_line_index = start.line_index + lines.len() - 1;
    let end_offset = if lines.len() == 1 {
        start.offset + lines[0].chars().count()
    } else {
        lines[lines.len() - 1].chars().count()
    };

    s2(start, c(end_line_index, end_offset))
}

/// Clamp a selection to valid positions given the line lengths of the
/// current document. Used to re-validate stale selections after edits.
pub fn validate(line_lengths: &[usize], selection: &Selection) -> Selection {
    let clamp = |cursor: Cursor| {
        let line_index = cursor.line_index.min(line_lengths.len().saturating_sub(1));
        let offset = cursor.offset.min(line_lengths[line_index]);

        c(line_index, offset)
    };

    s2(clamp(selection.start), clamp(selection.end))
}

/// Insertion (+1) or deletion (-1) when adjusting for an earlier edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Insert,
    Delete,
}

impl Sign {
    fn factor(self) -> i64 {
        match self {
            Sign::Insert => 1,
            Sign::Delete => -1,
        }
    }
}

/// Adjust `selection` for an insertion or deletion earlier in the document.
///
/// For insertions, `adjustment` is a selection containing the inserted text;
/// for deletions, a selection containing the deleted text. Returns `None` if
/// the adjustment overlaps the selection: an insertion strictly inside it, or
/// a deletion overlapping it at all. An insertion at exactly the selection's
/// start does not invalidate it.
fn add_or_subtract_earlier_selection(
    selection: &Selection,
    adjustment: &Selection,
    sign: Sign,
) -> Option<Selection> {
    let selection = selection.sort();
    let adjustment = adjustment.sort();

    if selection.starts_before(&adjustment) {
        return Some(selection);
    }

    let destructive = match sign {
        Sign::Insert => selection.cursor_is_within(adjustment.start),
        Sign::Delete => selection.is_overlapping(&adjustment),
    };

    if destructive {
        return None;
    }

    let mut new_start_line_index = selection.start.line_index as i64;
    let mut new_start_offset = selection.start.offset as i64;
    let mut new_end_line_index = selection.end.line_index as i64;
    let mut new_end_offset = selection.end.offset as i64;

    // For insertions the shared boundary is the adjustment's first line; for
    // deletions everything after the deleted span lands on its first line, so
    // the boundary to test is the adjustment's last line.
    let lines_overlap = match sign {
        Sign::Insert => adjustment.start.line_index == selection.start.line_index,
        Sign::Delete => adjustment.end.line_index == selection.start.line_index,
    };

    let adjustment_lines =
        (adjustment.end.line_index - adjustment.start.line_index) as i64;

    if adjustment.is_multiline() {
        let adjust_line_index = adjustment_lines * sign.factor();

        new_start_line_index += adjust_line_index;
        new_end_line_index += adjust_line_index;
    }

    if lines_overlap {
        let adjust_offset =
            (adjustment.end.offset as i64 - adjustment.start.offset as i64) * sign.factor();

        new_start_offset += adjust_offset;

        if !selection.is_multiline() {
            new_end_offset += adjust_offset;
        }
    }

    Some(s2(
        c(new_start_line_index as usize, new_start_offset as usize),
        c(new_end_line_index as usize, new_end_offset as usize),
    ))
}

/// Adjust a selection for an insertion earlier in the document.
pub fn add_earlier_selection(
    selection: &Selection,
    add_selection: &Selection,
) -> Option<Selection> {
    add_or_subtract_earlier_selection(selection, add_selection, Sign::Insert)
}

/// Adjust a selection for a deletion earlier in the document.
pub fn subtract_earlier_selection(
    selection: &Selection,
    subtract_selection: &Selection,
) -> Option<Selection> {
    add_or_subtract_earlier_selection(selection, subtract_selection, Sign::Delete)
}

/// Adjust a selection for an edit earlier in the document: first remove the
/// span the edit replaced, then add the span it inserted.
pub fn adjust_for_earlier_edit(
    selection: &Selection,
    old_selection: &Selection,
    new_selection: &Selection,
) -> Option<Selection> {
    let selection = subtract_earlier_selection(selection, old_selection)?;

    add_earlier_selection(&selection, new_selection)
}
