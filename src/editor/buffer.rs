use std::ops::Range;

use ropey::{Rope, RopeSlice};

use super::{KindId, PLACEHOLDER};
use crate::error::{EditorError, Result};

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A text buffer backed by a rope data structure.
///
/// Positions are char offsets. Every placeholder character in the text has
/// one entry in `object_tags`, in text order; the entry is the kind id the
/// placeholder was inserted with, or `None` when it arrived as plain text.
pub struct TextBuffer {
    rope: Rope,
    object_tags: Vec<Option<KindId>>,
    cursor: usize,
    /// Selection anchor; the selection spans anchor..cursor.
    anchor: Option<usize>,
    /// Remembered column for vertical movement (sticky column).
    col_memory: Option<usize>,
    revision: u64,
}

impl TextBuffer {
    /// Create a new buffer from a string. Placeholders in `text` are untagged.
    pub fn from_text(text: &str) -> Self {
        let untagged = text.chars().filter(|&c| c == PLACEHOLDER).count();
        Self {
            rope: Rope::from_str(text),
            object_tags: vec![None; untagged],
            cursor: 0,
            anchor: None,
            col_memory: None,
            revision: 0,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Number of chars in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Incremented on every text mutation.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.len_chars()).then(|| self.rope.char(offset))
    }

    /// The text in `range`, or `None` if the range leaves the buffer.
    pub fn slice(&self, range: Range<usize>) -> Option<String> {
        if range.start > range.end || range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(range).to_string())
    }

    // --- Lines ---

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line containing `offset` (clamped to the buffer).
    pub fn line_of(&self, offset: usize) -> usize {
        self.rope.char_to_line(offset.min(self.len_chars()))
    }

    /// Char offset of the first char of `line`.
    pub fn line_start(&self, line: usize) -> usize {
        self.rope.line_to_char(line.min(self.line_count().saturating_sub(1)))
    }

    /// Length of a line in chars, without its line break.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.rope.line(line);
        slice.len_chars() - line_break_len(slice)
    }

    /// Content of a line without its line break.
    pub fn line_at(&self, line: usize) -> Option<String> {
        if line >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars() - line_break_len(slice);
        Some(slice.slice(..len).to_string())
    }

    /// `(line, column)` of a char offset, columns counted in chars.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.len_chars());
        let line = self.rope.char_to_line(offset);
        (line, offset - self.rope.line_to_char(line))
    }

    // --- Cursor and selection ---

    /// The current cursor offset.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The selected range, if the selection is non-empty.
    pub fn selection(&self) -> Option<Range<usize>> {
        let anchor = self.anchor?;
        match anchor.cmp(&self.cursor) {
            std::cmp::Ordering::Less => Some(anchor..self.cursor),
            std::cmp::Ordering::Greater => Some(self.cursor..anchor),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub const fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Select `range`, leaving the cursor at its end.
    pub fn select(&mut self, range: Range<usize>) {
        let len = self.len_chars();
        self.anchor = Some(range.start.min(len));
        self.cursor = range.end.min(len);
        self.col_memory = None;
    }

    pub fn select_all(&mut self) {
        self.select(0..self.len_chars());
    }

    /// Move the cursor to an absolute offset, optionally extending the selection.
    pub fn move_to(&mut self, offset: usize, extend: bool) {
        self.place_cursor(offset.min(self.len_chars()), extend);
        self.col_memory = None;
    }

    /// Move the cursor in the given direction.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        match direction {
            Direction::Left => {
                let target = match self.selection() {
                    Some(range) if !extend => range.start,
                    _ => self.cursor.saturating_sub(1),
                };
                self.move_to(target, extend);
            }
            Direction::Right => {
                let target = match self.selection() {
                    Some(range) if !extend => range.end,
                    _ => (self.cursor + 1).min(self.len_chars()),
                };
                self.move_to(target, extend);
            }
            Direction::Up => self.move_vertical(-1, extend),
            Direction::Down => self.move_vertical(1, extend),
        }
    }

    /// Move cursor to the beginning of the line (Home).
    pub fn move_home(&mut self, extend: bool) {
        let line = self.line_of(self.cursor);
        self.move_to(self.line_start(line), extend);
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self, extend: bool) {
        let line = self.line_of(self.cursor);
        self.move_to(self.line_start(line) + self.line_len(line), extend);
    }

    /// Move cursor to the start of the buffer (Ctrl+Home).
    pub fn move_to_start(&mut self, extend: bool) {
        self.move_to(0, extend);
    }

    /// Move cursor to the end of the buffer (Ctrl+End).
    pub fn move_to_end(&mut self, extend: bool) {
        self.move_to(self.len_chars(), extend);
    }

    /// Move cursor one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self, extend: bool) {
        let (line, col) = self.line_col(self.cursor);
        if col == 0 {
            if line > 0 {
                let prev = line - 1;
                self.move_to(self.line_start(prev) + self.line_len(prev), extend);
            }
            return;
        }

        let start = self.line_start(line);
        let before: Vec<char> = self.rope.slice(start..self.cursor).chars().collect();
        let trimmed = before
            .iter()
            .rposition(|c| !c.is_whitespace())
            .map_or(0, |i| i + 1);
        if trimmed == 0 {
            self.move_to(start, extend);
            return;
        }
        // Start of the previous word
        let pos = before[..trimmed]
            .iter()
            .rposition(|&c| !is_word_char(c))
            .map_or(0, |i| i + 1);
        self.move_to(start + pos, extend);
    }

    /// Move cursor one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self, extend: bool) {
        let (line, col) = self.line_col(self.cursor);
        let line_len = self.line_len(line);
        if col >= line_len {
            if line + 1 < self.line_count() {
                self.move_to(self.line_start(line + 1), extend);
            }
            return;
        }

        let end = self.line_start(line) + line_len;
        let after: Vec<char> = self.rope.slice(self.cursor..end).chars().collect();
        // Skip current word characters
        let word_end = after
            .iter()
            .position(|&c| !is_word_char(c))
            .unwrap_or(after.len());
        // Skip whitespace/punctuation after word
        let space_end = after[word_end..]
            .iter()
            .position(|&c| is_word_char(c))
            .unwrap_or(after.len() - word_end);
        self.move_to(self.cursor + word_end + space_end, extend);
    }

    // --- Offset-based mutation ---

    /// Insert `text` at `offset`. Placeholders in `text` are untagged.
    ///
    /// Returns the inserted char range.
    pub fn insert_at(&mut self, offset: usize, text: &str) -> Result<Range<usize>> {
        self.check_offset(offset)?;
        let tag_idx = self.tag_index(offset);
        let inserted = text.chars().count();
        let untagged = text.chars().filter(|&c| c == PLACEHOLDER).count();
        for _ in 0..untagged {
            self.object_tags.insert(tag_idx, None);
        }
        self.rope.insert(offset, text);
        self.shift_for_insert(offset, inserted);
        self.revision += 1;
        Ok(offset..offset + inserted)
    }

    /// Insert a placeholder tagged with `kind` at `offset`.
    pub fn insert_object_at(&mut self, offset: usize, kind: KindId) -> Result<()> {
        self.check_offset(offset)?;
        let tag_idx = self.tag_index(offset);
        self.object_tags.insert(tag_idx, Some(kind));
        self.rope.insert_char(offset, PLACEHOLDER);
        self.shift_for_insert(offset, 1);
        self.revision += 1;
        Ok(())
    }

    /// Remove the chars in `range`, returning the removed text.
    pub fn remove(&mut self, range: Range<usize>) -> Result<String> {
        let len = self.len_chars();
        if range.start > range.end || range.end > len {
            return Err(EditorError::OutOfBoundsSelection {
                position: range.end.max(range.start),
                len,
            });
        }
        if range.is_empty() {
            return Ok(String::new());
        }
        let removed = self.rope.slice(range.clone()).to_string();
        let tag_start = self.tag_index(range.start);
        let tag_count = removed.chars().filter(|&c| c == PLACEHOLDER).count();
        self.object_tags.drain(tag_start..tag_start + tag_count);
        self.rope.remove(range.clone());

        let shift = |pos: usize| {
            if pos >= range.end {
                pos - range.len()
            } else {
                pos.min(range.start)
            }
        };
        self.cursor = shift(self.cursor);
        self.anchor = self.anchor.map(shift);
        self.col_memory = None;
        self.revision += 1;
        Ok(removed)
    }

    /// Drop everything from `len` on.
    pub fn truncate(&mut self, len: usize) -> Result<String> {
        let total = self.len_chars();
        if len >= total {
            return Ok(String::new());
        }
        self.remove(len..total)
    }

    // --- Placeholder tags ---

    /// The kind tag of the placeholder at `offset`.
    ///
    /// `None` when `offset` is past the end, the char there is not a
    /// placeholder, or the placeholder is untagged.
    pub fn object_tag_at(&self, offset: usize) -> Option<KindId> {
        if self.char_at(offset)? != PLACEHOLDER {
            return None;
        }
        self.object_tags
            .get(self.tag_index(offset))
            .copied()
            .flatten()
    }

    /// Every placeholder in text order, with its offset and tag.
    pub fn placeholders(&self) -> Vec<(usize, Option<KindId>)> {
        self.rope
            .chars()
            .enumerate()
            .filter(|&(_, c)| c == PLACEHOLDER)
            .map(|(offset, _)| offset)
            .zip(self.object_tags.iter().copied())
            .collect()
    }

    pub fn placeholder_count(&self) -> usize {
        self.object_tags.len()
    }

    // --- Cursor-based editing ---

    /// Insert a character at the cursor, replacing any selection.
    pub fn insert_char(&mut self, ch: char) {
        let mut tmp = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut tmp));
    }

    /// Insert a string at the cursor, replacing any selection.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.delete_selection();
        // The cursor is always inside the buffer.
        let _ = self.insert_at(self.cursor, s);
    }

    /// Split the current line at the cursor (Enter).
    pub fn split_line(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the selection or the character before the cursor (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        self.remove(self.cursor - 1..self.cursor).is_ok()
    }

    /// Delete the selection or the character at the cursor (Delete).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        if self.cursor >= self.len_chars() {
            return false;
        }
        self.remove(self.cursor..self.cursor + 1).is_ok()
    }

    /// Delete the selected text. Returns `true` if there was a selection.
    pub fn delete_selection(&mut self) -> bool {
        let Some(range) = self.selection() else {
            self.anchor = None;
            return false;
        };
        let deleted = self.remove(range).is_ok();
        self.anchor = None;
        deleted
    }

    // --- Private helpers ---

    fn check_offset(&self, offset: usize) -> Result<()> {
        let len = self.len_chars();
        if offset > len {
            return Err(EditorError::OutOfBoundsSelection {
                position: offset,
                len,
            });
        }
        Ok(())
    }

    /// Number of placeholders before `offset`.
    fn tag_index(&self, offset: usize) -> usize {
        self.rope
            .slice(..offset.min(self.len_chars()))
            .chars()
            .filter(|&c| c == PLACEHOLDER)
            .count()
    }

    fn shift_for_insert(&mut self, offset: usize, inserted: usize) {
        if self.cursor >= offset {
            self.cursor += inserted;
        }
        if let Some(anchor) = self.anchor.as_mut() {
            if *anchor >= offset {
                *anchor += inserted;
            }
        }
        self.col_memory = None;
    }

    fn place_cursor(&mut self, offset: usize, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
        self.cursor = offset;
    }

    fn move_vertical(&mut self, delta: isize, extend: bool) {
        let (line, col) = self.line_col(self.cursor);
        let Some(target) = line.checked_add_signed(delta) else {
            return;
        };
        if target >= self.line_count() {
            return;
        }
        let wanted = self.col_memory.unwrap_or(col);
        let offset = self.line_start(target) + wanted.min(self.line_len(target));
        self.place_cursor(offset, extend);
        self.col_memory = Some(wanted);
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Number of chars in the line break ending `line`.
fn line_break_len(line: RopeSlice<'_>) -> usize {
    let len = line.len_chars();
    if len == 0 {
        return 0;
    }
    match line.char(len - 1) {
        '\n' if len >= 2 && line.char(len - 2) == '\r' => 2,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => 1,
        _ => 0,
    }
}

impl std::fmt::Debug for TextBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextBuffer")
            .field(
                "rope",
                &format_args!("Rope({} chars)", self.rope.len_chars()),
            )
            .field("object_tags", &self.object_tags)
            .field("cursor", &self.cursor)
            .field("anchor", &self.anchor)
            .field("revision", &self.revision)
            .finish()
    }
}
