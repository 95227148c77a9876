//! Single-line text editing state
//!
//! All positions are CHAR indices, never byte indices, so multi-byte input
//! (umlauts, emoji) cannot split a code point. The gpui text field wraps this
//! type; everything here is plain data and unit-testable.

/// Count the number of Unicode scalar values (chars) in a string.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Convert a character index (0..=char_len) into a byte index (0..=s.len()).
/// If char_idx is past the end, returns s.len().
pub(crate) fn byte_idx_from_char_idx(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(byte_idx, _)| byte_idx)
        .unwrap_or(s.len())
}

/// Slice a &str by char indices [start_char, end_char).
pub(crate) fn slice_by_char_range(s: &str, start_char: usize, end_char: usize) -> &str {
    let start_b = byte_idx_from_char_idx(s, start_char);
    let end_b = byte_idx_from_char_idx(s, end_char.max(start_char));
    &s[start_b..end_b]
}

/// First `max` chars of `s`
fn truncate_chars(s: &str, max: usize) -> &str {
    &s[..byte_idx_from_char_idx(s, max)]
}

/// Editing state of one text field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    /// Cursor (char index, 0..=len)
    cursor: usize,
    /// Selection anchor (char index). None = no selection.
    anchor: Option<usize>,
    /// Upper bound on the char count, None = unlimited
    max_chars: Option<usize>,
}

impl TextBuffer {
    /// Create a buffer with the cursor at the end. An initial value longer
    /// than `max_chars` is truncated.
    pub fn new(initial: &str, max_chars: Option<usize>) -> Self {
        let text = match max_chars {
            Some(max) => truncate_chars(initial, max).to_string(),
            None => initial.to_string(),
        };
        let cursor = char_len(&text);
        Self {
            text,
            cursor,
            anchor: None,
            max_chars,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    pub fn len_chars(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole value, cursor to the end
    pub fn set_text(&mut self, text: &str) {
        *self = Self::new(text, self.max_chars);
    }

    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|a| a != self.cursor)
    }

    /// Ordered selection bounds
    pub fn selection_range(&self) -> Option<(usize, usize)> {
        self.anchor
            .filter(|&a| a != self.cursor)
            .map(|a| (a.min(self.cursor), a.max(self.cursor)))
    }

    pub fn selected_text(&self) -> &str {
        match self.selection_range() {
            Some((start, end)) => slice_by_char_range(&self.text, start, end),
            None => "",
        }
    }

    pub fn select_all(&mut self) {
        self.anchor = Some(0);
        self.cursor = self.len_chars();
    }

    /// Text before and after the cursor, for rendering the caret
    pub fn split_at_cursor(&self) -> (&str, &str) {
        let idx = byte_idx_from_char_idx(&self.text, self.cursor);
        self.text.split_at(idx)
    }

    /// Remove the selected text. Returns false when nothing was selected.
    pub fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection_range() else {
            self.anchor = None;
            return false;
        };
        let start_b = byte_idx_from_char_idx(&self.text, start);
        let end_b = byte_idx_from_char_idx(&self.text, end);
        self.text.drain(start_b..end_b);
        self.cursor = start;
        self.anchor = None;
        true
    }

    /// Remove and return the selected text
    pub fn cut(&mut self) -> String {
        let taken = self.selected_text().to_string();
        self.delete_selection();
        taken
    }

    /// Insert at the cursor, replacing any selection. Input that would push
    /// the buffer past `max_chars` is cut to fit. Control characters are
    /// dropped. Returns the number of chars inserted.
    pub fn insert(&mut self, input: &str) -> usize {
        let cleaned: String = input.chars().filter(|c| !c.is_control()).collect();
        if cleaned.is_empty() {
            return 0;
        }
        self.delete_selection();

        let room = match self.max_chars {
            Some(max) => max.saturating_sub(self.len_chars()),
            None => usize::MAX,
        };
        let fitted = truncate_chars(&cleaned, room);
        if fitted.is_empty() {
            return 0;
        }

        let at = byte_idx_from_char_idx(&self.text, self.cursor);
        self.text.insert_str(at, fitted);
        let inserted = char_len(fitted);
        self.cursor += inserted;
        inserted
    }

    fn begin_move(&mut self, extend_selection: bool) {
        if extend_selection {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
    }

    pub fn move_left(&mut self, extend_selection: bool) {
        if !extend_selection {
            if let Some((start, _)) = self.selection_range() {
                self.cursor = start;
                self.anchor = None;
                return;
            }
        }
        self.begin_move(extend_selection);
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self, extend_selection: bool) {
        if !extend_selection {
            if let Some((_, end)) = self.selection_range() {
                self.cursor = end;
                self.anchor = None;
                return;
            }
        }
        self.begin_move(extend_selection);
        self.cursor = (self.cursor + 1).min(self.len_chars());
    }

    pub fn move_home(&mut self, extend_selection: bool) {
        self.begin_move(extend_selection);
        self.cursor = 0;
    }

    pub fn move_end(&mut self, extend_selection: bool) {
        self.begin_move(extend_selection);
        self.cursor = self.len_chars();
    }

    pub fn backspace(&mut self) {
        if self.delete_selection() || self.cursor == 0 {
            return;
        }
        self.anchor = Some(self.cursor - 1);
        self.delete_selection();
    }

    pub fn delete_forward(&mut self) {
        if self.delete_selection() || self.cursor >= self.len_chars() {
            return;
        }
        self.anchor = Some(self.cursor + 1);
        self.delete_selection();
    }

    /// Apply one decoded key. Clipboard commands are left to the caller,
    /// which owns the platform clipboard.
    pub fn apply(&mut self, edit: &EditKey) {
        match edit {
            EditKey::SelectAll => self.select_all(),
            EditKey::Left { extend } => self.move_left(*extend),
            EditKey::Right { extend } => self.move_right(*extend),
            EditKey::Home { extend } => self.move_home(*extend),
            EditKey::End { extend } => self.move_end(*extend),
            EditKey::Backspace => self.backspace(),
            EditKey::Delete => self.delete_forward(),
            EditKey::Insert(text) => {
                self.insert(text);
            }
            EditKey::Copy | EditKey::Cut | EditKey::Paste => {}
        }
    }
}

/// Editing command decoded from a keystroke
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKey {
    SelectAll,
    Copy,
    Cut,
    Paste,
    Left { extend: bool },
    Right { extend: bool },
    Home { extend: bool },
    End { extend: bool },
    Backspace,
    Delete,
    Insert(String),
}

impl EditKey {
    /// Decode a keystroke. `command` is Cmd on macOS and Ctrl elsewhere.
    /// Returns None for keys a text field ignores.
    pub fn from_keystroke(
        key: &str,
        key_char: Option<&str>,
        command: bool,
        shift: bool,
    ) -> Option<Self> {
        let key = key.to_lowercase();
        let edit = match (key.as_str(), command) {
            ("a", true) => Self::SelectAll,
            ("c", true) => Self::Copy,
            ("x", true) => Self::Cut,
            ("v", true) => Self::Paste,
            ("left" | "arrowleft", false) => Self::Left { extend: shift },
            ("right" | "arrowright", false) => Self::Right { extend: shift },
            ("home", false) => Self::Home { extend: shift },
            ("end", false) => Self::End { extend: shift },
            ("backspace", false) => Self::Backspace,
            ("delete", false) => Self::Delete,
            (_, false) => {
                let text = key_char?;
                if text.is_empty() || text.chars().all(char::is_control) {
                    return None;
                }
                Self::Insert(text.to_string())
            }
            _ => return None,
        };
        Some(edit)
    }
}

#[cfg(test)]
#[path = "text_buffer_tests.rs"]
mod tests;
