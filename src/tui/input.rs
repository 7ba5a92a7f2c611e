//! Input field editing
//!
//! Emacs-style line editing for the search field. The cursor is a character
//! index, so multi-byte input never splits a code point.

/// Editing operations on the search field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOperation {
    InsertChar(char),
    MoveCursorToStart,
    MoveCursorToEnd,
    MoveCursorLeft,
    MoveCursorRight,
    DeleteCharForward,
    DeleteCharBackward,
    KillLine,
    Yank,
}

/// Text, cursor and kill ring of the search field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    cursor: usize,
    kill_ring: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents (e.g. after a selection), cursor at the end
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_len();
    }

    /// Apply `operation`; returns true if the text changed
    pub fn apply(&mut self, operation: InputOperation) -> bool {
        match operation {
            InputOperation::InsertChar(c) => {
                let at = self.byte_offset(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
                true
            }
            InputOperation::MoveCursorToStart => {
                self.cursor = 0;
                false
            }
            InputOperation::MoveCursorToEnd => {
                self.cursor = self.char_len();
                false
            }
            InputOperation::MoveCursorLeft => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            InputOperation::MoveCursorRight => {
                if self.cursor < self.char_len() {
                    self.cursor += 1;
                }
                false
            }
            InputOperation::DeleteCharForward => {
                if self.cursor < self.char_len() {
                    let at = self.byte_offset(self.cursor);
                    self.text.remove(at);
                    true
                } else {
                    false
                }
            }
            InputOperation::DeleteCharBackward => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.text.remove(at);
                    true
                } else {
                    false
                }
            }
            InputOperation::KillLine => {
                let at = self.byte_offset(self.cursor);
                if at < self.text.len() {
                    self.kill_ring = self.text.split_off(at);
                    true
                } else {
                    false
                }
            }
            InputOperation::Yank => {
                if self.kill_ring.is_empty() {
                    return false;
                }
                let at = self.byte_offset(self.cursor);
                self.text.insert_str(at, &self.kill_ring);
                self.cursor += self.kill_ring.chars().count();
                true
            }
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(offset, _)| offset)
    }
}
