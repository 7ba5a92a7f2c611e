//! Keyboard navigation over the suggestion list
//!
//! Pure mapping from `(key, list length, active index)` to what should happen.
//! The controller applies the result; nothing here touches state.

/// Keys the navigator reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Escape,
    Other,
}

/// Outcome of a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Highlight the item at this index
    Move(usize),
    /// Select the item at this index
    Commit(usize),
    /// Close the dropdown, leaving the input text alone
    Close,
    /// Not ours; let the key through
    Ignore,
}

impl Navigation {
    /// Whether the presentation must suppress the key's default action
    /// (caret movement, form submit)
    pub fn prevent_default(&self, key: Key) -> bool {
        match key {
            Key::Up | Key::Down | Key::Escape => true,
            Key::Enter => matches!(self, Navigation::Commit(_)),
            Key::Other => false,
        }
    }
}

/// Wrap-around list navigation
pub fn navigate(key: Key, len: usize, active: Option<usize>) -> Navigation {
    match key {
        Key::Down => {
            if len == 0 {
                return Navigation::Ignore;
            }
            match active {
                Some(index) if index + 1 < len => Navigation::Move(index + 1),
                _ => Navigation::Move(0),
            }
        }
        Key::Up => {
            if len == 0 {
                return Navigation::Ignore;
            }
            match active {
                Some(index) if index > 0 => Navigation::Move(index - 1),
                _ => Navigation::Move(len - 1),
            }
        }
        Key::Enter => match active {
            Some(index) if index < len => Navigation::Commit(index),
            _ => Navigation::Ignore,
        },
        Key::Escape => Navigation::Close,
        Key::Other => Navigation::Ignore,
    }
}
