//! Text input state for the question field.
//!
//! The cursor is a character index, not a byte offset, so editing works
//! with non-ASCII text.

/// State for a text input, managing content and cursor position.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    /// Cursor position (character index).
    pub cursor: usize,
    /// Previously submitted entries, oldest first.
    history: Vec<String>,
    /// Position while browsing history; `None` means editing the live input.
    history_index: Option<usize>,
    /// Live input saved while browsing history.
    saved_input: String,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether a history entry is currently shown in place of the live input.
    pub fn is_browsing(&self) -> bool {
        self.history_index.is_some()
    }

    /// Number of characters.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
        // Editing a recalled entry makes it the live input
        self.history_index = None;
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
        self.history_index = None;
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
            self.history_index = None;
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
            self.history_index = None;
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Record the current content in history and clear the field.
    ///
    /// Called only once the session has accepted the submission.
    pub fn commit(&mut self) {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() {
            self.history.push(content);
        }
        self.history_index = None;
        self.saved_input.clear();
    }

    /// Navigate to the previous history entry.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let next = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                0
            }
            Some(i) if i + 1 < self.history.len() => i + 1,
            Some(_) => return,
        };

        self.history_index = Some(next);
        self.content = self.history[self.history.len() - 1 - next].clone();
        self.move_end();
    }

    /// Navigate to the next history entry, or back to the live input.
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                self.content = std::mem::take(&mut self.saved_input);
                self.move_end();
            }
            Some(i) => {
                self.history_index = Some(i - 1);
                self.content = self.history[self.history.len() - i].clone();
                self.move_end();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_state_basic() {
        let mut state = TextInputState::new();
        assert!(state.is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor, 2);

        state.backspace();
        assert_eq!(state.content(), "H");

        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_text_input_state_cursor_movement() {
        let mut state = TextInputState::new();
        state.insert_str("Hello");

        state.move_left();
        state.move_left();
        assert_eq!(state.cursor, 3);

        state.insert('X');
        assert_eq!(state.content(), "HelXlo");

        state.move_home();
        assert_eq!(state.cursor, 0);
        state.delete();
        assert_eq!(state.content(), "elXlo");

        state.move_end();
        assert_eq!(state.cursor, 5);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut state = TextInputState::new();
        state.insert_str("maïs €");
        assert_eq!(state.cursor, 6);

        state.backspace();
        assert_eq!(state.content(), "maïs ");

        state.move_home();
        state.move_right();
        state.move_right();
        state.delete();
        assert_eq!(state.content(), "mas ");
    }

    #[test]
    fn test_text_input_state_history() {
        let mut state = TextInputState::new();

        state.insert_str("first");
        state.commit();
        assert!(state.is_empty());

        state.insert_str("second");
        state.commit();

        state.insert_str("draft");
        assert!(!state.is_browsing());
        state.history_prev();
        assert_eq!(state.content(), "second");
        assert!(state.is_browsing());

        state.history_prev();
        assert_eq!(state.content(), "first");

        // Already at oldest
        state.history_prev();
        assert_eq!(state.content(), "first");

        state.history_next();
        assert_eq!(state.content(), "second");

        state.history_next();
        assert_eq!(state.content(), "draft");
        assert!(!state.is_browsing());
    }

    #[test]
    fn test_editing_recalled_entry_stops_browsing() {
        let mut state = TextInputState::new();
        state.insert_str("wheat");
        state.commit();

        state.history_prev();
        assert!(state.is_browsing());
        state.insert('s');
        assert!(!state.is_browsing());
        assert_eq!(state.content(), "wheats");
    }

    #[test]
    fn test_blank_commit_not_in_history() {
        let mut state = TextInputState::new();
        state.insert_str("   ");
        state.commit();
        state.history_prev();
        assert!(state.is_empty());
    }
}
