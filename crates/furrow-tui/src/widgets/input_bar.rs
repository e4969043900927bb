//! Full-width input bar widget.
//!
//! Always visible at the bottom of the screen for text entry.
//! Supports multi-line input with Ctrl+J for newlines. While a reply is
//! pending and new submissions are refused, the bar shows a waiting notice in
//! its title and dims its border; typing still works.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::input::TextInputState;
use crate::theme::Theme;

/// Placeholder shown when the input is empty.
pub const PLACEHOLDER: &str = "Ask about farm budgeting...";

/// Full-width input bar for text entry.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    theme: &'a Theme,
    focused: bool,
    disabled: bool,
    waiting_on: Option<&'a str>,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            input,
            theme,
            focused: false,
            disabled: false,
            waiting_on: None,
        }
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Disable submission, naming what the bar is waiting for.
    #[must_use]
    pub fn disabled(mut self, disabled: bool, waiting_on: Option<&'a str>) -> Self {
        self.disabled = disabled;
        self.waiting_on = waiting_on;
        self
    }

    /// Build Lines for multi-line input display.
    /// Returns the lines to display, the cursor line and its display column.
    fn build_input_lines(&self) -> (Vec<Line<'static>>, usize, usize) {
        let content = self.input.content();
        let cursor_pos = self.input.cursor;

        if content.is_empty() {
            let mut spans = vec![Span::styled("> ", Style::default().fg(self.theme.primary))];
            if self.focused {
                spans.push(Span::raw("█"));
            }
            spans.push(Span::styled(
                PLACEHOLDER,
                Style::default().fg(self.theme.muted),
            ));
            return (vec![Line::from(spans)], 0, 2);
        }

        let text_lines: Vec<&str> = content.split('\n').collect();

        // Locate the cursor
        let mut char_count = 0;
        let mut cursor_line = 0;
        let mut cursor_col = 0;
        for (line_idx, line) in text_lines.iter().enumerate() {
            let line_len = line.chars().count();
            if cursor_pos <= char_count + line_len {
                cursor_line = line_idx;
                cursor_col = cursor_pos - char_count;
                break;
            }
            // +1 for the newline character
            char_count += line_len + 1;
        }

        let mut lines = Vec::with_capacity(text_lines.len());
        let mut cursor_x = 2;

        for (line_idx, line_text) in text_lines.iter().enumerate() {
            let prefix = if line_idx == 0 { "> " } else { "  " };
            let mut spans = vec![Span::styled(
                prefix.to_string(),
                Style::default().fg(self.theme.primary),
            )];

            if self.focused && line_idx == cursor_line {
                let chars: Vec<char> = line_text.chars().collect();
                let before: String = chars[..cursor_col].iter().collect();
                let after: String = chars[cursor_col..].iter().collect();
                cursor_x = prefix.len() + before.width();
                spans.push(Span::raw(before));
                spans.push(Span::raw("█"));
                spans.push(Span::raw(after));
            } else {
                spans.push(Span::raw((*line_text).to_string()));
            }
            lines.push(Line::from(spans));
        }

        (lines, cursor_line, cursor_x)
    }
}

#[allow(clippy::cast_possible_truncation)]
impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.disabled {
            Style::default().fg(self.theme.muted)
        } else if self.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };

        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);

        if self.disabled {
            let who = self.waiting_on.unwrap_or("reply");
            block = block
                .title(format!(" ● Waiting for {who}... "))
                .title_style(Style::default().fg(self.theme.muted));
        } else {
            block = block
                .title(" Enter to send ")
                .title_style(Style::default().fg(self.theme.muted));
        }

        let inner_height = area.height.saturating_sub(2) as usize;
        let inner_width = area.width.saturating_sub(2) as usize;

        let (lines, cursor_line, cursor_x) = self.build_input_lines();

        // Keep the cursor visible in both directions
        let scroll_y = if lines.len() <= inner_height {
            0
        } else {
            cursor_line.saturating_sub(inner_height.saturating_sub(1))
        };
        let scroll_x = (cursor_x + 1).saturating_sub(inner_width);

        Paragraph::new(lines)
            .block(block)
            .style(Style::default().fg(self.theme.text))
            .scroll((
                scroll_y.min(u16::MAX as usize) as u16,
                scroll_x.min(u16::MAX as usize) as u16,
            ))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::render_widget_to_string;

    #[test]
    fn test_input_bar_creation() {
        let input = TextInputState::new();
        let theme = Theme::default();
        let bar = InputBar::new(&input, &theme).focused(true);
        assert!(bar.focused);
    }

    #[test]
    fn test_placeholder_when_empty() {
        let input = TextInputState::new();
        let theme = Theme::default();
        let content = render_widget_to_string(InputBar::new(&input, &theme), 50, 3);
        assert!(content.contains(PLACEHOLDER));
        assert!(content.contains("Enter to send"));
    }

    #[test]
    fn test_disabled_shows_waiting_notice_and_keeps_text() {
        let mut input = TextInputState::new();
        input.insert_str("next question");
        let theme = Theme::default();
        let content = render_widget_to_string(
            InputBar::new(&input, &theme)
                .focused(true)
                .disabled(true, Some("assistant")),
            50,
            3,
        );
        assert!(content.contains("Waiting for assistant..."));
        assert!(content.contains("next question"));
    }

    #[test]
    fn test_multiline_input_renders_each_line() {
        let mut input = TextInputState::new();
        input.insert_str("seed\nfuel");
        let theme = Theme::default();
        let content = render_widget_to_string(InputBar::new(&input, &theme), 30, 4);
        assert!(content.contains("> seed"));
        assert!(content.contains("  fuel"));
    }
}
