//! Transcript widget.
//!
//! Renders every message in conversation order. User messages are
//! right-aligned in green, assistant messages left-aligned. While a reply is
//! pending a spinner line follows the last message.
//!
//! ```text
//! ┌─ Conversation ──────────────────────────┐
//! │ Assistant                                │
//! │ Hello! I'm your Farm Budget Planning...  │
//! │                                          │
//! │                                      You │
//! │                  What is my corn budget? │
//! │                                          │
//! │ / Thinking...                            │
//! └──────────────────────────────────────────┘
//! ```

use furrow_engine::{Message, Role};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::{Theme, SPINNER};

/// Scrollable transcript of the conversation.
pub struct TranscriptWidget<'a> {
    messages: &'a [Message],
    theme: &'a Theme,
    pending: bool,
    tick: usize,
    scroll_from_bottom: usize,
}

impl<'a> TranscriptWidget<'a> {
    /// Create a transcript over `messages`.
    pub fn new(messages: &'a [Message], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            pending: false,
            tick: 0,
            scroll_from_bottom: 0,
        }
    }

    /// Show the loading indicator, animated by `tick`.
    #[must_use]
    pub fn pending(mut self, pending: bool, tick: usize) -> Self {
        self.pending = pending;
        self.tick = tick;
        self
    }

    /// Lines scrolled up from the bottom (0 = newest visible).
    #[must_use]
    pub fn scroll_from_bottom(mut self, lines: usize) -> Self {
        self.scroll_from_bottom = lines;
        self
    }

    /// Build the wrapped display lines for the given content width.
    pub fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        // Leave room so user bubbles never touch the left edge
        let wrap_width = (width.saturating_sub(2)).max(1);
        let mut lines = Vec::new();

        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }

            let (label, label_style, body_style, alignment) = match message.role {
                Role::User => (
                    "You",
                    Style::default()
                        .fg(self.theme.primary)
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(self.theme.primary_dim),
                    Alignment::Right,
                ),
                Role::Assistant => (
                    "Assistant",
                    Style::default()
                        .fg(self.theme.muted)
                        .add_modifier(Modifier::BOLD),
                    Style::default().fg(self.theme.text),
                    Alignment::Left,
                ),
            };

            lines.push(Line::from(Span::styled(label, label_style)).alignment(alignment));

            for text in wrap_preserving(&message.content, wrap_width) {
                lines.push(Line::from(Span::styled(text, body_style)).alignment(alignment));
            }
        }

        if self.pending {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            let frame = SPINNER[self.tick % SPINNER.len()];
            lines.push(Line::from(vec![
                Span::styled(frame, Style::default().fg(self.theme.primary)),
                Span::styled(" Thinking...", Style::default().fg(self.theme.muted)),
            ]));
        }

        lines
    }
}

/// Wrap text to `width`, keeping explicit newlines, blank lines and leading
/// indentation.
pub fn wrap_preserving(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.split('\n') {
        if raw.trim().is_empty() {
            out.push(raw.to_string());
            continue;
        }
        let indent_len = raw.len() - raw.trim_start().len();
        let options = textwrap::Options::new(width).initial_indent(&raw[..indent_len]);
        out.extend(
            textwrap::wrap(raw.trim_start(), options)
                .into_iter()
                .map(std::borrow::Cow::into_owned),
        );
    }
    out
}

#[allow(clippy::cast_possible_truncation)]
impl Widget for TranscriptWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Conversation ")
            .title_style(Style::default().fg(self.theme.text))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border))
            .style(Style::default().bg(self.theme.base));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let lines = self.build_lines(inner.width as usize);
        let visible = inner.height as usize;
        let max_offset = lines.len().saturating_sub(visible);
        let offset = max_offset.saturating_sub(self.scroll_from_bottom);

        Paragraph::new(lines)
            .scroll((offset.min(u16::MAX as usize) as u16, 0))
            .render(inner, buf);
    }
}
