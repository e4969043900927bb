//! Screen layout and rendering.
//!
//! ```text
//!            Farm Budget Planner
//! ┌─ Conversation ──────────────────────────┐
//! │ ...                                      │
//! └──────────────────────────────────────────┘
//! ┌─ Enter to send ─────────────────────────┐
//! │ > Ask about farm budgeting...            │
//! └──────────────────────────────────────────┘
//!  Enter send · Ctrl+J newline · Esc quit · F1 help
//!  Farm Budget Planner AI Assistant - For demonstration purposes
//! ```

use crate::app::App;
use crate::widgets::{InputBar, TranscriptWidget};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Title shown above the transcript.
pub const TITLE: &str = "Farm Budget Planner";

/// Footer disclaimer.
pub const FOOTER: &str = "Farm Budget Planner AI Assistant - For demonstration purposes";

/// Tallest the input bar grows, borders included.
const MAX_INPUT_HEIGHT: u16 = 7;

/// Screen regions.
struct Regions {
    header: Rect,
    transcript: Rect,
    input: Rect,
    hints: Rect,
    footer: Rect,
}

#[allow(clippy::cast_possible_truncation)]
fn regions(app: &App, area: Rect) -> Regions {
    let input_lines = app.input.content().split('\n').count();
    let input_height = input_lines
        .saturating_add(2)
        .clamp(3, MAX_INPUT_HEIGHT as usize) as u16;

    let [header, transcript, input, hints, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(input_height),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    Regions {
        header,
        transcript,
        input,
        hints,
        footer,
    }
}

/// How far the transcript can scroll up for the given screen size.
pub fn max_transcript_scroll(app: &App, area: Rect) -> usize {
    let transcript = regions(app, area).transcript;
    let inner_width = transcript.width.saturating_sub(2) as usize;
    let inner_height = transcript.height.saturating_sub(2) as usize;
    let lines = transcript_widget(app).build_lines(inner_width).len();
    lines.saturating_sub(inner_height)
}

fn transcript_widget(app: &App) -> TranscriptWidget<'_> {
    TranscriptWidget::new(app.session.messages(), &app.theme)
        .pending(app.session.is_pending(), app.tick)
        .scroll_from_bottom(app.transcript_scroll)
}

/// Render the whole screen.
pub fn render(app: &App, area: Rect, buf: &mut Buffer) {
    let regions = regions(app, area);

    Paragraph::new(Line::from(Span::styled(
        TITLE,
        Style::default()
            .fg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )))
    .centered()
    .render(regions.header, buf);

    transcript_widget(app).render(regions.transcript, buf);

    InputBar::new(&app.input, &app.theme)
        .focused(!app.show_help)
        .disabled(!app.can_submit(), Some(app.session.producer_name()))
        .render(regions.input, buf);

    let hints = match &app.notification {
        Some(message) => Line::from(Span::styled(
            message.clone(),
            Style::default().fg(app.theme.primary_dim),
        )),
        None => {
            let esc = if app.session.is_pending() {
                "Esc cancel"
            } else {
                "Esc quit"
            };
            Line::from(Span::styled(
                format!("Enter send · Ctrl+J newline · {esc} · F1 help"),
                Style::default().fg(app.theme.muted),
            ))
        }
    };
    Paragraph::new(hints).render(regions.hints, buf);

    Paragraph::new(Line::from(Span::styled(
        FOOTER,
        Style::default().fg(app.theme.muted),
    )))
    .centered()
    .render(regions.footer, buf);

    if app.show_help {
        render_help_overlay(app, area, buf);
    }
}

/// Render the key binding overlay in the middle of the screen.
pub fn render_help_overlay(app: &App, area: Rect, buf: &mut Buffer) {
    const BINDINGS: [(&str, &str); 7] = [
        ("Enter", "Send question"),
        ("Ctrl+J", "Insert newline"),
        ("Up/Down", "History (empty input) or scroll"),
        ("PgUp/PgDn", "Scroll transcript"),
        ("Esc", "Cancel pending reply, or quit"),
        ("Ctrl+C", "Quit"),
        ("F1", "Toggle this help"),
    ];

    let width = 48.min(area.width);
    let height = 12.min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    Clear.render(popup, buf);

    let lines: Vec<Line<'_>> = BINDINGS
        .iter()
        .map(|(key, what)| {
            Line::from(vec![
                Span::styled(
                    format!("{key:>10}  "),
                    Style::default().fg(app.theme.primary),
                ),
                Span::styled(*what, Style::default().fg(app.theme.text)),
            ])
        })
        .collect();

    Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border_focused))
                .style(Style::default().bg(app.theme.base)),
        )
        .render(popup, buf);
}
