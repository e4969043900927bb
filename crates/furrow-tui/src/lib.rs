//! furrow-tui: Terminal UI for the Farm Budget Planner chat
//!
//! This crate provides the TUI layer for furrow:
//! - Application state wrapping a [`furrow_engine::ChatSession`]
//! - Transcript and input bar widgets
//! - The terminal event loop

mod app;
mod event;
mod input;
#[cfg(test)]
pub mod test_utils;
mod theme;
mod ui;
pub mod widgets;

pub use app::App;
pub use event::{Action, Event, EventHandler};
pub use furrow_engine;
pub use input::TextInputState;
pub use theme::Theme;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use furrow_engine::Config;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tracing::info;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// This is the main entry point for the TUI. It sets up the terminal,
/// runs the event loop, and restores the terminal on exit.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal with RAII guard for cleanup
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let theme = Theme::detect(std::env::var("COLORTERM").ok().as_deref());
    let mut app = App::new(config, theme);
    info!(
        session = %app.session.conversation().id(),
        policy = %config.concurrency,
        "Starting TUI"
    );

    let mut events = EventHandler::new(config.tick_rate_ms);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.sync();

        let size = terminal.size()?;
        let area = ratatui::layout::Rect::new(0, 0, size.width, size.height);
        app.clamp_scroll(ui::max_transcript_scroll(app, area));

        terminal.draw(|frame| {
            let area = frame.area();
            ui::render(app, area, frame.buffer_mut());
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => {
                    if !app.handle_input_key(key) {
                        app.handle_action(event::key_to_action(key));
                    }
                }
                Event::Scroll(delta) => {
                    if delta < 0 {
                        app.handle_action(Action::ScrollUp);
                    } else {
                        app.handle_action(Action::ScrollDown);
                    }
                }
                Event::Tick => app.tick(),
                Event::Resize(_, _) => {
                    // Terminal will handle resize automatically
                }
            }
        }

        if app.should_quit {
            info!("Quitting TUI");
            break;
        }
    }

    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}


/// End-to-end flows driven through actions, the way the event loop does.
#[cfg(test)]
mod flow_tests {
    use crate::test_utils::{create_test_app, render_app_to_string};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Duration;

    fn press(app: &mut crate::App, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        if !app.handle_input_key(key) {
            app.handle_action(crate::event::key_to_action(key));
        }
    }

    fn type_line(app: &mut crate::App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
        press(app, KeyCode::Enter);
    }

    #[tokio::test(start_paused = true)]
    async fn test_corn_budget_flow() {
        let mut app = create_test_app();
        assert_eq!(app.session.messages().len(), 1);

        type_line(&mut app, "What is my corn budget?");
        assert_eq!(app.session.messages().len(), 2);
        assert!(app.session.is_pending());
        assert!(render_app_to_string(&app).contains("Thinking..."));

        tokio::time::sleep(Duration::from_millis(1001)).await;
        tokio::task::yield_now().await;
        app.tick();

        assert_eq!(app.session.messages().len(), 3);
        assert!(!app.session.is_pending());
        let screen = render_app_to_string(&app);
        assert!(!screen.contains("Thinking..."));
        assert!(screen.contains("I understand you're asking about"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaces_only_flow() {
        let mut app = create_test_app();
        type_line(&mut app, "   ");
        assert_eq!(app.session.messages().len(), 1);
        assert!(!app.session.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_recall_after_submit() {
        let mut app = create_test_app();
        type_line(&mut app, "hay prices");
        app.session.settle().await;
        type_line(&mut app, "diesel costs");
        app.session.settle().await;
        app.sync();

        press(&mut app, KeyCode::Up);
        assert_eq!(app.input.content(), "diesel costs");

        press(&mut app, KeyCode::Up);
        assert_eq!(app.input.content(), "hay prices");
        assert_eq!(app.transcript_scroll, 0);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.input.content(), "diesel costs");

        press(&mut app, KeyCode::Down);
        assert!(app.input.is_empty());
        assert!(!app.input.is_browsing());

        // The restored live input is empty, so Up recalls again
        press(&mut app, KeyCode::Up);
        assert_eq!(app.input.content(), "diesel costs");
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = create_test_app();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(!app.handle_input_key(key));
        app.handle_action(crate::event::key_to_action(key));
        assert!(app.should_quit);
    }
}
