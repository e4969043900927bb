//! Event handling for the furrow TUI.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Mouse wheel scrolled; positive is down.
    Scroll(i8),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling is blocking, keep it off the runtime
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        if let Some(e) = translate(evt) {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, blocking until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

fn translate(evt: CrosstermEvent) -> Option<Event> {
    use crossterm::event::MouseEventKind;

    match evt {
        CrosstermEvent::Key(key) if key.kind == event::KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(Event::Scroll(-1)),
            MouseEventKind::ScrollDown => Some(Event::Scroll(1)),
            _ => None,
        },
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    Back,
    Submit,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    None,
}

/// Convert a key event to an action.
///
/// Text editing keys are consumed by the input before this is consulted.
pub fn key_to_action(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match key.code {
        KeyCode::F(1) => Action::Help,
        KeyCode::Esc => Action::Back,
        KeyCode::Enter => Action::Submit,
        KeyCode::Up => Action::ScrollUp,
        KeyCode::Down => Action::ScrollDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(event), Action::Quit);
    }

    #[test]
    fn test_plain_chars_are_not_actions() {
        // 'q' is text, not a shortcut, since the input always has focus
        assert_eq!(key_to_action(key(KeyCode::Char('q'))), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Char('c'))), Action::None);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Submit);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Back);
        assert_eq!(key_to_action(key(KeyCode::F(1))), Action::Help);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::ScrollDown);
    }
}
