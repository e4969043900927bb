//! Application state and update logic for the furrow TUI.

use crate::event::Action;
use crate::input::TextInputState;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use furrow_engine::{ChatSession, Config, SubmitError, Submission};
use tracing::debug;

/// Lines moved by one PageUp/PageDown.
const PAGE_LINES: usize = 10;

/// Ticks a notification stays on screen.
const NOTIFICATION_TICKS: usize = 12;

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// The conversation and its outstanding replies.
    pub session: ChatSession,

    /// Question being typed.
    pub input: TextInputState,

    /// Color palette.
    pub theme: Theme,

    /// Lines the transcript is scrolled up from the newest message.
    pub transcript_scroll: usize,

    /// Tick counter for animations.
    pub tick: usize,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    /// Conversation revision last shown.
    seen_revision: u64,
}

impl App {
    /// Create a new app instance.
    pub fn new(config: &Config, theme: Theme) -> Self {
        let session = ChatSession::from_config(config);
        let seen_revision = session.conversation().revision();
        Self {
            should_quit: false,
            show_help: false,
            session,
            input: TextInputState::new(),
            theme,
            transcript_scroll: 0,
            tick: 0,
            notification: None,
            notification_ttl: 0,
            seen_revision,
        }
    }

    /// Create an app with default configuration, for tests.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self::new(&Config::default(), Theme::default())
    }

    /// Advance animations and apply any replies that have arrived.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }

        self.sync();
    }

    /// Apply arrived replies and follow the transcript when it changed.
    pub fn sync(&mut self) {
        self.session.poll_replies();
        let revision = self.session.conversation().revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.transcript_scroll = 0;
        }
    }

    /// Show a transient notification.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(message.into());
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Whether the submit affordance is enabled.
    pub fn can_submit(&self) -> bool {
        self.session.accepts_input()
    }

    /// Submit the current input to the session.
    ///
    /// The input is cleared only when the session accepted it.
    pub fn submit_input(&mut self) {
        if !self.can_submit() {
            // Affordance disabled; keep the draft
            return;
        }

        match self.session.submit(self.input.content()) {
            Ok(Submission::Ignored) => {}
            Ok(submission) => {
                debug!(?submission, "Input submitted");
                self.input.commit();
            }
            Err(SubmitError::Busy) => {
                self.notify("Still waiting for the last reply");
            }
        }
        self.sync();
    }

    /// Handle key input for the question field.
    /// Returns true if the key was handled (should not be processed as action).
    pub fn handle_input_key(&mut self, key: KeyEvent) -> bool {
        if self.show_help {
            return false;
        }

        // Ctrl+J inserts a newline
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('j') {
                self.input.insert('\n');
                return true;
            }
            return false;
        }

        match key.code {
            KeyCode::Char(c) => {
                self.input.insert(c);
                true
            }
            KeyCode::Backspace => {
                self.input.backspace();
                true
            }
            KeyCode::Delete => {
                self.input.delete();
                true
            }
            KeyCode::Left => {
                self.input.move_left();
                true
            }
            KeyCode::Right => {
                self.input.move_right();
                true
            }
            KeyCode::Home => {
                self.input.move_home();
                true
            }
            KeyCode::End => {
                self.input.move_end();
                true
            }
            // Up starts browsing from an empty input; Up/Down continue while browsing
            KeyCode::Up if self.input.is_empty() || self.input.is_browsing() => {
                self.input.history_prev();
                true
            }
            KeyCode::Down if self.input.is_browsing() => {
                self.input.history_next();
                true
            }
            _ => false,
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        // Help overlay swallows everything except its own toggles
        if self.show_help {
            if matches!(action, Action::Help | Action::Back | Action::Quit) {
                self.show_help = false;
            }
            return;
        }

        match action {
            Action::Quit => self.quit(),
            Action::Help => self.show_help = true,
            Action::Back => {
                if self.session.is_pending() {
                    let cancelled = self.session.cancel();
                    self.notify(format!("Cancelled {cancelled} pending reply(s)"));
                    self.sync();
                } else {
                    self.quit();
                }
            }
            Action::Submit => self.submit_input(),
            Action::ScrollUp => self.scroll_up(1),
            Action::ScrollDown => self.scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_LINES),
            Action::PageDown => self.scroll_down(PAGE_LINES),
            Action::None => {}
        }
    }

    /// Scroll the transcript towards older messages.
    pub fn scroll_up(&mut self, lines: usize) {
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines);
    }

    /// Scroll the transcript towards newer messages.
    pub fn scroll_down(&mut self, lines: usize) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    /// Clamp scrolling to the transcript's real length.
    pub fn clamp_scroll(&mut self, max: usize) {
        self.transcript_scroll = self.transcript_scroll.min(max);
    }

    fn quit(&mut self) {
        self.session.cancel();
        self.should_quit = true;
    }
}
