//! Color palette for the TUI.
//!
//! Greens for the user's side of the conversation and the accents, neutral
//! grays for the assistant and the chrome.

use ratatui::style::Color;

/// Theme color palette.
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,

    // Foregrounds
    pub text: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,
    pub primary_dim: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::field()
    }
}

impl Theme {
    /// Default green-on-dark theme.
    pub fn field() -> Self {
        Self {
            base: Color::Rgb(20, 28, 22),            // #141c16
            text: Color::Rgb(229, 231, 235),         // #e5e7eb
            muted: Color::Rgb(107, 114, 128),        // #6b7280
            primary: Color::Rgb(22, 163, 74),        // #16a34a
            primary_dim: Color::Rgb(74, 222, 128),   // #4ade80
            border: Color::Rgb(75, 85, 99),          // #4b5563
            border_focused: Color::Rgb(34, 197, 94), // #22c55e
        }
    }

    /// Monochrome fallback for terminals without truecolor.
    pub fn plain() -> Self {
        Self {
            base: Color::Reset,
            text: Color::Reset,
            muted: Color::DarkGray,
            primary: Color::Green,
            primary_dim: Color::LightGreen,
            border: Color::Gray,
            border_focused: Color::Green,
        }
    }

    /// Pick a theme from the `COLORTERM` environment value.
    pub fn detect(colorterm: Option<&str>) -> Self {
        match colorterm {
            Some("truecolor" | "24bit") => Self::field(),
            _ => Self::plain(),
        }
    }
}

/// Spinner frames for the loading indicator.
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_truecolor() {
        assert_eq!(Theme::detect(Some("truecolor")).primary, Theme::field().primary);
        assert_eq!(Theme::detect(None).primary, Color::Green);
    }
}
