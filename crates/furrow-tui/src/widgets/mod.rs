//! Widgets for the furrow TUI.

pub mod input_bar;
pub mod transcript;

pub use input_bar::InputBar;
pub use transcript::TranscriptWidget;
