//! Widgets for the gallery TUI

pub mod gallery;
pub mod input;
pub mod story_panel;
