//! UI module for the gallery TUI

pub mod render;
pub mod theme;
pub mod widgets;

pub use render::{FocusedPanel, Overlay};
