//! Color theme and styling for the gallery TUI

use menagerie_core::NoticeLevel;
use ratatui::style::{Color, Modifier, Style};

/// Studio UI color theme
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct StudioTheme {
    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Card states
    pub selected: Color,
    pub busy: Color,
    pub cursor: Color,

    // Notice colors
    pub success: Color,
    pub error: Color,

    // Text colors
    pub title: Color,
    pub muted: Color,
    pub accent: Color,
}

impl Default for StudioTheme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Cyan,

            selected: Color::Green,
            busy: Color::Yellow,
            cursor: Color::Cyan,

            success: Color::Green,
            error: Color::Red,

            title: Color::White,
            muted: Color::DarkGray,
            accent: Color::Magenta,
        }
    }
}

impl StudioTheme {
    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Style for a card that is in the cast
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for a card with a request in flight
    pub fn busy_style(&self) -> Style {
        Style::default().fg(self.busy)
    }

    /// Style for the card under the cursor
    pub fn cursor_style(&self) -> Style {
        Style::default()
            .fg(self.cursor)
            .add_modifier(Modifier::BOLD)
    }

    /// Style for card titles
    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    /// Style for secondary text
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for emphasized values
    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Style for a notice line
    pub fn notice_style(&self, level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Success => Style::default().fg(self.success),
            NoticeLevel::Error => Style::default().fg(self.error).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for the begin-story affordance
    pub fn begin_style(&self, enabled: bool) -> Style {
        if enabled {
            Style::default()
                .fg(self.success)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.muted).add_modifier(Modifier::DIM)
        }
    }
}
