//! Input field widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::StudioTheme;

/// Single-line input field with a block cursor.
pub struct InputWidget<'a> {
    content: &'a str,
    cursor_position: usize,
    theme: &'a StudioTheme,
    placeholder: &'a str,
    is_command_mode: bool,
}

impl<'a> InputWidget<'a> {
    pub fn new(content: &'a str, theme: &'a StudioTheme) -> Self {
        Self {
            content,
            cursor_position: content.chars().count(),
            theme,
            placeholder: "",
            is_command_mode: false,
        }
    }

    pub fn cursor_position(mut self, pos: usize) -> Self {
        self.cursor_position = pos;
        self
    }

    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn command_mode(mut self, is_command: bool) -> Self {
        self.is_command_mode = is_command;
        self
    }
}

/// Split `content` at a character index into (before, at, after), padding
/// the cursor cell with a space at end of line.
fn split_at_cursor(content: &str, cursor: usize) -> (String, String, String) {
    let before: String = content.chars().take(cursor).collect();
    let at = content
        .chars()
        .nth(cursor)
        .map(String::from)
        .unwrap_or_else(|| " ".to_string());
    let after: String = content.chars().skip(cursor + 1).collect();
    (before, at, after)
}

impl Widget for InputWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.content.is_empty() && !self.is_command_mode {
            Paragraph::new(Line::from(vec![
                Span::styled("> ", self.theme.cursor_style()),
                Span::styled(
                    self.placeholder,
                    Style::default().add_modifier(Modifier::DIM),
                ),
            ]))
            .render(inner, buf);
            return;
        }

        // Command mode shows ":" as the prefix instead of the leading char
        let (prefix, content, cursor) = if self.is_command_mode {
            (
                ":",
                self.content.strip_prefix(':').unwrap_or(self.content),
                self.cursor_position.saturating_sub(1),
            )
        } else {
            ("> ", self.content, self.cursor_position)
        };

        let (before, at, after) = split_at_cursor(content, cursor);
        let line = Line::from(vec![
            Span::styled(prefix, self.theme.cursor_style()),
            Span::raw(before),
            Span::styled(
                at,
                Style::default()
                    .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
                    .fg(self.theme.cursor),
            ),
            Span::raw(after),
        ]);

        Paragraph::new(line).render(inner, buf);
    }
}
