//! Character gallery widget: the grid of cards

use menagerie_core::CastingState;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::StudioTheme;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Grid of character cards with selection and busy markers.
pub struct GalleryWidget<'a> {
    casting: &'a CastingState,
    theme: &'a StudioTheme,
    cursor_slot: usize,
    columns: usize,
    animation_frame: u8,
    focused: bool,
    loading: bool,
}

impl<'a> GalleryWidget<'a> {
    pub fn new(casting: &'a CastingState, theme: &'a StudioTheme) -> Self {
        Self {
            casting,
            theme,
            cursor_slot: 0,
            columns: 3,
            animation_frame: 0,
            focused: true,
            loading: false,
        }
    }

    pub fn cursor_slot(mut self, slot: usize) -> Self {
        self.cursor_slot = slot;
        self
    }

    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns.max(1);
        self
    }

    pub fn animation_frame(mut self, frame: u8) -> Self {
        self.animation_frame = frame;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    fn render_card(&self, slot: usize, area: Rect, buf: &mut Buffer) {
        let Some(card) = self.casting.card(slot) else {
            return;
        };

        let selected = self.casting.is_selected(slot);
        let busy = self.casting.slot_busy(slot);
        let under_cursor = self.focused && slot == self.cursor_slot;

        let border_style = if under_cursor {
            self.theme.cursor_style()
        } else if selected {
            self.theme.selected_style()
        } else {
            self.theme.border_style(false)
        };

        let mut title = format!(" {} ", card.name);
        if busy {
            let spinner = SPINNER_FRAMES[self.animation_frame as usize % SPINNER_FRAMES.len()];
            title = format!(" {} {spinner} ", card.name);
        }

        let block = Block::default()
            .title(Span::styled(title, self.theme.title_style()))
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let marker = if selected {
            Line::from(Span::styled("* in the cast", self.theme.selected_style()))
        } else if busy {
            Line::from(Span::styled("working...", self.theme.busy_style()))
        } else {
            Line::from(Span::styled(
                format!("slot {}", slot + 1),
                self.theme.muted_style(),
            ))
        };

        let mut lines = vec![
            marker,
            Line::from(Span::styled(card.style.clone(), self.theme.accent_style())),
        ];
        if !card.character_traits.is_empty() {
            lines.push(Line::from(Span::styled(
                card.character_traits.join(", "),
                self.theme.muted_style(),
            )));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

impl Widget for GalleryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Character Gallery ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.loading {
            let spinner = SPINNER_FRAMES[self.animation_frame as usize % SPINNER_FRAMES.len()];
            Paragraph::new(Line::from(Span::styled(
                format!("{spinner} Summoning characters..."),
                self.theme.busy_style(),
            )))
            .render(inner, buf);
            return;
        }

        if self.casting.is_empty() {
            Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No characters yet. Press R to summon a batch.",
                    self.theme.muted_style(),
                )),
            ])
            .render(inner, buf);
            return;
        }

        let rows = self.casting.len().div_ceil(self.columns);
        let row_constraints: Vec<Constraint> = (0..rows)
            .map(|_| Constraint::Ratio(1, rows as u32))
            .collect();
        let row_areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints(row_constraints)
            .split(inner);

        let column_constraints: Vec<Constraint> = (0..self.columns)
            .map(|_| Constraint::Ratio(1, self.columns as u32))
            .collect();

        for (row, row_area) in row_areas.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(column_constraints.clone())
                .split(*row_area);
            for (column, cell) in cells.iter().enumerate() {
                let slot = row * self.columns + column;
                if slot < self.casting.len() {
                    self.render_card(slot, *cell, buf);
                }
            }
        }
    }
}
