//! Story sidebar widget: form fields, the cast, and the begin affordance

use menagerie_core::{CastingState, StoryForm, MAX_CAST};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::StoryField;
use crate::ui::theme::StudioTheme;

const FIELDS: [StoryField; 4] = [
    StoryField::Conflict,
    StoryField::Setting,
    StoryField::NarrativeStyle,
    StoryField::Mood,
];

/// Sidebar with the story form and cast summary.
pub struct StoryPanelWidget<'a> {
    form: &'a StoryForm,
    casting: &'a CastingState,
    theme: &'a StudioTheme,
    focused_field: StoryField,
    focused: bool,
    begin_in_flight: bool,
    last_story_id: Option<&'a str>,
}

impl<'a> StoryPanelWidget<'a> {
    pub fn new(form: &'a StoryForm, casting: &'a CastingState, theme: &'a StudioTheme) -> Self {
        Self {
            form,
            casting,
            theme,
            focused_field: StoryField::Conflict,
            focused: false,
            begin_in_flight: false,
            last_story_id: None,
        }
    }

    pub fn focused_field(mut self, field: StoryField) -> Self {
        self.focused_field = field;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn begin_in_flight(mut self, pending: bool) -> Self {
        self.begin_in_flight = pending;
        self
    }

    pub fn last_story_id(mut self, story_id: Option<&'a str>) -> Self {
        self.last_story_id = story_id;
        self
    }

    fn field_line(&self, field: StoryField) -> Line<'static> {
        let (picked, custom) = match field {
            StoryField::Conflict => (&self.form.conflict, &self.form.custom_conflict),
            StoryField::Setting => (&self.form.setting, &self.form.custom_setting),
            StoryField::NarrativeStyle => (&self.form.narrative_style, &self.form.custom_narrative),
            StoryField::Mood => (&self.form.mood, &self.form.custom_mood),
        };

        let marker = if self.focused && field == self.focused_field {
            "> "
        } else {
            "  "
        };
        let emoji = field
            .options()
            .iter()
            .find(|choice| choice.label == *picked)
            .map(|choice| choice.emoji)
            .unwrap_or(" ");

        let value_span = if custom.trim().is_empty() {
            Span::styled(format!("{emoji} {picked}"), self.theme.accent_style())
        } else {
            // A custom override supersedes the picked option.
            Span::styled(
                format!("\"{}\"", custom.trim()),
                self.theme.accent_style().add_modifier(Modifier::ITALIC),
            )
        };

        Line::from(vec![
            Span::raw(marker.to_string()),
            Span::styled(format!("{:<10}", field.title()), self.theme.title_style()),
            value_span,
        ])
    }
}

impl Widget for StoryPanelWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Story ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = FIELDS.iter().map(|field| self.field_line(*field)).collect();

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Cast {}/{MAX_CAST}", self.casting.cast_len()),
            if self.casting.cast_complete() {
                self.theme.selected_style()
            } else {
                self.theme.title_style()
            },
        )));
        for card in self.casting.cast_cards() {
            lines.push(Line::from(vec![
                Span::raw("  * "),
                Span::styled(card.name.clone(), self.theme.selected_style()),
            ]));
        }

        lines.push(Line::from(""));
        let begin_line = if self.begin_in_flight {
            Line::from(Span::styled(
                "Beginning the story...",
                self.theme.busy_style(),
            ))
        } else {
            Line::from(Span::styled(
                "b: begin story",
                self.theme.begin_style(self.casting.cast_complete()),
            ))
        };
        lines.push(begin_line);

        if let Some(story_id) = self.last_story_id {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Last story: ", self.theme.muted_style()),
                Span::styled(story_id.to_string(), self.theme.accent_style()),
            ]));
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
