//! Main rendering for the gallery TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::editors::{HashtagEditor, InstructionEditor};
use crate::ui::widgets::gallery::GalleryWidget;
use crate::ui::widgets::input::InputWidget;
use crate::ui::widgets::story_panel::StoryPanelWidget;

/// Which main panel has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Gallery,
    Story,
}

/// Modal overlays
pub enum Overlay {
    Help,
    CardDetail { slot: usize },
    Caption { text: String },
    StoryStarted { story_id: String },
    PresetManager { index: usize },
    InstructionEditor(InstructionEditor),
    HashtagEditor(HashtagEditor),
}

/// Render the whole application
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(38)])
        .split(chunks[0]);

    let gallery = GalleryWidget::new(&app.casting, &app.theme)
        .cursor_slot(app.cursor_slot)
        .columns(App::GALLERY_COLUMNS)
        .animation_frame(app.animation_frame)
        .focused(app.focused_panel == FocusedPanel::Gallery)
        .loading(app.loading_batch);
    f.render_widget(gallery, main[0]);

    let story = StoryPanelWidget::new(&app.story_form, &app.casting, &app.theme)
        .focused_field(app.story_field)
        .focused(app.focused_panel == FocusedPanel::Story)
        .begin_in_flight(app.begin_in_flight)
        .last_story_id(app.last_story_id.as_deref());
    f.render_widget(story, main[1]);

    render_bottom_bar(f, app, chunks[1]);

    match app.overlay() {
        Some(Overlay::Help) => render_help(f, app),
        Some(Overlay::CardDetail { slot }) => render_card_detail(f, app, *slot),
        Some(Overlay::Caption { text }) => render_caption(f, app, text),
        Some(Overlay::StoryStarted { story_id }) => render_story_started(f, app, story_id),
        Some(Overlay::PresetManager { index }) => render_preset_manager(f, app, *index),
        Some(Overlay::InstructionEditor(editor)) => {
            editor.render(f, centered_rect(70, 50, f.area()), &app.theme)
        }
        Some(Overlay::HashtagEditor(editor)) => {
            editor.render(f, centered_rect(70, 45, f.area()), &app.theme)
        }
        None => {}
    }
}

fn render_bottom_bar(f: &mut Frame, app: &App, area: Rect) {
    if app.input_mode != InputMode::Normal {
        let placeholder = match app.input_mode {
            InputMode::Insert => "Type a custom twist...",
            _ => "",
        };
        let input = InputWidget::new(app.input_buffer(), &app.theme)
            .cursor_position(app.cursor_position())
            .placeholder(placeholder)
            .command_mode(app.input_mode == InputMode::Command);
        f.render_widget(input, area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(false));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let line = if let Some(status) = app.status_message() {
        let style = match app.latest_notice() {
            Some(notice) if notice.message == status => app.theme.notice_style(notice.level),
            _ => app.theme.muted_style(),
        };
        Line::from(Span::styled(status.to_string(), style))
    } else {
        Line::from(Span::styled(
            "Space: select  r: reroll  d: describe  c: caption  R: new batch  b: begin  p: presets  ?: help  q: quit",
            app.theme.muted_style(),
        ))
    };
    f.render_widget(Paragraph::new(line), inner);
}

fn render_help(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let entries: [(&str, &str); 16] = [
        ("h j k l / arrows", "move around the gallery"),
        ("Space / Enter", "select or deselect a character"),
        ("r", "reroll the highlighted slot"),
        ("d", "re-describe with the chosen analysis style"),
        ("c", "generate a caption for the highlighted card"),
        ("v", "view the full card"),
        ("R", "summon a fresh batch (clears the cast)"),
        ("b", "begin the story (needs a full cast)"),
        ("Tab", "switch between gallery and story panel"),
        ("(story) j/k", "move between form fields"),
        ("(story) h/l", "cycle the field's options"),
        ("(story) i", "type a custom twist for the field"),
        ("p", "manage analysis styles and hashtags"),
        (":", "command mode (:reload, :presets, :q)"),
        ("?", "toggle this help"),
        ("q", "quit"),
    ];

    let lines: Vec<Line> = entries
        .iter()
        .map(|(keys, what)| {
            Line::from(vec![
                Span::styled(format!("  {keys:<18}"), app.theme.accent_style()),
                Span::styled(what.to_string(), app.theme.muted_style()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_card_detail(f: &mut Frame, app: &App, slot: usize) {
    let Some(card) = app.casting.card(slot) else {
        return;
    };

    let area = centered_rect(70, 60, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", card.name))
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Style: ", app.theme.title_style()),
            Span::styled(card.style.clone(), app.theme.accent_style()),
        ]),
        Line::from(vec![
            Span::styled("Traits: ", app.theme.title_style()),
            Span::styled(card.character_traits.join(", "), app.theme.accent_style()),
        ]),
        Line::from(vec![
            Span::styled("Artwork: ", app.theme.title_style()),
            Span::styled(card.image_url.clone(), app.theme.muted_style()),
        ]),
        Line::from(""),
    ];
    for paragraph in card.story.split("\n\n") {
        lines.push(Line::from(paragraph.to_string()));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Esc: close",
        app.theme.muted_style(),
    )));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
}

fn render_caption(f: &mut Frame, app: &App, text: &str) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Caption ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc: close",
        app.theme.muted_style(),
    )));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn render_story_started(f: &mut Frame, app: &App, story_id: &str) {
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Story Started ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw("  Your story is underway: "),
            Span::styled(story_id.to_string(), app.theme.selected_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Open the story page with this id to follow along.",
            app.theme.muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled("  Esc: close", app.theme.muted_style())),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_preset_manager(f: &mut Frame, app: &App, index: usize) {
    let area = centered_rect(60, 70, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(" Analysis Styles & Hashtags ")
        .borders(Borders::ALL)
        .border_style(app.theme.border_style(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![Line::from(Span::styled(
        "Analysis styles",
        app.theme.title_style(),
    ))];

    if app.presets.instructions().is_empty() {
        lines.push(Line::from(Span::styled(
            "  (none loaded)",
            app.theme.muted_style(),
        )));
    }
    for (i, instruction) in app.presets.instructions().iter().enumerate() {
        let marker = if i == index { "> " } else { "  " };
        let mut label = instruction.name.clone();
        if instruction.is_default {
            label.push_str(" (default)");
        }
        if app.instruction_choice == Some(i) {
            label.push_str("  [in use]");
        }
        let style = if i == index {
            app.theme.cursor_style()
        } else {
            app.theme.accent_style()
        };
        lines.push(Line::from(vec![
            Span::raw(marker.to_string()),
            Span::styled(label, style),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Hashtag collections",
        app.theme.title_style(),
    )));
    if app.presets.collections().is_empty() {
        lines.push(Line::from(Span::styled(
            "  (none loaded)",
            app.theme.muted_style(),
        )));
    }
    for (i, collection) in app.presets.collections().iter().enumerate() {
        let mut label = format!("{} ({} tags)", collection.name, collection.hashtags.len());
        if collection.is_default {
            label.push_str(" (default)");
        }
        if app.collection_choice == Some(i) {
            label.push_str("  [in use]");
        }
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(label, app.theme.accent_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "j/k: move  u: use  Enter: edit  n: new style  t: new tags  x: delete  Esc: close",
        app.theme.muted_style(),
    )));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

/// A centered rect taking the given percentages of the screen.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
