//! Modal editors for analysis styles and hashtag collections.
//!
//! Each editor is a small self-contained form: it owns its fields, handles
//! its own keys, and produces a draft for the worker on submit.

use crossterm::event::{KeyCode, KeyEvent};
use menagerie_client::{HashtagDraft, Instruction, InstructionDraft};
use menagerie_core::parse_hashtags;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::theme::StudioTheme;

/// What the editor wants after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Continue,
    Cancelled,
    Submitted,
}

/// Fields of the instruction editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionField {
    Name,
    SystemPrompt,
    UserPrompt,
    IsDefault,
}

impl InstructionField {
    fn title(&self) -> &'static str {
        match self {
            InstructionField::Name => "Name",
            InstructionField::SystemPrompt => "System prompt",
            InstructionField::UserPrompt => "User prompt",
            InstructionField::IsDefault => "Default style",
        }
    }

    fn next(&self) -> InstructionField {
        match self {
            InstructionField::Name => InstructionField::SystemPrompt,
            InstructionField::SystemPrompt => InstructionField::UserPrompt,
            InstructionField::UserPrompt => InstructionField::IsDefault,
            InstructionField::IsDefault => InstructionField::Name,
        }
    }

    fn prev(&self) -> InstructionField {
        match self {
            InstructionField::Name => InstructionField::IsDefault,
            InstructionField::SystemPrompt => InstructionField::Name,
            InstructionField::UserPrompt => InstructionField::SystemPrompt,
            InstructionField::IsDefault => InstructionField::UserPrompt,
        }
    }
}

/// Editor state for creating or updating an analysis style.
#[derive(Debug, Clone)]
pub struct InstructionEditor {
    pub id: Option<String>,
    pub name: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub is_default: bool,
    pub field: InstructionField,
}

impl InstructionEditor {
    /// Start a blank editor for a new analysis style.
    pub fn create() -> Self {
        Self {
            id: None,
            name: String::new(),
            system_prompt: String::new(),
            user_prompt: String::new(),
            is_default: false,
            field: InstructionField::Name,
        }
    }

    /// Start an editor pre-filled from an existing style.
    pub fn edit(instruction: &Instruction) -> Self {
        Self {
            id: Some(instruction.id.clone()),
            name: instruction.name.clone(),
            system_prompt: instruction.system_prompt.clone(),
            user_prompt: instruction.user_prompt.clone(),
            is_default: instruction.is_default,
            field: InstructionField::Name,
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancelled,
            KeyCode::Tab | KeyCode::Down => {
                self.field = self.field.next();
                EditorAction::Continue
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.field = self.field.prev();
                EditorAction::Continue
            }
            KeyCode::Enter => {
                // Name is the only required field.
                if self.name.trim().is_empty() {
                    self.field = InstructionField::Name;
                    EditorAction::Continue
                } else {
                    EditorAction::Submitted
                }
            }
            KeyCode::Char(' ') if self.field == InstructionField::IsDefault => {
                self.is_default = !self.is_default;
                EditorAction::Continue
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = self.active_text_mut() {
                    buffer.push(c);
                }
                EditorAction::Continue
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.active_text_mut() {
                    buffer.pop();
                }
                EditorAction::Continue
            }
            _ => EditorAction::Continue,
        }
    }

    fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            InstructionField::Name => Some(&mut self.name),
            InstructionField::SystemPrompt => Some(&mut self.system_prompt),
            InstructionField::UserPrompt => Some(&mut self.user_prompt),
            InstructionField::IsDefault => None,
        }
    }

    /// Build the draft submitted to the studio.
    pub fn draft(&self) -> InstructionDraft {
        InstructionDraft {
            id: self.id.clone(),
            name: self.name.trim().to_string(),
            system_prompt: self.system_prompt.clone(),
            user_prompt: self.user_prompt.clone(),
            is_default: self.is_default,
        }
    }

    /// Render the editor as a centered modal.
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &StudioTheme) {
        let title = if self.id.is_some() {
            " Edit Analysis Style "
        } else {
            " New Analysis Style "
        };

        f.render_widget(Clear, area);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(theme.border_style(true));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let mut lines = Vec::new();
        for field in [
            InstructionField::Name,
            InstructionField::SystemPrompt,
            InstructionField::UserPrompt,
        ] {
            let value = match field {
                InstructionField::Name => &self.name,
                InstructionField::SystemPrompt => &self.system_prompt,
                InstructionField::UserPrompt => &self.user_prompt,
                InstructionField::IsDefault => unreachable!(),
            };
            lines.push(field_line(field.title(), value, self.field == field, theme));
        }
        lines.push(toggle_line(
            InstructionField::IsDefault.title(),
            self.is_default,
            self.field == InstructionField::IsDefault,
            theme,
        ));
        lines.push(Line::from(""));
        lines.push(hint_line(theme));

        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

/// Fields of the hashtag editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashtagField {
    Name,
    Hashtags,
    IsDefault,
}

impl HashtagField {
    fn title(&self) -> &'static str {
        match self {
            HashtagField::Name => "Name",
            HashtagField::Hashtags => "Hashtags",
            HashtagField::IsDefault => "Default collection",
        }
    }

    fn next(&self) -> HashtagField {
        match self {
            HashtagField::Name => HashtagField::Hashtags,
            HashtagField::Hashtags => HashtagField::IsDefault,
            HashtagField::IsDefault => HashtagField::Name,
        }
    }

    fn prev(&self) -> HashtagField {
        match self {
            HashtagField::Name => HashtagField::IsDefault,
            HashtagField::Hashtags => HashtagField::Name,
            HashtagField::IsDefault => HashtagField::Hashtags,
        }
    }
}

/// Editor state for creating a hashtag collection.
#[derive(Debug, Clone)]
pub struct HashtagEditor {
    pub name: String,
    pub hashtags: String,
    pub is_default: bool,
    pub field: HashtagField,
}

impl HashtagEditor {
    pub fn create() -> Self {
        Self {
            name: String::new(),
            hashtags: String::new(),
            is_default: false,
            field: HashtagField::Name,
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) -> EditorAction {
        match key.code {
            KeyCode::Esc => EditorAction::Cancelled,
            KeyCode::Tab | KeyCode::Down => {
                self.field = self.field.next();
                EditorAction::Continue
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.field = self.field.prev();
                EditorAction::Continue
            }
            KeyCode::Enter => {
                if self.name.trim().is_empty() {
                    self.field = HashtagField::Name;
                    EditorAction::Continue
                } else {
                    EditorAction::Submitted
                }
            }
            KeyCode::Char(' ') if self.field == HashtagField::IsDefault => {
                self.is_default = !self.is_default;
                EditorAction::Continue
            }
            KeyCode::Char(c) => {
                if let Some(buffer) = self.active_text_mut() {
                    buffer.push(c);
                }
                EditorAction::Continue
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.active_text_mut() {
                    buffer.pop();
                }
                EditorAction::Continue
            }
            _ => EditorAction::Continue,
        }
    }

    fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            HashtagField::Name => Some(&mut self.name),
            HashtagField::Hashtags => Some(&mut self.hashtags),
            HashtagField::IsDefault => None,
        }
    }

    pub fn draft(&self) -> HashtagDraft {
        HashtagDraft {
            name: self.name.trim().to_string(),
            hashtags: self.hashtags.clone(),
            is_default: self.is_default,
        }
    }

    /// Render the editor as a centered modal.
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &StudioTheme) {
        f.render_widget(Clear, area);
        let block = Block::default()
            .title(" New Hashtag Collection ")
            .borders(Borders::ALL)
            .border_style(theme.border_style(true));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let kept = parse_hashtags(&self.hashtags).len();
        let mut lines = vec![
            field_line(
                HashtagField::Name.title(),
                &self.name,
                self.field == HashtagField::Name,
                theme,
            ),
            field_line(
                HashtagField::Hashtags.title(),
                &self.hashtags,
                self.field == HashtagField::Hashtags,
                theme,
            ),
            Line::from(Span::styled(
                format!("  {kept} tags will be kept (only #-prefixed ones count)"),
                theme.muted_style(),
            )),
            toggle_line(
                HashtagField::IsDefault.title(),
                self.is_default,
                self.field == HashtagField::IsDefault,
                theme,
            ),
            Line::from(""),
            hint_line(theme),
        ];

        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

fn field_line(title: &str, value: &str, focused: bool, theme: &StudioTheme) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let value_span = if focused {
        Span::styled(
            format!("{value}_"),
            theme.accent_style().add_modifier(Modifier::UNDERLINED),
        )
    } else {
        Span::styled(value.to_string(), theme.accent_style())
    };
    Line::from(vec![
        Span::raw(marker.to_string()),
        Span::styled(format!("{title:<16}"), theme.title_style()),
        value_span,
    ])
}

fn toggle_line(title: &str, on: bool, focused: bool, theme: &StudioTheme) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    Line::from(vec![
        Span::raw(marker.to_string()),
        Span::styled(format!("{title:<16}"), theme.title_style()),
        Span::styled(
            if on { "[x]" } else { "[ ]" }.to_string(),
            theme.accent_style(),
        ),
    ])
}

fn hint_line(theme: &StudioTheme) -> Line<'static> {
    Line::from(Span::styled(
        "Tab: next field  Space: toggle  Enter: save  Esc: cancel",
        theme.muted_style(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut editor = InstructionEditor::create();
        for c in "Noir".chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
        editor.handle_key(key(KeyCode::Tab));
        for c in "Moody".chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }

        assert_eq!(editor.name, "Noir");
        assert_eq!(editor.system_prompt, "Moody");
    }

    #[test]
    fn test_submit_requires_a_name() {
        let mut editor = InstructionEditor::create();
        assert_eq!(editor.handle_key(key(KeyCode::Enter)), EditorAction::Continue);

        for c in "Critic".chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(editor.handle_key(key(KeyCode::Enter)), EditorAction::Submitted);
    }

    #[test]
    fn test_default_toggle_only_on_its_field() {
        let mut editor = InstructionEditor::create();
        editor.handle_key(key(KeyCode::Char(' ')));
        assert!(!editor.is_default);
        assert_eq!(editor.name, " ");

        editor.field = InstructionField::IsDefault;
        editor.handle_key(key(KeyCode::Char(' ')));
        assert!(editor.is_default);
    }

    #[test]
    fn test_edit_prefills_and_keeps_id() {
        let instruction = Instruction {
            id: "5".to_string(),
            name: "House style".to_string(),
            system_prompt: "You are an art critic.".to_string(),
            user_prompt: "Analyze.".to_string(),
            is_default: true,
        };
        let editor = InstructionEditor::edit(&instruction);
        let draft = editor.draft();

        assert_eq!(draft.id.as_deref(), Some("5"));
        assert_eq!(draft.name, "House style");
        assert!(draft.is_default);
    }

    #[test]
    fn test_hashtag_editor_draft_keeps_raw_text() {
        let mut editor = HashtagEditor::create();
        for c in "Tags".chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }
        editor.handle_key(key(KeyCode::Tab));
        for c in "#one, two, #three".chars() {
            editor.handle_key(key(KeyCode::Char(c)));
        }

        let draft = editor.draft();
        assert_eq!(draft.hashtags, "#one, two, #three");
        assert_eq!(parse_hashtags(&draft.hashtags), vec!["#one", "#three"]);
    }
}
