//! Event handling for the gallery TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode};
use crate::editors::{EditorAction, HashtagEditor, InstructionEditor};
use crate::ui::{FocusedPanel, Overlay};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcut (always works)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    // Overlays swallow keys first
    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    // Route based on input mode
    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

/// Handle keys in NORMAL mode
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    // Keys that work regardless of panel focus
    match key.code {
        KeyCode::Char('q') => return EventResult::Quit,
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            return EventResult::NeedsRedraw;
        }
        KeyCode::Char(':') => {
            app.enter_command_mode();
            return EventResult::NeedsRedraw;
        }
        KeyCode::Tab => {
            app.cycle_focus();
            return EventResult::NeedsRedraw;
        }
        KeyCode::Char('b') => {
            app.begin_adventure();
            return EventResult::NeedsRedraw;
        }
        KeyCode::Char('R') => {
            app.reload_gallery();
            return EventResult::NeedsRedraw;
        }
        KeyCode::Char('p') => {
            app.refresh_presets();
            app.set_overlay(Overlay::PresetManager { index: 0 });
            return EventResult::NeedsRedraw;
        }
        _ => {}
    }

    match app.focused_panel {
        FocusedPanel::Gallery => handle_gallery_key(app, key),
        FocusedPanel::Story => handle_story_key(app, key),
    }
}

/// Keys while the gallery has focus
fn handle_gallery_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.cursor_left(),
        KeyCode::Char('l') | KeyCode::Right => app.cursor_right(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_select(),
        KeyCode::Char('r') => app.reroll_slot(),
        KeyCode::Char('d') => app.describe_slot(),
        KeyCode::Char('c') => app.caption_slot(),
        KeyCode::Char('v') => {
            if app.casting.card(app.cursor_slot).is_some() {
                app.set_overlay(Overlay::CardDetail {
                    slot: app.cursor_slot,
                });
            }
        }
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Keys while the story panel has focus
fn handle_story_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.story_field = app.story_field.next(),
        KeyCode::Char('k') | KeyCode::Up => app.story_field = app.story_field.prev(),
        KeyCode::Char('l') | KeyCode::Right => app.cycle_story_choice(true),
        KeyCode::Char('h') | KeyCode::Left => app.cycle_story_choice(false),
        KeyCode::Char('i') => app.enter_insert_mode(),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys in INSERT mode (editing a custom story override)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => app.enter_normal_mode(),
        KeyCode::Enter => app.commit_override(),
        KeyCode::Char(c) => app.type_char(c),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Left => app.input_cursor_left(),
        KeyCode::Right => app.input_cursor_right(),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys in COMMAND mode
fn handle_command_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => app.enter_normal_mode(),
        KeyCode::Enter => {
            if let Some(command) = app.submit_input() {
                app.process_command(&command);
            }
            if app.input_mode == InputMode::Command {
                app.enter_normal_mode();
            }
        }
        KeyCode::Char(c) => app.type_char(c),
        KeyCode::Backspace => {
            if app.input_buffer() == ":" {
                app.enter_normal_mode();
            } else {
                app.backspace();
            }
        }
        KeyCode::Left => app.input_cursor_left(),
        KeyCode::Right => app.input_cursor_right(),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

/// Handle keys while an overlay is open
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    // Editors own their keys entirely
    if let Some(Overlay::InstructionEditor(editor)) = app.overlay_mut() {
        let action = editor.handle_key(key);
        let draft = (action == EditorAction::Submitted).then(|| editor.draft());
        match action {
            EditorAction::Continue => {}
            EditorAction::Cancelled => app.close_overlay(),
            EditorAction::Submitted => {
                app.close_overlay();
                if let Some(draft) = draft {
                    app.save_instruction(draft);
                }
            }
        }
        return EventResult::NeedsRedraw;
    }
    if let Some(Overlay::HashtagEditor(editor)) = app.overlay_mut() {
        let action = editor.handle_key(key);
        let draft = (action == EditorAction::Submitted).then(|| editor.draft());
        match action {
            EditorAction::Continue => {}
            EditorAction::Cancelled => app.close_overlay(),
            EditorAction::Submitted => {
                app.close_overlay();
                if let Some(draft) = draft {
                    app.create_hashtags(draft);
                }
            }
        }
        return EventResult::NeedsRedraw;
    }

    if let Some(Overlay::PresetManager { index }) = app.overlay() {
        return handle_preset_manager_key(app, key, *index);
    }

    // Informational overlays close on any dismissal key
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char(' ') => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Keys inside the preset manager overlay
fn handle_preset_manager_key(app: &mut App, key: KeyEvent, index: usize) -> EventResult {
    let count = app.presets.instructions().len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_overlay(),
        KeyCode::Char('j') | KeyCode::Down => {
            let next = if count == 0 { 0 } else { (index + 1).min(count - 1) };
            app.set_overlay(Overlay::PresetManager { index: next });
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.set_overlay(Overlay::PresetManager {
                index: index.saturating_sub(1),
            });
        }
        KeyCode::Char('u') => {
            if let Some(instruction) = app.presets.instructions().get(index) {
                let name = instruction.name.clone();
                app.instruction_choice = Some(index);
                app.push_notice(menagerie_core::Notice::success(format!(
                    "Using {name} for descriptions"
                )));
            }
        }
        KeyCode::Enter => {
            if let Some(instruction) = app.presets.instructions().get(index) {
                let editor = InstructionEditor::edit(instruction);
                app.set_overlay(Overlay::InstructionEditor(editor));
            }
        }
        KeyCode::Char('n') => {
            app.set_overlay(Overlay::InstructionEditor(InstructionEditor::create()));
        }
        KeyCode::Char('t') => {
            app.set_overlay(Overlay::HashtagEditor(HashtagEditor::create()));
        }
        KeyCode::Char('x') => {
            if let Some(instruction) = app.presets.instructions().get(index) {
                let id = instruction.id.clone();
                app.delete_instruction(id);
            }
        }
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{WorkerRequest, WorkerResponse};
    use menagerie_core::sample_batch;
    use tokio::sync::mpsc;

    fn test_app() -> App {
        let (request_tx, _request_rx) = mpsc::channel::<WorkerRequest>(8);
        let (_response_tx, response_rx) = mpsc::channel::<WorkerResponse>(8);
        let mut app = App::new(request_tx, response_rx);
        app.casting.replace_batch(sample_batch(9));
        app
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_space_toggles_selection_under_cursor() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Char(' ')));
        assert!(app.casting.is_selected(0));
        handle_event(&mut app, key(KeyCode::Char(' ')));
        assert!(!app.casting.is_selected(0));
    }

    #[test]
    fn test_grid_navigation_stays_in_bounds() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.cursor_slot, 0);

        for _ in 0..20 {
            handle_event(&mut app, key(KeyCode::Char('j')));
        }
        assert!(app.cursor_slot < app.casting.len());
    }

    #[test]
    fn test_tab_switches_panel_and_rewires_keys() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focused_panel, FocusedPanel::Story);

        // j now moves the story field, not the gallery cursor.
        let field_before = app.story_field;
        handle_event(&mut app, key(KeyCode::Char('j')));
        assert_ne!(app.story_field, field_before);
        assert_eq!(app.cursor_slot, 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert_eq!(handle_event(&mut app, key(KeyCode::Char('q'))), EventResult::Quit);

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(handle_event(&mut app, ctrl_c), EventResult::Quit);
    }

    #[test]
    fn test_command_mode_quit() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Char(':')));
        assert_eq!(app.input_mode, InputMode::Command);
        handle_event(&mut app, key(KeyCode::Char('q')));
        handle_event(&mut app, key(KeyCode::Enter));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_toggles_and_swallows_keys() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.has_overlay());

        // Gallery keys don't reach the gallery while an overlay is open.
        handle_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.cursor_slot, 0);

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.has_overlay());
    }

    #[test]
    fn test_editor_submission_closes_overlay() {
        let mut app = test_app();
        app.set_overlay(Overlay::InstructionEditor(InstructionEditor::create()));

        for c in "Critic".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_event(&mut app, key(KeyCode::Enter));

        assert!(!app.has_overlay());
    }
}
