//! Main application state and logic

use std::collections::VecDeque;

use menagerie_core::{
    surface_message, CastingState, Notice, PresetLibrary, StoryChoice, StoryForm, ToggleOutcome,
    CONFLICTS, DEFAULT_BATCH_SIZE, MAX_CAST, MOODS, NARRATIVE_STYLES, SETTINGS,
};
use tokio::sync::mpsc;

use crate::ui::theme::StudioTheme;
use crate::ui::{FocusedPanel, Overlay};
use crate::worker::{WorkerRequest, WorkerResponse};

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - editing a custom story override
    Insert,
    /// Command mode - entering : commands
    Command,
}

/// The four story form dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoryField {
    #[default]
    Conflict,
    Setting,
    NarrativeStyle,
    Mood,
}

impl StoryField {
    pub fn title(&self) -> &'static str {
        match self {
            StoryField::Conflict => "Conflict",
            StoryField::Setting => "Setting",
            StoryField::NarrativeStyle => "Narrative",
            StoryField::Mood => "Mood",
        }
    }

    pub fn options(&self) -> &'static [StoryChoice] {
        match self {
            StoryField::Conflict => CONFLICTS,
            StoryField::Setting => SETTINGS,
            StoryField::NarrativeStyle => NARRATIVE_STYLES,
            StoryField::Mood => MOODS,
        }
    }

    pub fn next(&self) -> StoryField {
        match self {
            StoryField::Conflict => StoryField::Setting,
            StoryField::Setting => StoryField::NarrativeStyle,
            StoryField::NarrativeStyle => StoryField::Mood,
            StoryField::Mood => StoryField::Conflict,
        }
    }

    pub fn prev(&self) -> StoryField {
        match self {
            StoryField::Conflict => StoryField::Mood,
            StoryField::Setting => StoryField::Conflict,
            StoryField::NarrativeStyle => StoryField::Setting,
            StoryField::Mood => StoryField::NarrativeStyle,
        }
    }
}

const NOTICE_HISTORY: usize = 50;

/// Main application state
pub struct App {
    // Channel communication with the studio worker
    pub request_tx: mpsc::Sender<WorkerRequest>,
    pub response_rx: mpsc::Receiver<WorkerResponse>,

    // Workflow state
    pub casting: CastingState,
    pub presets: PresetLibrary,
    pub story_form: StoryForm,

    // UI state
    pub theme: StudioTheme,
    pub focused_panel: FocusedPanel,
    overlay: Option<Overlay>,
    pub cursor_slot: usize,
    pub story_field: StoryField,

    // The preset picked for describe/caption calls, by instruction index
    pub instruction_choice: Option<usize>,
    pub collection_choice: Option<usize>,

    // Input state
    pub input_mode: InputMode,
    input_buffer: String,
    cursor_position: usize,

    // Notices and status
    pub notices: VecDeque<Notice>,
    status_message: Option<String>,
    pub should_quit: bool,

    // In-flight markers for whole-view operations (per-slot markers live
    // in the casting state)
    pub loading_batch: bool,
    pub begin_in_flight: bool,
    pub caption_in_flight: bool,
    pub last_story_id: Option<String>,

    // Animation
    pub animation_frame: u8,
}

impl App {
    /// Create a new application with channel endpoints to the worker.
    pub fn new(
        request_tx: mpsc::Sender<WorkerRequest>,
        response_rx: mpsc::Receiver<WorkerResponse>,
    ) -> Self {
        Self {
            request_tx,
            response_rx,
            casting: CastingState::new(),
            presets: PresetLibrary::new(),
            story_form: StoryForm::new(),
            theme: StudioTheme::default(),
            focused_panel: FocusedPanel::default(),
            overlay: None,
            cursor_slot: 0,
            story_field: StoryField::default(),
            instruction_choice: None,
            collection_choice: None,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            notices: VecDeque::with_capacity(NOTICE_HISTORY),
            status_message: None,
            should_quit: false,
            loading_batch: false,
            begin_in_flight: false,
            caption_in_flight: false,
            last_story_id: None,
            animation_frame: 0,
        }
    }

    // =========================================================================
    // Workflow operations (the command dispatch targets)
    // =========================================================================

    /// Request a fresh batch, replacing the gallery wholesale on success.
    pub fn load_batch(&mut self, count: usize) {
        if self.loading_batch {
            return;
        }
        self.loading_batch = true;
        self.set_status("Summoning characters...");
        if self
            .request_tx
            .try_send(WorkerRequest::LoadBatch { count })
            .is_err()
        {
            self.loading_batch = false;
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Reload the gallery at the default size.
    pub fn reload_gallery(&mut self) {
        self.load_batch(DEFAULT_BATCH_SIZE);
    }

    /// Toggle the card under the cursor in or out of the cast.
    pub fn toggle_select(&mut self) {
        match self.casting.toggle_select(self.cursor_slot) {
            ToggleOutcome::Selected => {
                if let Some(card) = self.casting.card(self.cursor_slot) {
                    let name = card.name.clone();
                    self.push_notice(Notice::success(format!("{name} joins the cast")));
                }
            }
            ToggleOutcome::CastFull => {
                self.push_notice(Notice::error(format!(
                    "The cast is full ({MAX_CAST}/{MAX_CAST}) - deselect a character first"
                )));
            }
            ToggleOutcome::Deselected | ToggleOutcome::NoSuchSlot => {}
        }
    }

    /// Reroll the slot under the cursor.
    ///
    /// Rejected while that slot already has a request in flight; other
    /// slots are unaffected and may reroll concurrently.
    pub fn reroll_slot(&mut self) {
        let slot = self.cursor_slot;
        if !self.casting.begin_slot_work(slot) {
            return;
        }
        let excluded_ids = self.casting.excluded_ids();
        if self
            .request_tx
            .try_send(WorkerRequest::Reroll { slot, excluded_ids })
            .is_err()
        {
            self.casting.finish_slot_work(slot);
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Re-describe the slot under the cursor with the chosen preset.
    pub fn describe_slot(&mut self) {
        let slot = self.cursor_slot;
        let Some(card) = self.casting.card(slot) else {
            return;
        };
        let image_url = card.image_url.clone();
        if !self.casting.begin_slot_work(slot) {
            return;
        }
        let request = WorkerRequest::Describe {
            slot,
            image_url,
            instruction_id: self.chosen_instruction_id(),
        };
        if self.request_tx.try_send(request).is_err() {
            self.casting.finish_slot_work(slot);
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Generate a caption for the slot under the cursor.
    pub fn caption_slot(&mut self) {
        if self.caption_in_flight {
            return;
        }
        let slot = self.cursor_slot;
        let Some(card) = self.casting.card(slot) else {
            return;
        };
        let request = WorkerRequest::Caption {
            slot,
            image_url: card.image_url.clone(),
            instruction_id: self.chosen_instruction_id(),
            hashtag_collection_id: self.chosen_collection_id(),
        };
        if self.request_tx.try_send(request).is_ok() {
            self.caption_in_flight = true;
            self.set_status("Generating caption...");
        } else {
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Submit the cast and story form. Issues nothing unless the cast is
    /// complete and no earlier submission is pending.
    pub fn begin_adventure(&mut self) {
        if self.begin_in_flight {
            return;
        }
        if !self.casting.cast_complete() {
            self.push_notice(Notice::error(format!(
                "Pick {MAX_CAST} characters before beginning the story"
            )));
            return;
        }
        let request = WorkerRequest::BeginStory {
            request: self.story_form.to_request(self.casting.cast_ids()),
        };
        if self.request_tx.try_send(request).is_ok() {
            self.begin_in_flight = true;
            self.set_status("Beginning the story...");
        } else {
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Refetch instruction presets and hashtag collections.
    pub fn refresh_presets(&mut self) {
        let _ = self.request_tx.try_send(WorkerRequest::RefreshPresets);
    }

    /// Submit an instruction draft (create or update).
    pub fn save_instruction(&mut self, draft: menagerie_client::InstructionDraft) {
        if self
            .request_tx
            .try_send(WorkerRequest::SaveInstruction { draft })
            .is_ok()
        {
            self.set_status("Saving analysis style...");
        } else {
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Ask the studio to delete an instruction preset.
    pub fn delete_instruction(&mut self, id: String) {
        if self
            .request_tx
            .try_send(WorkerRequest::DeleteInstruction { id })
            .is_err()
        {
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Submit a hashtag collection draft.
    pub fn create_hashtags(&mut self, draft: menagerie_client::HashtagDraft) {
        if self
            .request_tx
            .try_send(WorkerRequest::CreateHashtags { draft })
            .is_ok()
        {
            self.set_status("Saving hashtag collection...");
        } else {
            self.set_status("Worker busy, please wait...");
        }
    }

    /// Apply a completed worker call to the state.
    pub fn apply_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::BatchLoaded(result) => {
                self.loading_batch = false;
                self.clear_status();
                match result {
                    Ok(cards) => {
                        let loaded = cards.len();
                        self.casting.replace_batch(cards);
                        self.cursor_slot = 0;
                        self.push_notice(Notice::success(format!(
                            "Loaded {loaded} fresh characters"
                        )));
                    }
                    Err(e) => self.surface("An error occurred while loading characters", &e),
                }
            }
            WorkerResponse::Rerolled { slot, result } => {
                self.casting.finish_slot_work(slot);
                match result {
                    Ok(card) => {
                        self.casting.apply_reroll(slot, card);
                    }
                    Err(e) => self.surface("An error occurred while rerolling the character", &e),
                }
            }
            WorkerResponse::Described { slot, result } => {
                self.casting.finish_slot_work(slot);
                match result {
                    Ok(analysis) => {
                        let name = analysis.name.clone();
                        self.casting.apply_analysis(slot, &analysis);
                        self.push_notice(Notice::success(format!("Fresh description for {name}")));
                    }
                    Err(e) => self.surface("An error occurred while analyzing the image", &e),
                }
            }
            WorkerResponse::Captioned { slot: _, result } => {
                self.caption_in_flight = false;
                self.clear_status();
                match result {
                    Ok(caption) => {
                        self.set_overlay(Overlay::Caption {
                            text: caption.caption,
                        });
                    }
                    Err(e) => self.surface("An error occurred while generating the caption", &e),
                }
            }
            WorkerResponse::StoryStarted(result) => {
                self.begin_in_flight = false;
                self.clear_status();
                match result {
                    Ok(receipt) => {
                        self.last_story_id = Some(receipt.story_id.clone());
                        self.push_notice(Notice::success(format!(
                            "Story {} has begun",
                            receipt.story_id
                        )));
                        self.set_overlay(Overlay::StoryStarted {
                            story_id: receipt.story_id,
                        });
                    }
                    Err(e) => self.surface("An error occurred while starting the story", &e),
                }
            }
            WorkerResponse::PresetsRefreshed(result) => match result {
                Ok((instructions, collections)) => {
                    self.presets.replace_instructions(instructions);
                    self.presets.replace_collections(collections);
                    self.clamp_preset_choices();
                }
                Err(e) => self.surface("Failed to load analysis styles", &e),
            },
            WorkerResponse::InstructionSaved(result) => match result {
                Ok(_) => {
                    self.push_notice(Notice::success("Analysis style saved"));
                    self.refresh_presets();
                }
                Err(e) => self.surface("Failed to save the analysis style", &e),
            },
            WorkerResponse::InstructionDeleted(result) => match result {
                Ok(message) => {
                    self.push_notice(Notice::success(message));
                    self.refresh_presets();
                }
                Err(e) => self.surface("Failed to delete the analysis style", &e),
            },
            WorkerResponse::HashtagsCreated(result) => match result {
                Ok(_) => {
                    self.push_notice(Notice::success("Hashtag collection saved"));
                    self.refresh_presets();
                }
                Err(e) => self.surface("Failed to save the hashtag collection", &e),
            },
        }
    }

    /// The instruction id describe/caption calls should use.
    pub fn chosen_instruction_id(&self) -> Option<String> {
        let instructions = self.presets.instructions();
        match self.instruction_choice {
            Some(index) => instructions.get(index).map(|i| i.id.clone()),
            None => None,
        }
    }

    pub fn chosen_collection_id(&self) -> Option<String> {
        let collections = self.presets.collections();
        match self.collection_choice {
            Some(index) => collections.get(index).map(|c| c.id.clone()),
            None => None,
        }
    }

    fn clamp_preset_choices(&mut self) {
        if let Some(index) = self.instruction_choice {
            if index >= self.presets.instructions().len() {
                self.instruction_choice = None;
            }
        }
        if let Some(index) = self.collection_choice {
            if index >= self.presets.collections().len() {
                self.collection_choice = None;
            }
        }
    }

    // =========================================================================
    // Gallery navigation
    // =========================================================================

    /// Columns in the gallery grid.
    pub const GALLERY_COLUMNS: usize = 3;

    pub fn cursor_left(&mut self) {
        self.cursor_slot = self.cursor_slot.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor_slot + 1 < self.casting.len() {
            self.cursor_slot += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor_slot = self.cursor_slot.saturating_sub(Self::GALLERY_COLUMNS);
    }

    pub fn cursor_down(&mut self) {
        let next = self.cursor_slot + Self::GALLERY_COLUMNS;
        if next < self.casting.len() {
            self.cursor_slot = next;
        }
    }

    // =========================================================================
    // Story form editing
    // =========================================================================

    /// Cycle the focused story field through its option list.
    pub fn cycle_story_choice(&mut self, forward: bool) {
        let options = self.story_field.options();
        if options.is_empty() {
            return;
        }
        let current_label = self.story_value(self.story_field).to_string();
        let current = options
            .iter()
            .position(|choice| choice.label == current_label)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        let label = options[next].label.to_string();
        *self.story_value_mut(self.story_field) = label;
    }

    /// The picked option for a field.
    pub fn story_value(&self, field: StoryField) -> &str {
        match field {
            StoryField::Conflict => &self.story_form.conflict,
            StoryField::Setting => &self.story_form.setting,
            StoryField::NarrativeStyle => &self.story_form.narrative_style,
            StoryField::Mood => &self.story_form.mood,
        }
    }

    fn story_value_mut(&mut self, field: StoryField) -> &mut String {
        match field {
            StoryField::Conflict => &mut self.story_form.conflict,
            StoryField::Setting => &mut self.story_form.setting,
            StoryField::NarrativeStyle => &mut self.story_form.narrative_style,
            StoryField::Mood => &mut self.story_form.mood,
        }
    }

    /// The custom override for a field.
    pub fn story_override(&self, field: StoryField) -> &str {
        match field {
            StoryField::Conflict => &self.story_form.custom_conflict,
            StoryField::Setting => &self.story_form.custom_setting,
            StoryField::NarrativeStyle => &self.story_form.custom_narrative,
            StoryField::Mood => &self.story_form.custom_mood,
        }
    }

    fn story_override_mut(&mut self, field: StoryField) -> &mut String {
        match field {
            StoryField::Conflict => &mut self.story_form.custom_conflict,
            StoryField::Setting => &mut self.story_form.custom_setting,
            StoryField::NarrativeStyle => &mut self.story_form.custom_narrative,
            StoryField::Mood => &mut self.story_form.custom_mood,
        }
    }

    /// Start editing the focused field's custom override.
    pub fn enter_insert_mode(&mut self) {
        self.input_mode = InputMode::Insert;
        self.input_buffer = self.story_override(self.story_field).to_string();
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Commit the edited override to the story form.
    pub fn commit_override(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        *self.story_override_mut(self.story_field) = value;
        self.cursor_position = 0;
        self.input_mode = InputMode::Normal;
    }

    /// Enter command mode (starts with :)
    pub fn enter_command_mode(&mut self) {
        self.input_mode = InputMode::Command;
        self.input_buffer.clear();
        self.input_buffer.push(':');
        self.cursor_position = 1;
    }

    /// Exit to normal mode
    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.cursor_position = 0;
    }

    /// Process a colon command.
    pub fn process_command(&mut self, command: &str) {
        let cmd = command.trim_start_matches(':');
        let parts: Vec<&str> = cmd.split_whitespace().collect();

        match parts.first().copied() {
            Some("q") | Some("quit") | Some("exit") => {
                self.should_quit = true;
            }
            Some("reload") | Some("load") => {
                let count = parts
                    .get(1)
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(DEFAULT_BATCH_SIZE);
                self.load_batch(count);
            }
            Some("presets") => {
                self.refresh_presets();
                self.set_overlay(Overlay::PresetManager { index: 0 });
            }
            Some("help") | Some("h") => {
                self.set_overlay(Overlay::Help);
            }
            Some(other) => {
                self.set_status(format!("Unknown command: {other}"));
            }
            None => {}
        }
    }

    // =========================================================================
    // Text input (unicode-safe)
    // =========================================================================

    /// Handle a typed character
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position)
            {
                self.input_buffer
                    .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    /// Move input cursor left
    pub fn input_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move input cursor right
    pub fn input_cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    /// Take the current input, leaving the buffer empty.
    pub fn submit_input(&mut self) -> Option<String> {
        if self.input_buffer.is_empty() {
            return None;
        }
        self.cursor_position = 0;
        Some(std::mem::take(&mut self.input_buffer))
    }

    // =========================================================================
    // Notices, status, overlays
    // =========================================================================

    /// Queue a notice and echo it on the status line.
    pub fn push_notice(&mut self, notice: Notice) {
        self.set_status(notice.message.clone());
        self.notices.push_front(notice);
        if self.notices.len() > NOTICE_HISTORY {
            self.notices.pop_back();
        }
    }

    fn surface(&mut self, fallback: &str, error: &menagerie_client::Error) {
        tracing::warn!(error = %error, "studio call failed");
        let message = surface_message(fallback, error);
        self.push_notice(Notice::error(message));
    }

    /// The most recent notice, for the status bar.
    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    /// Set status message (always overwrites)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Get the current status message
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Get the current input buffer
    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    /// Get the current input cursor position
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Get the current overlay
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Get mutable access to the overlay (editors mutate in place)
    pub fn overlay_mut(&mut self) -> Option<&mut Overlay> {
        self.overlay.as_mut()
    }

    /// Set the overlay
    pub fn set_overlay(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
    }

    /// Close any open overlay
    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Check if an overlay is currently open
    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    /// Cycle to the other main panel
    pub fn cycle_focus(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Gallery => FocusedPanel::Story,
            FocusedPanel::Story => FocusedPanel::Gallery,
        };
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{WorkerRequest, WorkerResponse};
    use menagerie_core::sample_batch;

    fn test_app() -> (App, mpsc::Receiver<WorkerRequest>) {
        let (request_tx, request_rx) = mpsc::channel(8);
        let (_response_tx, response_rx) = mpsc::channel::<WorkerResponse>(8);
        (App::new(request_tx, response_rx), request_rx)
    }

    fn drain_requests(rx: &mut mpsc::Receiver<WorkerRequest>) -> Vec<WorkerRequest> {
        let mut requests = Vec::new();
        while let Ok(request) = rx.try_recv() {
            requests.push(request);
        }
        requests
    }

    #[test]
    fn test_begin_issues_nothing_without_full_cast() {
        let (mut app, mut rx) = test_app();
        app.casting.replace_batch(sample_batch(9));
        app.cursor_slot = 0;
        app.toggle_select();

        app.begin_adventure();

        assert!(!app.begin_in_flight);
        assert!(drain_requests(&mut rx).is_empty());
    }

    #[test]
    fn test_begin_submits_full_cast_once() {
        let (mut app, mut rx) = test_app();
        app.casting.replace_batch(sample_batch(3));
        for slot in 0..3 {
            app.cursor_slot = slot;
            app.toggle_select();
        }

        app.begin_adventure();
        // A second press while the first is pending is swallowed.
        app.begin_adventure();

        assert!(app.begin_in_flight);
        let requests = drain_requests(&mut rx);
        assert_eq!(requests.len(), 1);
        match &requests[0] {
            WorkerRequest::BeginStory { request } => {
                assert_eq!(request.selected_character_ids, vec!["1", "2", "3"]);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_reroll_guard_blocks_same_slot_only() {
        let (mut app, mut rx) = test_app();
        app.casting.replace_batch(sample_batch(3));

        app.cursor_slot = 1;
        app.reroll_slot();
        app.reroll_slot();
        app.cursor_slot = 2;
        app.reroll_slot();

        let requests = drain_requests(&mut rx);
        assert_eq!(requests.len(), 2);
        assert!(app.casting.slot_busy(1));
        assert!(app.casting.slot_busy(2));
        assert!(!app.casting.slot_busy(0));
    }

    #[test]
    fn test_reroll_response_releases_guard_and_evicts() {
        let (mut app, _rx) = test_app();
        app.casting.replace_batch(sample_batch(3));
        app.cursor_slot = 1;
        app.toggle_select();
        app.reroll_slot();

        app.apply_response(WorkerResponse::Rerolled {
            slot: 1,
            result: Ok(menagerie_core::sample_card("fresh")),
        });

        assert!(!app.casting.slot_busy(1));
        assert_eq!(app.casting.card(1).unwrap().id, "fresh");
        assert_eq!(app.casting.cast_len(), 0);
    }

    #[test]
    fn test_failed_response_resets_busy_and_keeps_state() {
        let (mut app, _rx) = test_app();
        app.casting.replace_batch(sample_batch(3));
        let before = app.casting.cards().to_vec();
        app.cursor_slot = 0;
        app.reroll_slot();

        app.apply_response(WorkerResponse::Rerolled {
            slot: 0,
            result: Err(menagerie_client::Error::Network("boom".to_string())),
        });

        assert!(!app.casting.slot_busy(0));
        assert_eq!(app.casting.cards(), before.as_slice());
        assert_eq!(
            app.latest_notice().unwrap().message,
            "An error occurred while rerolling the character"
        );
    }

    #[test]
    fn test_story_choice_cycles_through_options() {
        let (mut app, _rx) = test_app();
        let first = app.story_form.conflict.clone();

        app.cycle_story_choice(true);
        assert_ne!(app.story_form.conflict, first);

        app.cycle_story_choice(false);
        assert_eq!(app.story_form.conflict, first);
    }

    #[test]
    fn test_override_commit_round_trip() {
        let (mut app, _rx) = test_app();
        app.story_field = StoryField::Mood;
        app.enter_insert_mode();
        for c in "wistful".chars() {
            app.type_char(c);
        }
        app.commit_override();

        assert_eq!(app.story_form.custom_mood, "wistful");
        assert_eq!(app.story_form.resolved_mood(), "wistful");
        assert_eq!(app.input_mode, InputMode::Normal);
    }
}
