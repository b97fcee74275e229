//! StudioSession - the primary public API for the casting workflow.
//!
//! This module provides a clean, high-level interface over the studio
//! backend: batch loading, per-slot reroll and describe, cast selection,
//! preset management, and story kickoff. It owns the casting state and the
//! notice feed so front-ends only render.

use thiserror::Error;

use crate::backend::StudioBackend;
use crate::casting::{CastingState, ToggleOutcome, DEFAULT_BATCH_SIZE, MAX_CAST};
use crate::presets::PresetLibrary;
use crate::story::StoryForm;
use menagerie_client::{
    Caption, Error as ClientError, HashtagCollection, HashtagDraft, Instruction, InstructionDraft,
    StoryReceipt,
};

/// Errors from StudioSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Studio error: {0}")]
    Backend(#[from] ClientError),

    #[error("no character in slot {0}")]
    EmptySlot(usize),

    #[error("slot {0} already has a request in flight")]
    SlotBusy(usize),

    #[error("the cast needs exactly {MAX_CAST} characters before a story can begin")]
    CastIncomplete,
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A non-blocking notification for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Wording rule for surfaced failures: the server-supplied message
/// verbatim when there is one, otherwise the caller's fallback.
pub fn surface_message(fallback: &str, error: &ClientError) -> String {
    match error.server_message() {
        Some(message) => message.to_string(),
        None => fallback.to_string(),
    }
}

/// A casting session against the studio.
///
/// All five workflow operations live here as named methods, along with the
/// recovered caption and preset-management operations. Network failures
/// leave the in-memory state untouched apart from clearing the busy marker
/// of the slot that triggered the request.
pub struct StudioSession<B> {
    backend: B,
    casting: CastingState,
    presets: PresetLibrary,
    notices: Vec<Notice>,
}

impl<B: StudioBackend> StudioSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            casting: CastingState::new(),
            presets: PresetLibrary::new(),
            notices: Vec::new(),
        }
    }

    /// The backend this session talks to.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The current batch and cast.
    pub fn casting(&self) -> &CastingState {
        &self.casting
    }

    /// Cached instruction presets and hashtag collections.
    pub fn presets(&self) -> &PresetLibrary {
        &self.presets
    }

    /// Take all queued notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replace the batch with `count` freshly generated characters.
    ///
    /// Success clears the cast; failure leaves everything as it was.
    pub async fn load_batch(&mut self, count: usize) -> Result<usize, SessionError> {
        match self.backend.random_characters(count).await {
            Ok(cards) => {
                let loaded = cards.len();
                self.casting.replace_batch(cards);
                self.push(Notice::success(format!("Loaded {loaded} fresh characters")));
                Ok(loaded)
            }
            Err(e) => {
                tracing::warn!(error = %e, "batch load failed");
                self.surface("An error occurred while loading characters", &e);
                Err(e.into())
            }
        }
    }

    /// Load a default-sized batch.
    pub async fn load_default_batch(&mut self) -> Result<usize, SessionError> {
        self.load_batch(DEFAULT_BATCH_SIZE).await
    }

    /// Toggle a slot's card in or out of the cast. Synchronous.
    pub fn toggle_select(&mut self, slot: usize) -> ToggleOutcome {
        let outcome = self.casting.toggle_select(slot);
        match outcome {
            ToggleOutcome::Selected => {
                if let Some(card) = self.casting.card(slot) {
                    let name = card.name.clone();
                    self.push(Notice::success(format!("{name} joins the cast")));
                }
            }
            ToggleOutcome::CastFull => {
                self.push(Notice::error(format!(
                    "The cast is full ({MAX_CAST}/{MAX_CAST}) - deselect a character first"
                )));
            }
            ToggleOutcome::Deselected | ToggleOutcome::NoSuchSlot => {}
        }
        outcome
    }

    /// Replace one slot with a new random character.
    ///
    /// Every visible card id is passed as an exclusion so the studio never
    /// returns an on-screen duplicate. A selected slot that gets replaced
    /// leaves the cast.
    pub async fn reroll(&mut self, slot: usize) -> Result<(), SessionError> {
        if self.casting.card(slot).is_none() {
            return Err(SessionError::EmptySlot(slot));
        }
        if !self.casting.begin_slot_work(slot) {
            return Err(SessionError::SlotBusy(slot));
        }

        let excluded = self.casting.excluded_ids();
        let result = self.backend.reroll_character(slot, &excluded).await;
        self.casting.finish_slot_work(slot);

        match result {
            Ok(card) => {
                self.casting.apply_reroll(slot, card);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(slot, error = %e, "reroll failed");
                self.surface("An error occurred while rerolling the character", &e);
                Err(e.into())
            }
        }
    }

    /// Re-run AI analysis of a slot's image under an instruction preset.
    ///
    /// Success overwrites the card's name, style, story, and traits in
    /// place; the id and image are untouched.
    pub async fn describe(
        &mut self,
        slot: usize,
        instruction_id: Option<&str>,
    ) -> Result<(), SessionError> {
        let image_url = match self.casting.card(slot) {
            Some(card) => card.image_url.clone(),
            None => return Err(SessionError::EmptySlot(slot)),
        };
        if !self.casting.begin_slot_work(slot) {
            return Err(SessionError::SlotBusy(slot));
        }

        let result = self.backend.analyze_image(&image_url, instruction_id).await;
        self.casting.finish_slot_work(slot);

        match result {
            Ok(analysis) => {
                self.casting.apply_analysis(slot, &analysis);
                self.push(Notice::success(format!(
                    "Fresh description for {}",
                    analysis.name
                )));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(slot, error = %e, "describe failed");
                self.surface("An error occurred while analyzing the image", &e);
                Err(e.into())
            }
        }
    }

    /// Generate a social-media caption for a slot's image.
    pub async fn caption(
        &mut self,
        slot: usize,
        instruction_id: Option<&str>,
        hashtag_collection_id: Option<&str>,
    ) -> Result<Caption, SessionError> {
        let image_url = match self.casting.card(slot) {
            Some(card) => card.image_url.clone(),
            None => return Err(SessionError::EmptySlot(slot)),
        };

        match self
            .backend
            .generate_caption(&image_url, instruction_id, hashtag_collection_id)
            .await
        {
            Ok(caption) => {
                self.push(Notice::success("Caption generated"));
                Ok(caption)
            }
            Err(e) => {
                tracing::warn!(slot, error = %e, "caption failed");
                self.surface("An error occurred while generating the caption", &e);
                Err(e.into())
            }
        }
    }

    /// Submit the cast and story form to start a story.
    ///
    /// Issues no request unless the cast has exactly [`MAX_CAST`] members.
    pub async fn begin_adventure(
        &mut self,
        form: &StoryForm,
    ) -> Result<StoryReceipt, SessionError> {
        if !self.casting.cast_complete() {
            return Err(SessionError::CastIncomplete);
        }

        let request = form.to_request(self.casting.cast_ids());
        match self.backend.begin_story(&request).await {
            Ok(receipt) => {
                let story_id = receipt.story_id.clone();
                self.push(Notice::success(format!("Story {story_id} has begun")));
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(error = %e, "begin story failed");
                self.surface("An error occurred while starting the story", &e);
                Err(e.into())
            }
        }
    }

    /// Refetch instruction presets and hashtag collections.
    pub async fn refresh_presets(&mut self) -> Result<(), SessionError> {
        let instructions = match self.backend.instructions().await {
            Ok(list) => list,
            Err(e) => {
                self.surface("Failed to load analysis styles", &e);
                return Err(e.into());
            }
        };
        let collections = match self.backend.hashtag_collections().await {
            Ok(list) => list,
            Err(e) => {
                self.surface("Failed to load hashtag collections", &e);
                return Err(e.into());
            }
        };

        self.presets.replace_instructions(instructions);
        self.presets.replace_collections(collections);
        Ok(())
    }

    /// Create or update an instruction preset, then refresh the cache.
    pub async fn save_instruction(
        &mut self,
        draft: &InstructionDraft,
    ) -> Result<Instruction, SessionError> {
        match self.backend.save_instruction(draft).await {
            Ok(instruction) => {
                self.push(Notice::success("Analysis style saved"));
                self.refresh_presets().await.ok();
                Ok(instruction)
            }
            Err(e) => {
                self.surface("Failed to save the analysis style", &e);
                Err(e.into())
            }
        }
    }

    /// Delete an instruction preset, then refresh the cache.
    pub async fn delete_instruction(&mut self, id: &str) -> Result<(), SessionError> {
        match self.backend.delete_instruction(id).await {
            Ok(message) => {
                self.push(Notice::success(message));
                self.refresh_presets().await.ok();
                Ok(())
            }
            Err(e) => {
                self.surface("Failed to delete the analysis style", &e);
                Err(e.into())
            }
        }
    }

    /// Create a hashtag collection, then refresh the cache.
    pub async fn create_hashtag_collection(
        &mut self,
        draft: &HashtagDraft,
    ) -> Result<HashtagCollection, SessionError> {
        match self.backend.create_hashtag_collection(draft).await {
            Ok(collection) => {
                self.push(Notice::success("Hashtag collection saved"));
                self.refresh_presets().await.ok();
                Ok(collection)
            }
            Err(e) => {
                self.surface("Failed to save the hashtag collection", &e);
                Err(e.into())
            }
        }
    }

    fn push(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn surface(&mut self, fallback: &str, error: &ClientError) {
        let message = surface_message(fallback, error);
        self.push(Notice::error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_message_prefers_server_wording() {
        let api = ClientError::Api {
            status: 404,
            message: "No more images available".to_string(),
        };
        assert_eq!(
            surface_message("fallback", &api),
            "No more images available"
        );

        let network = ClientError::Network("connection refused".to_string());
        assert_eq!(surface_message("fallback", &network), "fallback");
    }
}
