//! The seam between the workflow and the wire.
//!
//! [`StudioBackend`] covers every studio endpoint the workflow uses. The
//! real client implements it by delegation; tests swap in
//! [`crate::testing::MockStudio`].

use async_trait::async_trait;

use menagerie_client::{
    Analysis, Caption, CharacterCard, Client, Error, HashtagCollection, HashtagDraft, Instruction,
    InstructionDraft, StoryReceipt, StoryRequest,
};

/// Async interface to the studio backend.
#[async_trait]
pub trait StudioBackend: Send + Sync {
    async fn random_characters(&self, count: usize) -> Result<Vec<CharacterCard>, Error>;

    async fn reroll_character(
        &self,
        slot: usize,
        excluded_ids: &[String],
    ) -> Result<CharacterCard, Error>;

    async fn analyze_image(
        &self,
        image_url: &str,
        instruction_id: Option<&str>,
    ) -> Result<Analysis, Error>;

    async fn generate_caption(
        &self,
        image_url: &str,
        instruction_id: Option<&str>,
        hashtag_collection_id: Option<&str>,
    ) -> Result<Caption, Error>;

    async fn begin_story(&self, request: &StoryRequest) -> Result<StoryReceipt, Error>;

    async fn instructions(&self) -> Result<Vec<Instruction>, Error>;

    async fn save_instruction(&self, draft: &InstructionDraft) -> Result<Instruction, Error>;

    async fn delete_instruction(&self, id: &str) -> Result<String, Error>;

    async fn hashtag_collections(&self) -> Result<Vec<HashtagCollection>, Error>;

    async fn create_hashtag_collection(
        &self,
        draft: &HashtagDraft,
    ) -> Result<HashtagCollection, Error>;
}

#[async_trait]
impl StudioBackend for Client {
    async fn random_characters(&self, count: usize) -> Result<Vec<CharacterCard>, Error> {
        Client::random_characters(self, count).await
    }

    async fn reroll_character(
        &self,
        slot: usize,
        excluded_ids: &[String],
    ) -> Result<CharacterCard, Error> {
        Client::reroll_character(self, slot, excluded_ids).await
    }

    async fn analyze_image(
        &self,
        image_url: &str,
        instruction_id: Option<&str>,
    ) -> Result<Analysis, Error> {
        Client::analyze_image(self, image_url, instruction_id).await
    }

    async fn generate_caption(
        &self,
        image_url: &str,
        instruction_id: Option<&str>,
        hashtag_collection_id: Option<&str>,
    ) -> Result<Caption, Error> {
        Client::generate_caption(self, image_url, instruction_id, hashtag_collection_id).await
    }

    async fn begin_story(&self, request: &StoryRequest) -> Result<StoryReceipt, Error> {
        Client::begin_story(self, request).await
    }

    async fn instructions(&self) -> Result<Vec<Instruction>, Error> {
        Client::instructions(self).await
    }

    async fn save_instruction(&self, draft: &InstructionDraft) -> Result<Instruction, Error> {
        Client::save_instruction(self, draft).await
    }

    async fn delete_instruction(&self, id: &str) -> Result<String, Error> {
        Client::delete_instruction(self, id).await
    }

    async fn hashtag_collections(&self) -> Result<Vec<HashtagCollection>, Error> {
        Client::hashtag_collections(self).await
    }

    async fn create_hashtag_collection(
        &self,
        draft: &HashtagDraft,
    ) -> Result<HashtagCollection, Error> {
        Client::create_hashtag_collection(self, draft).await
    }
}
