//! Testing utilities for the casting workflow.
//!
//! This module provides tools for integration testing:
//! - [`MockStudio`] for deterministic testing without a backend
//! - Sample card fixtures
//!
//! The mock records every call it receives, so tests can assert not just
//! on resulting state but on which requests were (or were not) issued.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::StudioBackend;
use menagerie_client::{
    Analysis, Caption, CharacterCard, Error, HashtagCollection, HashtagDraft, Instruction,
    InstructionDraft, StoryReceipt, StoryRequest,
};

/// Build a sample character card with the given id.
pub fn sample_card(id: &str) -> CharacterCard {
    CharacterCard {
        id: id.to_string(),
        name: format!("Character {id}"),
        style: "watercolor".to_string(),
        story: format!("The tale of character {id}."),
        character_traits: vec!["curious".to_string(), "loyal".to_string()],
        image_url: format!("http://studio.local/art/{id}.png"),
    }
}

/// Build a batch of `n` sample cards with ids "1".."n".
pub fn sample_batch(n: usize) -> Vec<CharacterCard> {
    (1..=n).map(|i| sample_card(&i.to_string())).collect()
}

/// One request the mock received, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    RandomCharacters {
        count: usize,
    },
    RerollCharacter {
        slot: usize,
        excluded_ids: Vec<String>,
    },
    AnalyzeImage {
        image_url: String,
        instruction_id: Option<String>,
    },
    GenerateCaption {
        image_url: String,
    },
    BeginStory {
        selected_character_ids: Vec<String>,
    },
    Instructions,
    SaveInstruction {
        name: String,
        update: bool,
    },
    DeleteInstruction {
        id: String,
    },
    HashtagCollections,
    CreateHashtagCollection {
        name: String,
    },
}

/// A scripted application failure: HTTP status plus server message.
#[derive(Debug, Clone)]
struct ScriptedFailure {
    status: u16,
    message: String,
}

impl ScriptedFailure {
    fn into_error(self) -> Error {
        Error::Api {
            status: self.status,
            message: self.message,
        }
    }
}

#[derive(Default)]
struct MockState {
    batches: VecDeque<Result<Vec<CharacterCard>, ScriptedFailure>>,
    rerolls: VecDeque<Result<CharacterCard, ScriptedFailure>>,
    analyses: VecDeque<Result<Analysis, ScriptedFailure>>,
    captions: VecDeque<Result<Caption, ScriptedFailure>>,
    stories: VecDeque<Result<StoryReceipt, ScriptedFailure>>,
    instructions: Vec<Instruction>,
    collections: Vec<HashtagCollection>,
    calls: Vec<RecordedCall>,
    minted: usize,
}

impl MockState {
    /// Mint a card id no real batch would contain.
    fn mint_card(&mut self) -> CharacterCard {
        self.minted += 1;
        sample_card(&format!("minted-{}", self.minted))
    }
}

/// A scripted studio backend.
///
/// Queued responses are consumed in order; when a queue runs dry the mock
/// falls back to generating plausible data, so only the interesting steps
/// of a scenario need scripting.
#[derive(Default)]
pub struct MockStudio {
    state: Mutex<MockState>,
}

impl MockStudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch for the next `random_characters` call.
    pub fn queue_batch(&self, cards: Vec<CharacterCard>) {
        self.lock().batches.push_back(Ok(cards));
    }

    /// Fail the next `random_characters` call.
    pub fn fail_next_batch(&self, status: u16, message: impl Into<String>) {
        self.lock().batches.push_back(Err(ScriptedFailure {
            status,
            message: message.into(),
        }));
    }

    /// Queue a replacement card for the next `reroll_character` call.
    pub fn queue_reroll(&self, card: CharacterCard) {
        self.lock().rerolls.push_back(Ok(card));
    }

    /// Fail the next `reroll_character` call.
    pub fn fail_next_reroll(&self, status: u16, message: impl Into<String>) {
        self.lock().rerolls.push_back(Err(ScriptedFailure {
            status,
            message: message.into(),
        }));
    }

    /// Queue an analysis for the next `analyze_image` call.
    pub fn queue_analysis(&self, analysis: Analysis) {
        self.lock().analyses.push_back(Ok(analysis));
    }

    /// Fail the next `analyze_image` call.
    pub fn fail_next_analysis(&self, status: u16, message: impl Into<String>) {
        self.lock().analyses.push_back(Err(ScriptedFailure {
            status,
            message: message.into(),
        }));
    }

    /// Queue a story receipt for the next `begin_story` call.
    pub fn queue_story(&self, story_id: impl Into<String>) {
        self.lock().stories.push_back(Ok(StoryReceipt {
            story_id: story_id.into(),
        }));
    }

    /// Fail the next `begin_story` call.
    pub fn fail_next_story(&self, status: u16, message: impl Into<String>) {
        self.lock().stories.push_back(Err(ScriptedFailure {
            status,
            message: message.into(),
        }));
    }

    /// Seed the instruction preset list.
    pub fn set_instructions(&self, instructions: Vec<Instruction>) {
        self.lock().instructions = instructions;
    }

    /// Seed the hashtag collection list.
    pub fn set_collections(&self, collections: Vec<HashtagCollection>) {
        self.lock().collections = collections;
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// How many requests of any kind have been issued.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

#[async_trait]
impl StudioBackend for MockStudio {
    async fn random_characters(&self, count: usize) -> Result<Vec<CharacterCard>, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::RandomCharacters { count });
        match state.batches.pop_front() {
            Some(Ok(cards)) => Ok(cards),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok((0..count).map(|_| state.mint_card()).collect()),
        }
    }

    async fn reroll_character(
        &self,
        slot: usize,
        excluded_ids: &[String],
    ) -> Result<CharacterCard, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::RerollCharacter {
            slot,
            excluded_ids: excluded_ids.to_vec(),
        });
        match state.rerolls.pop_front() {
            Some(Ok(card)) => Ok(card),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(state.mint_card()),
        }
    }

    async fn analyze_image(
        &self,
        image_url: &str,
        instruction_id: Option<&str>,
    ) -> Result<Analysis, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::AnalyzeImage {
            image_url: image_url.to_string(),
            instruction_id: instruction_id.map(str::to_string),
        });
        match state.analyses.pop_front() {
            Some(Ok(analysis)) => Ok(analysis),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(Analysis {
                name: "Described".to_string(),
                style: "described style".to_string(),
                story: "A described story.".to_string(),
                character_traits: vec!["described".to_string()],
            }),
        }
    }

    async fn generate_caption(
        &self,
        image_url: &str,
        _instruction_id: Option<&str>,
        _hashtag_collection_id: Option<&str>,
    ) -> Result<Caption, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::GenerateCaption {
            image_url: image_url.to_string(),
        });
        match state.captions.pop_front() {
            Some(Ok(caption)) => Ok(caption),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(Caption {
                caption: "A generated caption #Sample".to_string(),
                analysis: Analysis {
                    name: "Captioned".to_string(),
                    style: "captioned style".to_string(),
                    story: String::new(),
                    character_traits: Vec::new(),
                },
            }),
        }
    }

    async fn begin_story(&self, request: &StoryRequest) -> Result<StoryReceipt, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::BeginStory {
            selected_character_ids: request.selected_character_ids.clone(),
        });
        match state.stories.pop_front() {
            Some(Ok(receipt)) => Ok(receipt),
            Some(Err(failure)) => Err(failure.into_error()),
            None => Ok(StoryReceipt {
                story_id: "story-1".to_string(),
            }),
        }
    }

    async fn instructions(&self) -> Result<Vec<Instruction>, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::Instructions);
        Ok(state.instructions.clone())
    }

    async fn save_instruction(&self, draft: &InstructionDraft) -> Result<Instruction, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::SaveInstruction {
            name: draft.name.clone(),
            update: draft.id.is_some(),
        });

        if draft.is_default {
            for existing in &mut state.instructions {
                existing.is_default = false;
            }
        }

        let instruction = match &draft.id {
            Some(id) => {
                let Some(existing) = state.instructions.iter_mut().find(|i| i.id == *id) else {
                    return Err(Error::Api {
                        status: 404,
                        message: "Instruction not found".to_string(),
                    });
                };
                existing.name = draft.name.clone();
                existing.system_prompt = draft.system_prompt.clone();
                existing.user_prompt = draft.user_prompt.clone();
                existing.is_default = draft.is_default;
                existing.clone()
            }
            None => {
                let instruction = Instruction {
                    id: format!("instruction-{}", state.instructions.len() + 1),
                    name: draft.name.clone(),
                    system_prompt: draft.system_prompt.clone(),
                    user_prompt: draft.user_prompt.clone(),
                    is_default: draft.is_default,
                };
                state.instructions.push(instruction.clone());
                instruction
            }
        };

        Ok(instruction)
    }

    async fn delete_instruction(&self, id: &str) -> Result<String, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::DeleteInstruction {
            id: id.to_string(),
        });

        let Some(position) = state.instructions.iter().position(|i| i.id == id) else {
            return Err(Error::Api {
                status: 404,
                message: "Instruction not found".to_string(),
            });
        };
        if state.instructions[position].is_default {
            return Err(Error::Api {
                status: 400,
                message: "Cannot delete default instruction".to_string(),
            });
        }

        let removed = state.instructions.remove(position);
        Ok(format!("Instruction \"{}\" deleted successfully", removed.name))
    }

    async fn hashtag_collections(&self) -> Result<Vec<HashtagCollection>, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::HashtagCollections);
        Ok(state.collections.clone())
    }

    async fn create_hashtag_collection(
        &self,
        draft: &HashtagDraft,
    ) -> Result<HashtagCollection, Error> {
        let mut state = self.lock();
        state.calls.push(RecordedCall::CreateHashtagCollection {
            name: draft.name.clone(),
        });

        if draft.is_default {
            for existing in &mut state.collections {
                existing.is_default = false;
            }
        }

        let collection = HashtagCollection {
            id: format!("collection-{}", state.collections.len() + 1),
            name: draft.name.clone(),
            hashtags: crate::presets::parse_hashtags(&draft.hashtags),
            is_default: draft.is_default,
        };
        state.collections.push(collection.clone());
        Ok(collection)
    }
}
