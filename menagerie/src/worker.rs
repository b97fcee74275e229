//! Background worker bridging the UI event loop and the studio client.
//!
//! The UI thread never awaits a network call. Requests go out over a
//! channel; each one runs on its own tokio task, so a reroll on slot 4 and
//! a reroll on slot 7 are independent and may complete in either order.
//! Same-slot ordering is enforced upstream by the casting state's per-slot
//! guard, not here.

use menagerie_client::{
    Analysis, Caption, CharacterCard, Client, Error, HashtagCollection, HashtagDraft, Instruction,
    InstructionDraft, StoryReceipt, StoryRequest,
};
use tokio::sync::mpsc;

const CHANNEL_CAPACITY: usize = 32;

/// A request from the UI to the studio.
#[derive(Debug)]
pub enum WorkerRequest {
    LoadBatch {
        count: usize,
    },
    Reroll {
        slot: usize,
        excluded_ids: Vec<String>,
    },
    Describe {
        slot: usize,
        image_url: String,
        instruction_id: Option<String>,
    },
    Caption {
        slot: usize,
        image_url: String,
        instruction_id: Option<String>,
        hashtag_collection_id: Option<String>,
    },
    BeginStory {
        request: StoryRequest,
    },
    RefreshPresets,
    SaveInstruction {
        draft: InstructionDraft,
    },
    DeleteInstruction {
        id: String,
    },
    CreateHashtags {
        draft: HashtagDraft,
    },
}

/// A completed studio call, successful or not.
#[derive(Debug)]
pub enum WorkerResponse {
    BatchLoaded(Result<Vec<CharacterCard>, Error>),
    Rerolled {
        slot: usize,
        result: Result<CharacterCard, Error>,
    },
    Described {
        slot: usize,
        result: Result<Analysis, Error>,
    },
    Captioned {
        slot: usize,
        result: Result<Caption, Error>,
    },
    StoryStarted(Result<StoryReceipt, Error>),
    PresetsRefreshed(Result<(Vec<Instruction>, Vec<HashtagCollection>), Error>),
    InstructionSaved(Result<Instruction, Error>),
    InstructionDeleted(Result<String, Error>),
    HashtagsCreated(Result<HashtagCollection, Error>),
}

/// Start the worker and hand back the UI's channel endpoints.
pub fn spawn(client: Client) -> (mpsc::Sender<WorkerRequest>, mpsc::Receiver<WorkerResponse>) {
    let (request_tx, mut request_rx) = mpsc::channel::<WorkerRequest>(CHANNEL_CAPACITY);
    let (response_tx, response_rx) = mpsc::channel::<WorkerResponse>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        while let Some(request) = request_rx.recv().await {
            let client = client.clone();
            let response_tx = response_tx.clone();
            tokio::spawn(async move {
                let response = handle(&client, request).await;
                let _ = response_tx.send(response).await;
            });
        }
    });

    (request_tx, response_rx)
}

async fn handle(client: &Client, request: WorkerRequest) -> WorkerResponse {
    match request {
        WorkerRequest::LoadBatch { count } => {
            WorkerResponse::BatchLoaded(client.random_characters(count).await)
        }
        WorkerRequest::Reroll { slot, excluded_ids } => WorkerResponse::Rerolled {
            slot,
            result: client.reroll_character(slot, &excluded_ids).await,
        },
        WorkerRequest::Describe {
            slot,
            image_url,
            instruction_id,
        } => WorkerResponse::Described {
            slot,
            result: client
                .analyze_image(&image_url, instruction_id.as_deref())
                .await,
        },
        WorkerRequest::Caption {
            slot,
            image_url,
            instruction_id,
            hashtag_collection_id,
        } => WorkerResponse::Captioned {
            slot,
            result: client
                .generate_caption(
                    &image_url,
                    instruction_id.as_deref(),
                    hashtag_collection_id.as_deref(),
                )
                .await,
        },
        WorkerRequest::BeginStory { request } => {
            WorkerResponse::StoryStarted(client.begin_story(&request).await)
        }
        WorkerRequest::RefreshPresets => {
            let result: Result<_, Error> = async {
                let instructions = client.instructions().await?;
                let collections = client.hashtag_collections().await?;
                Ok((instructions, collections))
            }
            .await;
            WorkerResponse::PresetsRefreshed(result)
        }
        WorkerRequest::SaveInstruction { draft } => {
            WorkerResponse::InstructionSaved(client.save_instruction(&draft).await)
        }
        WorkerRequest::DeleteInstruction { id } => {
            WorkerResponse::InstructionDeleted(client.delete_instruction(&id).await)
        }
        WorkerRequest::CreateHashtags { draft } => {
            WorkerResponse::HashtagsCreated(client.create_hashtag_collection(&draft).await)
        }
    }
}
