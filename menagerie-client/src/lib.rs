//! Typed client for the Menagerie studio backend.
//!
//! This crate provides a focused client for the studio's REST API with:
//! - Character batch generation and per-slot rerolls
//! - Image analysis and caption generation
//! - Story kickoff
//! - Instruction preset and hashtag collection management
//!
//! Every response carries a `success` flag; the client folds transport
//! failures and application-level failures into one [`Error`] type so
//! callers surface both the same way.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const BASE_URL_ENV: &str = "MENAGERIE_URL";

/// Fallback notice text when the backend fails without an error message.
pub const GENERIC_ERROR: &str = "The studio did not say what went wrong";

/// Errors that can occur when talking to the studio.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Studio error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// The server-supplied message for application failures, if any.
    ///
    /// Transport and parse failures have no server message; callers fall
    /// back to their own wording for those.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Studio API client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a new client for the studio at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .connect_timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from the `MENAGERIE_URL` environment variable,
    /// falling back to the local development address.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a batch of freshly generated character cards.
    pub async fn random_characters(&self, count: usize) -> Result<Vec<CharacterCard>, Error> {
        tracing::debug!(count, "requesting random characters");
        let response = self
            .http
            .get(self.url("/get_random_images"))
            .headers(self.headers())
            .query(&[("count", count)])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self.expect::<ImageBatch>(response).await?.images)
    }

    /// Fetch a single replacement character for a slot.
    ///
    /// `excluded_ids` should list every card currently visible so the
    /// studio never returns a duplicate of an on-screen character.
    pub async fn reroll_character(
        &self,
        slot: usize,
        excluded_ids: &[String],
    ) -> Result<CharacterCard, Error> {
        tracing::debug!(slot, excluded = excluded_ids.len(), "rerolling character");
        let query: Vec<(&str, &str)> = excluded_ids
            .iter()
            .map(|id| ("excluded_ids[]", id.as_str()))
            .collect();

        let response = self
            .http
            .get(self.url(&format!("/reroll_image/{slot}")))
            .headers(self.headers())
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self.expect::<SingleImage>(response).await?.image)
    }

    /// Run AI analysis of an image, optionally under an instruction preset.
    pub async fn analyze_image(
        &self,
        image_url: &str,
        instruction_id: Option<&str>,
    ) -> Result<Analysis, Error> {
        tracing::debug!(image_url, ?instruction_id, "analyzing image");
        let body = AnalyzeRequest {
            image_url,
            instruction_id,
        };

        let response = self
            .http
            .post(self.url("/analyze_image"))
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self.expect::<AnalysisEnvelope>(response).await?.analysis)
    }

    /// Generate a social-media caption for an image.
    pub async fn generate_caption(
        &self,
        image_url: &str,
        instruction_id: Option<&str>,
        hashtag_collection_id: Option<&str>,
    ) -> Result<Caption, Error> {
        tracing::debug!(image_url, "generating caption");
        let mut form: Vec<(&str, &str)> = vec![("image_url", image_url)];
        if let Some(id) = instruction_id {
            form.push(("instruction_id", id));
        }
        if let Some(id) = hashtag_collection_id {
            form.push(("hashtag_collection_id", id));
        }

        let response = self
            .http
            .post(self.url("/generate"))
            .headers(self.headers())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        self.expect::<Caption>(response).await
    }

    /// Submit the cast and story form to start a story.
    pub async fn begin_story(&self, request: &StoryRequest) -> Result<StoryReceipt, Error> {
        tracing::debug!(cast = request.selected_character_ids.len(), "beginning story");
        let response = self
            .http
            .post(self.url("/begin_story"))
            .headers(self.headers())
            .form(&request.form_fields())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        self.expect::<StoryReceipt>(response).await
    }

    /// List every instruction preset.
    pub async fn instructions(&self) -> Result<Vec<Instruction>, Error> {
        let response = self
            .http
            .get(self.url("/manage/instructions"))
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self
            .expect::<InstructionList>(response)
            .await?
            .instructions)
    }

    /// Create or update an instruction preset.
    ///
    /// A draft with an id updates the existing preset (PUT); one without
    /// creates a new preset (POST).
    pub async fn save_instruction(&self, draft: &InstructionDraft) -> Result<Instruction, Error> {
        let builder = if draft.id.is_some() {
            self.http.put(self.url("/manage/instructions"))
        } else {
            self.http.post(self.url("/manage/instructions"))
        };

        let response = builder
            .headers(self.headers())
            .json(draft)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self
            .expect::<InstructionEnvelope>(response)
            .await?
            .instruction)
    }

    /// Delete an instruction preset. The studio refuses to delete the
    /// default preset.
    pub async fn delete_instruction(&self, id: &str) -> Result<String, Error> {
        let response = self
            .http
            .delete(self.url("/manage/instructions"))
            .headers(self.headers())
            .json(&DeleteRequest { id })
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self.expect::<DeleteReceipt>(response).await?.message)
    }

    /// List every hashtag collection.
    pub async fn hashtag_collections(&self) -> Result<Vec<HashtagCollection>, Error> {
        let response = self
            .http
            .get(self.url("/manage/hashtags"))
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self.expect::<CollectionList>(response).await?.collections)
    }

    /// Create a hashtag collection from a draft.
    pub async fn create_hashtag_collection(
        &self,
        draft: &HashtagDraft,
    ) -> Result<HashtagCollection, Error> {
        let response = self
            .http
            .post(self.url("/manage/hashtags"))
            .headers(self.headers())
            .json(draft)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(self.expect::<CollectionEnvelope>(response).await?.collection)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Check transport status and the application `success` flag, then
    /// deserialize the payload.
    async fn expect<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, Error> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let ack: Ack = serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;
        if !ack.success {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
    }
}

/// Pull the server-supplied error message out of a failure body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<FailureBody>(body)
        .ok()
        .and_then(|f| f.error)
        .unwrap_or_else(|| GENERIC_ERROR.to_string())
}

// ============================================================================
// Public types
// ============================================================================

/// A single AI-generated persona: name, visual style, traits, and artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCard {
    pub id: String,
    pub name: String,
    pub style: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub character_traits: Vec<String>,
    pub image_url: String,
}

impl CharacterCard {
    /// Overwrite the analysis-derived fields from a fresh analysis.
    ///
    /// The id and image URL identify the artwork and never change here.
    pub fn apply_analysis(&mut self, analysis: &Analysis) {
        self.name = analysis.name.clone();
        self.style = analysis.style.clone();
        self.story = analysis.story.clone();
        self.character_traits = analysis.character_traits.clone();
    }
}

/// Result of AI analysis of one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub name: String,
    pub style: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub character_traits: Vec<String>,
}

/// A generated caption plus the analysis it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Caption {
    pub caption: String,
    pub analysis: Analysis,
}

/// A named system/user prompt pair controlling how images are analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub user_prompt: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Payload for creating (no id) or updating (with id) an instruction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InstructionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub is_default: bool,
}

/// A named set of hashtags appended to generated captions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// Payload for creating a hashtag collection.
///
/// `hashtags` is the raw text the user typed; the studio splits it on
/// commas and newlines and keeps only `#`-prefixed tokens.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HashtagDraft {
    pub name: String,
    pub hashtags: String,
    pub is_default: bool,
}

/// Story kickoff form: the chosen options, optional custom overrides, and
/// the cast of selected character ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryRequest {
    pub conflict: String,
    pub setting: String,
    pub narrative_style: String,
    pub mood: String,
    pub custom_conflict: String,
    pub custom_setting: String,
    pub custom_narrative: String,
    pub custom_mood: String,
    pub selected_character_ids: Vec<String>,
}

impl StoryRequest {
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("conflict", self.conflict.clone()),
            ("setting", self.setting.clone()),
            ("narrative_style", self.narrative_style.clone()),
            ("mood", self.mood.clone()),
            ("custom_conflict", self.custom_conflict.clone()),
            ("custom_setting", self.custom_setting.clone()),
            ("custom_narrative", self.custom_narrative.clone()),
            ("custom_mood", self.custom_mood.clone()),
            (
                "selected_character_ids",
                self.selected_character_ids.join(","),
            ),
        ]
    }
}

/// Identifier of a freshly started story.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoryReceipt {
    pub story_id: String,
}

// ============================================================================
// Internal wire types
// ============================================================================

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default = "default_true")]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct FailureBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageBatch {
    images: Vec<CharacterCard>,
}

#[derive(Debug, Deserialize)]
struct SingleImage {
    image: CharacterCard,
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    image_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instruction_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AnalysisEnvelope {
    analysis: Analysis,
}

#[derive(Debug, Deserialize)]
struct InstructionList {
    instructions: Vec<Instruction>,
}

#[derive(Debug, Deserialize)]
struct InstructionEnvelope {
    instruction: Instruction,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    id: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeleteReceipt {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CollectionList {
    collections: Vec<HashtagCollection>,
}

#[derive(Debug, Deserialize)]
struct CollectionEnvelope {
    collection: HashtagCollection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = Client::new("http://studio.local/");
        assert_eq!(client.base_url(), "http://studio.local");
        assert_eq!(client.url("/get_random_images"), "http://studio.local/get_random_images");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error": "No more images available"}"#),
            "No more images available"
        );
        assert_eq!(error_message(r#"{"success": false}"#), GENERIC_ERROR);
        assert_eq!(error_message("<html>gateway timeout</html>"), GENERIC_ERROR);
    }

    #[test]
    fn test_card_deserialize_with_missing_optionals() {
        let card: CharacterCard = serde_json::from_str(
            r#"{"id": "7", "name": "Biscuit", "style": "watercolor", "image_url": "http://x/7.png"}"#,
        )
        .unwrap();
        assert_eq!(card.id, "7");
        assert!(card.story.is_empty());
        assert!(card.character_traits.is_empty());
    }

    #[test]
    fn test_apply_analysis_keeps_identity() {
        let mut card: CharacterCard = serde_json::from_str(
            r#"{"id": "7", "name": "Biscuit", "style": "watercolor", "image_url": "http://x/7.png"}"#,
        )
        .unwrap();
        let analysis = Analysis {
            name: "Captain Biscuit".to_string(),
            style: "oil on canvas".to_string(),
            story: "A seafaring terrier.".to_string(),
            character_traits: vec!["brave".to_string(), "salty".to_string()],
        };

        card.apply_analysis(&analysis);

        assert_eq!(card.id, "7");
        assert_eq!(card.image_url, "http://x/7.png");
        assert_eq!(card.name, "Captain Biscuit");
        assert_eq!(card.character_traits.len(), 2);
    }

    #[test]
    fn test_story_request_joins_cast_ids() {
        let request = StoryRequest {
            conflict: "Squirrel gang's mischief".to_string(),
            selected_character_ids: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ..Default::default()
        };

        let fields = request.form_fields();
        let ids = fields
            .iter()
            .find(|(k, _)| *k == "selected_character_ids")
            .map(|(_, v)| v.clone())
            .unwrap();
        assert_eq!(ids, "a,b,c");
    }

    #[test]
    fn test_instruction_draft_omits_missing_id() {
        let draft = InstructionDraft {
            name: "Portrait critic".to_string(),
            system_prompt: "You are an art critic.".to_string(),
            user_prompt: "Analyze this artwork.".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["name"], "Portrait critic");
    }

    #[test]
    fn test_success_flag_defaults_to_true() {
        let ack: Ack = serde_json::from_str(r#"{"images": []}"#).unwrap();
        assert!(ack.success);
        let ack: Ack = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!ack.success);
    }
}
