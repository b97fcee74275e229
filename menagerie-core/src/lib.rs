//! Casting workflow engine for Menagerie.
//!
//! This crate provides:
//! - The casting state machine (batch, cast, per-slot busy guards)
//! - A high-level [`StudioSession`] exposing every workflow operation
//! - The [`StudioBackend`] seam between workflow and wire
//! - A scripted [`MockStudio`] for deterministic tests
//!
//! # Quick Start
//!
//! ```ignore
//! use menagerie_client::Client;
//! use menagerie_core::{StoryForm, StudioSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = StudioSession::new(Client::from_env());
//!
//!     session.load_default_batch().await?;
//!     session.toggle_select(0);
//!     session.toggle_select(1);
//!     session.toggle_select(2);
//!
//!     let receipt = session.begin_adventure(&StoryForm::new()).await?;
//!     println!("story started: {}", receipt.story_id);
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod casting;
pub mod presets;
pub mod session;
pub mod story;
pub mod testing;

// Primary public API
pub use backend::StudioBackend;
pub use casting::{CastingState, ToggleOutcome, DEFAULT_BATCH_SIZE, MAX_CAST};
pub use presets::{parse_hashtags, PresetLibrary};
pub use session::{surface_message, Notice, NoticeLevel, SessionError, StudioSession};
pub use story::{StoryChoice, StoryForm, CONFLICTS, MOODS, NARRATIVE_STYLES, SETTINGS};
pub use testing::{sample_batch, sample_card, MockStudio, RecordedCall};
