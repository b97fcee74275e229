//! Scenario tests for the casting workflow using the scripted mock studio.
//!
//! These cover the observable contract of the workflow:
//! - selection bounds and invertibility
//! - wholesale batch replacement
//! - single-slot reroll with cast eviction
//! - the begin guard (no request without a full cast)
//! - failures leaving state untouched
//! - the per-slot in-flight guard

use menagerie_core::{
    sample_batch, sample_card, MockStudio, NoticeLevel, RecordedCall, SessionError, StoryForm,
    StudioSession, ToggleOutcome, MAX_CAST,
};

async fn session_with_batch(n: usize) -> StudioSession<MockStudio> {
    let studio = MockStudio::new();
    studio.queue_batch(sample_batch(n));
    let mut session = StudioSession::new(studio);
    session.load_batch(n).await.expect("scripted batch load");
    session
}

#[tokio::test]
async fn test_load_batch_fills_nine_slots_and_clears_cast() {
    let studio = MockStudio::new();
    studio.queue_batch(sample_batch(9));
    let mut session = StudioSession::new(studio);

    let loaded = session.load_batch(9).await.unwrap();

    assert_eq!(loaded, 9);
    assert_eq!(session.casting().len(), 9);
    assert_eq!(session.casting().cast_len(), 0);
}

#[tokio::test]
async fn test_reload_clears_previous_selection() {
    let mut session = session_with_batch(3).await;
    session.toggle_select(0);
    session.toggle_select(1);

    session.backend().queue_batch(sample_batch(9));
    session.load_batch(9).await.unwrap();

    assert_eq!(session.casting().len(), 9);
    assert_eq!(session.casting().cast_len(), 0);
}

#[tokio::test]
async fn test_failed_load_leaves_prior_batch_untouched() {
    let mut session = session_with_batch(3).await;
    session.toggle_select(0);
    let cards_before = session.casting().cards().to_vec();

    session.backend().fail_next_batch(503, "generator offline");
    let result = session.load_batch(9).await;

    assert!(result.is_err());
    assert_eq!(session.casting().cards(), cards_before.as_slice());
    assert_eq!(session.casting().cast_len(), 1);

    // The server's own message is surfaced verbatim.
    let notices = session.drain_notices();
    let error = notices
        .iter()
        .find(|n| n.level == NoticeLevel::Error)
        .expect("error notice");
    assert_eq!(error.message, "generator offline");
}

#[tokio::test]
async fn test_selection_never_exceeds_max() {
    let mut session = session_with_batch(9).await;

    for slot in 0..9 {
        session.toggle_select(slot);
    }

    assert_eq!(session.casting().cast_len(), MAX_CAST);
    assert_eq!(session.toggle_select(8), ToggleOutcome::CastFull);
    assert_eq!(session.casting().cast_len(), MAX_CAST);

    let notices = session.drain_notices();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Error && n.message.contains("cast is full")));
}

#[tokio::test]
async fn test_select_then_deselect_restores_prior_cast() {
    let mut session = session_with_batch(3).await;
    session.toggle_select(0);
    let before = session.casting().cast_ids().to_vec();

    session.toggle_select(2);
    session.toggle_select(2);

    assert_eq!(session.casting().cast_ids(), before.as_slice());
}

#[tokio::test]
async fn test_reroll_excludes_every_visible_id() {
    let mut session = session_with_batch(3).await;
    session.backend().queue_reroll(sample_card("fresh"));

    session.reroll(1).await.unwrap();

    let calls = session.backend().calls();
    let reroll = calls
        .iter()
        .find_map(|call| match call {
            RecordedCall::RerollCharacter { slot, excluded_ids } => {
                Some((*slot, excluded_ids.clone()))
            }
            _ => None,
        })
        .expect("reroll was issued");

    assert_eq!(reroll.0, 1);
    assert_eq!(reroll.1, vec!["1", "2", "3"]);
    assert_eq!(session.casting().card(1).unwrap().id, "fresh");
}

#[tokio::test]
async fn test_reroll_of_selected_slot_drops_it_from_cast() {
    let mut session = session_with_batch(3).await;
    session.toggle_select(0);
    session.toggle_select(1);
    session.toggle_select(2);
    assert!(session.casting().cast_complete());

    session.backend().queue_reroll(sample_card("d"));
    session.reroll(1).await.unwrap();

    assert_eq!(session.casting().card(1).unwrap().id, "d");
    assert_eq!(session.casting().cast_len(), 2);
    assert!(!session.casting().cast_complete());

    // Only slot 1 changed.
    assert_eq!(session.casting().card(0).unwrap().id, "1");
    assert_eq!(session.casting().card(2).unwrap().id, "3");
}

#[tokio::test]
async fn test_failed_reroll_leaves_slot_and_cast_untouched() {
    let mut session = session_with_batch(3).await;
    session.toggle_select(1);
    let card_before = session.casting().card(1).unwrap().clone();

    session.backend().fail_next_reroll(404, "No more images available");
    let result = session.reroll(1).await;

    assert!(result.is_err());
    assert_eq!(session.casting().card(1), Some(&card_before));
    assert_eq!(session.casting().cast_len(), 1);
    assert!(!session.casting().slot_busy(1));

    let notices = session.drain_notices();
    assert!(notices
        .iter()
        .any(|n| n.message == "No more images available"));
}

#[tokio::test]
async fn test_describe_overwrites_analysis_fields_only() {
    let mut session = session_with_batch(3).await;
    let before = session.casting().card(0).unwrap().clone();

    session.describe(0, Some("instruction-1")).await.unwrap();

    let after = session.casting().card(0).unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.image_url, before.image_url);
    assert_eq!(after.name, "Described");

    let calls = session.backend().calls();
    assert!(calls.iter().any(|call| matches!(
        call,
        RecordedCall::AnalyzeImage { image_url, instruction_id }
            if *image_url == before.image_url
                && instruction_id.as_deref() == Some("instruction-1")
    )));
}

#[tokio::test]
async fn test_failed_describe_leaves_card_untouched() {
    let mut session = session_with_batch(1).await;
    let before = session.casting().card(0).unwrap().clone();

    session.backend().fail_next_analysis(500, "vision model unavailable");
    let result = session.describe(0, None).await;

    assert!(result.is_err());
    assert_eq!(session.casting().card(0), Some(&before));
    assert!(!session.casting().slot_busy(0));
}

#[tokio::test]
async fn test_begin_issues_no_request_without_full_cast() {
    let mut session = session_with_batch(9).await;
    session.toggle_select(0);
    session.toggle_select(1);
    let calls_before = session.backend().call_count();

    let result = session.begin_adventure(&StoryForm::new()).await;

    assert!(matches!(result, Err(SessionError::CastIncomplete)));
    assert_eq!(session.backend().call_count(), calls_before);
}

#[tokio::test]
async fn test_full_cast_scenario_reaches_story() {
    // Batch of three, select all, begin, navigate by the returned id.
    let studio = MockStudio::new();
    studio.queue_batch(sample_batch(3));
    studio.queue_story("story-42");
    let mut session = StudioSession::new(studio);

    session.load_batch(3).await.unwrap();
    session.toggle_select(0);
    session.toggle_select(1);
    session.toggle_select(2);

    assert_eq!(session.casting().cast_len(), MAX_CAST);
    assert!(session.casting().cast_complete());

    let receipt = session.begin_adventure(&StoryForm::new()).await.unwrap();
    assert_eq!(receipt.story_id, "story-42");

    let calls = session.backend().calls();
    assert!(calls.iter().any(|call| matches!(
        call,
        RecordedCall::BeginStory { selected_character_ids }
            if *selected_character_ids == vec!["1", "2", "3"]
    )));
}

#[tokio::test]
async fn test_failed_begin_keeps_cast_intact() {
    let mut session = session_with_batch(3).await;
    session.toggle_select(0);
    session.toggle_select(1);
    session.toggle_select(2);

    session.backend().fail_next_story(500, "story engine down");
    let result = session.begin_adventure(&StoryForm::new()).await;

    assert!(result.is_err());
    assert!(session.casting().cast_complete());
}

#[tokio::test]
async fn test_slot_guard_blocks_second_reroll_without_request() {
    // Simulate an in-flight reroll by holding the slot busy directly, then
    // verify a session reroll on that slot is rejected before any request.
    let mut session = session_with_batch(3).await;

    // First reroll resolves normally and releases the guard.
    session.backend().queue_reroll(sample_card("x"));
    session.reroll(0).await.unwrap();
    assert!(!session.casting().slot_busy(0));

    // A busy slot rejects new work synchronously.
    let calls_before = session.backend().call_count();
    let mut casting = session.casting().clone();
    assert!(casting.begin_slot_work(1));
    assert!(!casting.begin_slot_work(1));
    assert!(casting.begin_slot_work(2));
    assert_eq!(session.backend().call_count(), calls_before);
}

#[tokio::test]
async fn test_preset_round_trip_through_session() {
    let mut session = StudioSession::new(MockStudio::new());

    let draft = menagerie_client::InstructionDraft {
        id: None,
        name: "Noir critic".to_string(),
        system_prompt: "You are a noir film critic.".to_string(),
        user_prompt: "Describe this artwork.".to_string(),
        is_default: true,
    };
    session.save_instruction(&draft).await.unwrap();

    assert_eq!(session.presets().instructions().len(), 1);
    assert_eq!(
        session.presets().default_instruction().unwrap().name,
        "Noir critic"
    );

    // The default preset refuses deletion; the cache is unchanged.
    let id = session.presets().instructions()[0].id.clone();
    let result = session.delete_instruction(&id).await;
    assert!(result.is_err());
    assert_eq!(session.presets().instructions().len(), 1);
}

#[tokio::test]
async fn test_hashtag_collection_created_from_raw_text() {
    let mut session = StudioSession::new(MockStudio::new());

    let draft = menagerie_client::HashtagDraft {
        name: "Garden tags".to_string(),
        hashtags: "#Garden, #Spring\nnot-a-tag, #Bloom".to_string(),
        is_default: false,
    };
    let collection = session.create_hashtag_collection(&draft).await.unwrap();

    assert_eq!(collection.hashtags, vec!["#Garden", "#Spring", "#Bloom"]);
    assert_eq!(session.presets().collections().len(), 1);
}
