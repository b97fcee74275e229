//! QA tests against a running studio backend.
//!
//! These exercise the real wire contract end to end:
//! - batch loading and reroll exclusion
//! - image analysis under the default preset
//! - preset listing
//!
//! Run with: `MENAGERIE_URL=http://localhost:5000 cargo test -p menagerie-core studio_live -- --ignored --nocapture`

use menagerie_client::Client;
use menagerie_core::{StudioSession, DEFAULT_BATCH_SIZE};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if a studio URL is configured
fn has_studio() -> bool {
    std::env::var("MENAGERIE_URL").is_ok()
}

#[tokio::test]
#[ignore]
async fn test_live_batch_load() {
    setup();
    if !has_studio() {
        eprintln!("Skipping test: MENAGERIE_URL not set");
        return;
    }

    println!("\n=== Testing Live Batch Load ===\n");

    let mut session = StudioSession::new(Client::from_env());
    let loaded = session
        .load_default_batch()
        .await
        .expect("batch load against live studio");

    println!("SUCCESS: Loaded {loaded} characters");
    for (slot, card) in session.casting().cards().iter().enumerate() {
        println!("  [{slot}] {} - {}", card.name, card.style);
    }

    assert_eq!(loaded, DEFAULT_BATCH_SIZE);
    assert_eq!(session.casting().cast_len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_live_reroll_avoids_visible_ids() {
    setup();
    if !has_studio() {
        eprintln!("Skipping test: MENAGERIE_URL not set");
        return;
    }

    println!("\n=== Testing Live Reroll ===\n");

    let mut session = StudioSession::new(Client::from_env());
    session.load_batch(3).await.expect("batch load");
    let visible = session.casting().excluded_ids();

    session.reroll(0).await.expect("reroll against live studio");

    let fresh = session.casting().card(0).expect("slot 0 populated");
    println!("SUCCESS: Slot 0 is now {} ({})", fresh.name, fresh.id);
    assert!(!visible.contains(&fresh.id));
}

#[tokio::test]
#[ignore]
async fn test_live_preset_listing() {
    setup();
    if !has_studio() {
        eprintln!("Skipping test: MENAGERIE_URL not set");
        return;
    }

    println!("\n=== Testing Live Preset Listing ===\n");

    let mut session = StudioSession::new(Client::from_env());
    session.refresh_presets().await.expect("preset refresh");

    println!(
        "SUCCESS: {} analysis styles, {} hashtag collections",
        session.presets().instructions().len(),
        session.presets().collections().len()
    );

    // A freshly seeded studio always carries a default of each.
    assert!(session.presets().default_instruction().is_some());
}
