//! Headless mode for the casting studio.
//!
//! This module provides a simple line-oriented interface for running the
//! workflow without a TUI. It's designed for automated testing and
//! scripted sessions: every command starts with `#`, output lines are
//! tagged, and each operation's notices are echoed as they happen.

use std::io::{self, BufRead, Write};

use menagerie_client::Client;
use menagerie_core::{
    NoticeLevel, SessionError, StoryForm, StudioSession, DEFAULT_BATCH_SIZE, MAX_CAST,
};

/// Run the studio in headless mode.
pub async fn run_headless(client: Client) -> Result<(), SessionError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut session = StudioSession::new(client);
    let mut form = StoryForm::new();

    println!("=== Menagerie Headless Mode ===");
    println!("Studio: {}", session.backend().base_url());
    println!();

    // Initial load; a failure is not fatal, #load retries.
    if session.load_default_batch().await.is_ok() {
        print_gallery(&session);
    }
    flush_notices(&mut session);
    session.refresh_presets().await.ok();
    flush_notices(&mut session);

    print_help();
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            match parts.first().copied() {
                Some("quit") | Some("exit") => {
                    println!("Goodbye!");
                    break;
                }
                Some("load") => {
                    let count = parts
                        .get(1)
                        .and_then(|n| n.parse().ok())
                        .unwrap_or(DEFAULT_BATCH_SIZE);
                    if session.load_batch(count).await.is_ok() {
                        print_gallery(&session);
                    }
                }
                Some("select") => {
                    if let Some(slot) = parse_slot(&parts, &session) {
                        session.toggle_select(slot);
                        print_cast(&session);
                    }
                }
                Some("cast") => print_cast(&session),
                Some("reroll") => {
                    if let Some(slot) = parse_slot(&parts, &session) {
                        if session.reroll(slot).await.is_ok() {
                            print_card(&session, slot);
                            print_cast(&session);
                        }
                    }
                }
                Some("describe") => {
                    if let Some(slot) = parse_slot(&parts, &session) {
                        let instruction_id = parts.get(2).map(|s| s.to_string());
                        if session.describe(slot, instruction_id.as_deref()).await.is_ok() {
                            print_card(&session, slot);
                        }
                    }
                }
                Some("caption") => {
                    if let Some(slot) = parse_slot(&parts, &session) {
                        if let Ok(caption) = session.caption(slot, None, None).await {
                            println!("[CAPTION]");
                            println!("{}", caption.caption);
                        }
                    }
                }
                Some("styles") => {
                    println!("[STYLES]");
                    for instruction in session.presets().instructions() {
                        let default = if instruction.is_default { " (default)" } else { "" };
                        println!("  {} - {}{default}", instruction.id, instruction.name);
                    }
                }
                Some("tags") => {
                    println!("[TAGS]");
                    for collection in session.presets().collections() {
                        println!(
                            "  {} - {} ({} tags)",
                            collection.id,
                            collection.name,
                            collection.hashtags.len()
                        );
                    }
                }
                Some("set") => set_form_field(&mut form, &parts),
                Some("form") => print_form(&form),
                Some("begin") => match session.begin_adventure(&form).await {
                    Ok(receipt) => println!("[STORY] {}", receipt.story_id),
                    Err(SessionError::CastIncomplete) => {
                        println!("[ERROR] Pick {MAX_CAST} characters first (#select <slot>)")
                    }
                    Err(_) => {}
                },
                Some("status") => {
                    println!("[STATUS]");
                    println!("  Gallery: {} characters", session.casting().len());
                    println!(
                        "  Cast: {}/{MAX_CAST}{}",
                        session.casting().cast_len(),
                        if session.casting().cast_complete() {
                            " - ready to begin"
                        } else {
                            ""
                        }
                    );
                }
                Some("help") => print_help(),
                _ => {
                    println!("[ERROR] Unknown command. Type #help for help.");
                }
            }
            flush_notices(&mut session);
            stdout.flush().ok();
            continue;
        }

        println!("[ERROR] Commands start with '#'. Type #help for help.");
        stdout.flush().ok();
    }

    Ok(())
}

/// Parse a 1-based slot argument, as printed by the gallery listing.
fn parse_slot(parts: &[&str], session: &StudioSession<Client>) -> Option<usize> {
    let slot = match parts.get(1).and_then(|n| n.parse::<usize>().ok()) {
        Some(n) if n >= 1 => n - 1,
        _ => {
            println!("[ERROR] Usage: #{} <slot>", parts.first().unwrap_or(&""));
            return None;
        }
    };
    if slot >= session.casting().len() {
        println!(
            "[ERROR] No slot {}. The gallery has {} characters.",
            slot + 1,
            session.casting().len()
        );
        return None;
    }
    Some(slot)
}

fn set_form_field(form: &mut StoryForm, parts: &[&str]) {
    let value = parts[2..].join(" ");
    match parts.get(1).copied() {
        Some("conflict") => form.custom_conflict = value,
        Some("setting") => form.custom_setting = value,
        Some("style") => form.custom_narrative = value,
        Some("mood") => form.custom_mood = value,
        _ => {
            println!("[ERROR] Usage: #set conflict|setting|style|mood <text>");
            return;
        }
    }
    print_form(form);
}

fn print_form(form: &StoryForm) {
    println!("[FORM]");
    println!("  Conflict:  {}", form.resolved_conflict());
    println!("  Setting:   {}", form.resolved_setting());
    println!("  Narrative: {}", form.resolved_narrative_style());
    println!("  Mood:      {}", form.resolved_mood());
}

fn print_gallery(session: &StudioSession<Client>) {
    println!("[GALLERY]");
    for (slot, card) in session.casting().cards().iter().enumerate() {
        let marker = if session.casting().is_selected(slot) {
            "*"
        } else {
            " "
        };
        println!("  [{}]{marker} {} - {}", slot + 1, card.name, card.style);
    }
}

fn print_card(session: &StudioSession<Client>, slot: usize) {
    if let Some(card) = session.casting().card(slot) {
        println!("[CARD {}]", slot + 1);
        println!("  Name:   {}", card.name);
        println!("  Style:  {}", card.style);
        println!("  Traits: {}", card.character_traits.join(", "));
        if !card.story.is_empty() {
            println!("  Story:  {}", card.story);
        }
    }
}

fn print_cast(session: &StudioSession<Client>) {
    let names: Vec<&str> = session
        .casting()
        .cast_cards()
        .iter()
        .map(|card| card.name.as_str())
        .collect();
    println!(
        "[CAST] {}/{MAX_CAST}: {}",
        session.casting().cast_len(),
        names.join(", ")
    );
}

fn flush_notices(session: &mut StudioSession<Client>) {
    for notice in session.drain_notices() {
        match notice.level {
            NoticeLevel::Success => println!("[OK] {}", notice.message),
            NoticeLevel::Error => println!("[ERROR] {}", notice.message),
        }
    }
}

fn print_help() {
    println!("[HELP]");
    println!("  #load [n]              - Summon a fresh gallery (default {DEFAULT_BATCH_SIZE})");
    println!("  #select <slot>         - Toggle a character in or out of the cast");
    println!("  #reroll <slot>         - Replace a slot with a new character");
    println!("  #describe <slot> [id]  - Re-describe a slot, optionally with a style id");
    println!("  #caption <slot>        - Generate a caption for a slot");
    println!("  #styles / #tags        - List analysis styles / hashtag collections");
    println!("  #set <field> <text>    - Custom conflict|setting|style|mood");
    println!("  #form / #cast / #status- Show form, cast, or session status");
    println!("  #begin                 - Start the story (needs {MAX_CAST} in the cast)");
    println!("  #quit                  - Exit");
}
