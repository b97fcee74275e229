//! Menagerie casting studio TUI.
//!
//! A terminal interface for casting AI-generated characters into stories:
//! browse the gallery, reroll and re-describe characters, pick a cast of
//! three, and begin a story against a running studio backend.
//!
//! # Headless Mode
//!
//! Run with `--headless` for a line-oriented interface suitable for
//! automated testing:
//!
//! ```bash
//! cargo run -p menagerie -- --headless --server http://localhost:5000
//! ```

mod app;
mod editors;
mod events;
mod headless;
mod ui;
mod worker;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use menagerie_client::Client;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::time::Duration;

use app::App;
use events::{handle_event, EventResult};
use ui::render::render;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let client = match server_from_args(&args) {
        Some(url) => Client::new(url),
        None => Client::from_env(),
    };

    // Check for --headless mode
    if args.iter().any(|a| a == "--headless") {
        return headless::run_headless(client).await.map_err(|e| e.into());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Wire up the worker and kick off the initial loads
    let (request_tx, response_rx) = worker::spawn(client);
    let mut app = App::new(request_tx, response_rx);
    app.reload_gallery();
    app.refresh_presets();

    let result = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    loop {
        // Apply any completed studio calls before drawing
        loop {
            match app.response_rx.try_recv() {
                Ok(response) => app.apply_response(response),
                Err(_) => break,
            }
        }

        terminal.draw(|f| render(f, &app))?;

        // Poll for events with timeout for animations
        if event::poll(Duration::from_millis(100))? {
            let ev = event::read()?;
            match handle_event(&mut app, ev) {
                EventResult::Quit => return Ok(()),
                EventResult::NeedsRedraw | EventResult::Continue => {}
            }
        } else {
            app.tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Pull a `--server <url>` argument out of argv.
fn server_from_args(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--server" {
            return iter.next().cloned();
        }
    }
    None
}

fn print_help() {
    println!("Menagerie - character casting and story studio");
    println!();
    println!("USAGE:");
    println!("  menagerie [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help        Show this help message");
    println!("  --headless        Run in headless mode (text-only, no TUI)");
    println!("  --server <URL>    Studio backend URL (default: $MENAGERIE_URL or");
    println!("                    http://127.0.0.1:5000)");
    println!();
    println!("KEYS (TUI mode):");
    println!("  arrows/hjkl       Move around the gallery");
    println!("  Space             Select or deselect a character (cast of 3)");
    println!("  r / d / c         Reroll, describe, or caption the highlighted card");
    println!("  R                 Summon a fresh batch");
    println!("  b                 Begin the story once the cast is full");
    println!("  p                 Manage analysis styles and hashtag collections");
    println!("  ?                 Help overlay");
}
