mod app;
mod chat;
mod config;
mod emotes;
mod irc;
mod logging;
mod pane;
mod ui;

use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::*;
use crate::emotes::cache::EmoteCache;
use crate::emotes::fetcher::EmoteFetcher;
use crate::irc::connection::{spawn_connection, IrcConnection};
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::prelude::*;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    // Install panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    logging::init();

    // Load config
    let cfg = config::load_config()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, cfg).await;

    // Restore terminal
    restore_terminal()?;

    if let Err(e) = result {
        tracing::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: config::AppConfig,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    let login = cfg.twitch.login();
    let mut state = AppState::new(cfg.clone(), login.clone());

    let cache = EmoteCache::default_dir().map(EmoteCache::new);
    let max_age = Duration::from_secs(cfg.emotes.cache_expiry_hours * 60 * 60);
    let mut fetcher = EmoteFetcher::new(event_tx.clone(), cache, max_age)?;

    // Spawn terminal input task
    let term_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            match reader.next().await {
                Some(Ok(event)) => {
                    if term_tx.send(AppEvent::Terminal(event)).is_err() {
                        break;
                    }
                }
                Some(Err(_)) => break,
                None => break,
            }
        }
    });

    // Spawn tick task (20 FPS = 50ms)
    let tick_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(50));
        loop {
            interval.tick().await;
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        }
    });

    state.info(&format!(
        "Connecting to {}:{} as {}",
        cfg.twitch.host, cfg.twitch.port, login
    ));
    terminal.draw(|f| ui::render(f, &state))?;

    let connection: Option<IrcConnection> =
        match spawn_connection(&cfg.twitch, login, event_tx.clone()).await {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::error!("{:#}", e);
                state.connection = ConnectionStatus::Disconnected;
                state.info(&format!("Connection failed: {:#}", e));
                None
            }
        };

    // Main event loop
    loop {
        let event = event_rx.recv().await;
        let Some(event) = event else { break };

        let actions = handler::handle_event(&mut state, event);

        // Process actions
        for action in actions {
            match action {
                Action::SendMessage { text } => {
                    if let Some(conn) = &connection {
                        if let Err(e) = conn.send_privmsg(&text) {
                            state.info(&format!("Send failed: {}", e));
                        }
                    }
                }
                Action::SendAction { text } => {
                    if let Some(conn) = &connection {
                        if let Err(e) = conn.send_action(&text) {
                            state.info(&format!("Send failed: {}", e));
                        }
                    }
                }
                Action::RequestEmotes { feed, force } => {
                    fetcher.request(feed, force);
                }
                Action::EmotesFinished { feed } => fetcher.finished(&feed),
                Action::ReloadConfig => match config::load_config() {
                    Ok(cfg) => {
                        state.apply_config(cfg);
                        state.info("Config reloaded");
                    }
                    Err(e) => state.info(&format!("Config reload failed: {:#}", e)),
                },
                Action::Quit { message } => {
                    state.quit_message = message;
                    state.should_quit = true;
                }
            }
        }

        if state.should_quit {
            if let Some(conn) = &connection {
                conn.quit(state.quit_message.as_deref());
            }
            break;
        }

        // Conditional render (only if dirty)
        if state.dirty {
            terminal.draw(|f| ui::render(f, &state))?;
            state.dirty = false;
        }
    }

    Ok(())
}
