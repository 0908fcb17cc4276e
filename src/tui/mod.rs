//! Terminal User Interface Module
//!
//! Chat client for asking questions about a spreadsheet dataset.
//! Built with Ratatui for terminal rendering.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        Excel Incident Chatbot  Dataset: incidents.xlsx          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─ Messages ──────────────────────────────────────────────┐   │
//! │  │ You: Which region has the highest total cost?            │   │
//! │  │ Bot: region: North                                       │   │
//! │  │      total_cost: 12,500                                  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │  ✗ Please select a dataset first.                               │
//! │  ┌─ Input ─────────────────────────────────────────────────┐   │
//! │  │ Ask a question about your Excel incident data...         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │  Ready │ [Enter] Send [Ctrl+D] Dataset [Ctrl+R] Reset ...      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{App, AppEvent, ModalFocus, View};
pub use event::{AppAction, EventHandler};

use crate::api::ApiClient;
use crate::config::Config;
use crate::store::{ChatStore, FileSessionStorage, StoreOptions};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::Arc;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting TUI mode against {}", config.api.base_url);

    let gateway = Arc::new(ApiClient::from_config(&config.api));
    let storage = Arc::new(FileSessionStorage::from_config(&config));
    let store = ChatStore::new(storage, &StoreOptions::from_config(&config));

    let mut app = App::new(config, gateway, store);
    app.start();

    let mut terminal = init_terminal()?;
    let mut events = EventHandler::new(std::time::Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Results of backend calls
        app.poll_events();

        match events.next().await {
            Some(AppAction::Quit) | Some(AppAction::ForceQuit) | None => break,
            Some(action) => app.handle_action(action).await,
        }
    }

    info!("TUI exited normally");
    Ok(())
}
