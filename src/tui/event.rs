//! Event Handling
//!
//! Maps keyboard and timer events to application actions.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

/// Actions that can be performed in the application
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Quit immediately (Ctrl+C)
    ForceQuit,
    /// Enter: send the question, or confirm inside the dataset modal
    Submit,
    /// Open or close the dataset modal
    ToggleDataset,
    /// Clear the conversation
    ResetChat,
    /// Save the latest table result as CSV
    ExportCsv,
    /// Toggle help view
    ToggleHelp,
    /// Escape - close modals
    Escape,
    /// Scroll up one line / previous file
    ScrollUp,
    /// Scroll down one line / next file
    ScrollDown,
    /// Scroll up one page
    ScrollPageUp,
    /// Scroll down one page
    ScrollPageDown,
    /// Switch focus inside the dataset modal
    NextField,
    /// Regular input character
    Input(KeyEvent),
    /// Timer tick for animations
    Tick,
}

/// Event handler for the TUI
pub struct EventHandler {
    rx: mpsc::Receiver<AppAction>,
    _tx: mpsc::Sender<AppAction>,
}

impl EventHandler {
    /// Create a new event handler with specified tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let tx_clone = tx.clone();

        tokio::spawn(async move {
            let mut reader = crossterm::event::EventStream::new();
            let mut tick_interval = tokio::time::interval(tick_rate);

            loop {
                let tick = tick_interval.tick();
                let crossterm_event = reader.next().fuse();

                tokio::select! {
                    _ = tick => {
                        if tx_clone.send(AppAction::Tick).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(evt)) = crossterm_event => {
                        if let Some(action) = map_event(evt) {
                            if tx_clone.send(action).await.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Wait for the next action
    pub async fn next(&mut self) -> Option<AppAction> {
        self.rx.recv().await
    }
}

/// Map a crossterm event to an app action
fn map_event(event: Event) -> Option<AppAction> {
    match event {
        // Windows reports releases too
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key_event(key),
        _ => None,
    }
}

/// Map a key event to an app action
pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),

        (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(AppAction::ToggleDataset),
        (KeyModifiers::CONTROL, KeyCode::Char('r')) => Some(AppAction::ResetChat),
        (KeyModifiers::CONTROL, KeyCode::Char('e')) => Some(AppAction::ExportCsv),

        (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
            KeyCode::Esc => Some(AppAction::Escape),
            // Shift+Enter stays in the text area as a newline
            KeyCode::Enter if key.modifiers == KeyModifiers::NONE => Some(AppAction::Submit),
            KeyCode::F(1) => Some(AppAction::ToggleHelp),

            KeyCode::Up => Some(AppAction::ScrollUp),
            KeyCode::Down => Some(AppAction::ScrollDown),
            KeyCode::PageUp => Some(AppAction::ScrollPageUp),
            KeyCode::PageDown => Some(AppAction::ScrollPageDown),

            KeyCode::Tab | KeyCode::BackTab => Some(AppAction::NextField),

            _ => Some(AppAction::Input(key)),
        },

        _ => Some(AppAction::Input(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(modifiers: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(
            map_key_event(key(KeyModifiers::CONTROL, KeyCode::Char('d'))),
            Some(AppAction::ToggleDataset)
        );
        assert_eq!(
            map_key_event(key(KeyModifiers::CONTROL, KeyCode::Char('r'))),
            Some(AppAction::ResetChat)
        );
        assert_eq!(
            map_key_event(key(KeyModifiers::CONTROL, KeyCode::Char('e'))),
            Some(AppAction::ExportCsv)
        );
        assert_eq!(
            map_key_event(key(KeyModifiers::NONE, KeyCode::Enter)),
            Some(AppAction::Submit)
        );
    }

    #[test]
    fn test_question_mark_is_typed() {
        let k = key(KeyModifiers::SHIFT, KeyCode::Char('?'));
        assert_eq!(map_key_event(k), Some(AppAction::Input(k)));
    }

    #[test]
    fn test_shift_enter_is_input() {
        let k = key(KeyModifiers::SHIFT, KeyCode::Enter);
        assert_eq!(map_key_event(k), Some(AppAction::Input(k)));
    }
}
