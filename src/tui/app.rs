//! Application State
//!
//! Owns the chat store and both flows, and turns key actions into flow steps.
//! Backend calls run as spawned tasks that report back through `AppEvent`s;
//! only the UI loop mutates state.

use crate::api::Gateway;
use crate::config::Config;
use crate::flows::{ChatFlow, DatasetFlow};
use crate::models::{ChatResponse, FileList, Message, Role};
use crate::results::{valid_rows, CsvExport, ResultView};
use crate::store::ChatStore;
use crate::tui::event::AppAction;
use crate::types::AppResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tui_textarea::TextArea;

const INPUT_PLACEHOLDER: &str = "Ask a question about your Excel incident data...";

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Chat,
    Help,
}

/// Which part of the dataset modal receives keys
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ModalFocus {
    #[default]
    Files,
    UploadPath,
}

/// Results of spawned backend calls
#[derive(Debug)]
pub enum AppEvent {
    FilesListed(AppResult<FileList>),
    Uploaded(AppResult<serde_json::Value>),
    Selected {
        filename: String,
        outcome: AppResult<serde_json::Value>,
    },
    ChatAnswered {
        id: u64,
        outcome: AppResult<ChatResponse>,
    },
}

/// Main application state
pub struct App {
    pub config: Config,

    // UI State
    pub view: View,
    pub tick: usize,
    pub notice: Option<String>,

    // Chat State
    pub store: ChatStore,
    pub chat: ChatFlow,
    pub active_file: Option<String>,
    pub input: TextArea<'static>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    pub follow_tail: bool,

    // Dataset modal
    pub dataset: DatasetFlow,
    pub modal_focus: ModalFocus,
    pub upload_path: String,

    gateway: Arc<dyn Gateway>,
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, gateway: Arc<dyn Gateway>, store: ChatStore) -> Self {
        let (tx, rx) = mpsc::channel(100);

        Self {
            config,
            view: View::Chat,
            tick: 0,
            notice: None,
            store,
            chat: ChatFlow::new(),
            active_file: None,
            input: new_input(),
            scroll_offset: 0,
            max_scroll: 0,
            follow_tail: true,
            dataset: DatasetFlow::new(),
            modal_focus: ModalFocus::Files,
            upload_path: String::new(),
            gateway,
            event_rx: rx,
            event_tx: tx,
        }
    }

    /// Show the dataset modal, as on first launch
    pub fn start(&mut self) {
        self.open_dataset_modal();
    }

    /// Drain finished backend calls
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FilesListed(outcome) => {
                self.dataset.complete_listing(outcome);
            }
            AppEvent::Uploaded(outcome) => {
                if self.dataset.complete_upload(outcome) {
                    self.upload_path.clear();
                    self.modal_focus = ModalFocus::Files;
                    self.spawn_listing();
                }
            }
            AppEvent::Selected { filename, outcome } => {
                if let Some(file) = self.dataset.complete_select(&filename, outcome) {
                    self.store.set_selected_id(file.clone());
                    self.active_file = Some(file);
                }
            }
            AppEvent::ChatAnswered { id, outcome } => {
                self.chat.complete(&mut self.store, id, outcome);
                self.follow_tail = true;
            }
        }
    }

    /// Handle a user action
    pub async fn handle_action(&mut self, action: AppAction) {
        if self.view == View::Help && action != AppAction::Tick {
            // Any key closes help
            self.view = View::Chat;
            return;
        }

        match action {
            AppAction::Quit | AppAction::ForceQuit => {}
            AppAction::Submit => {
                if self.dataset.is_open() {
                    self.confirm_in_modal();
                } else {
                    self.submit_message();
                }
            }
            AppAction::ToggleDataset => {
                if self.dataset.is_open() {
                    self.dataset.close();
                } else {
                    self.open_dataset_modal();
                }
            }
            AppAction::ResetChat => {
                self.chat.reset(&mut self.store);
                self.input = new_input();
                self.notice = None;
                self.scroll_offset = 0;
                self.follow_tail = true;
            }
            AppAction::ExportCsv => {
                self.export_latest_table().await;
            }
            AppAction::ToggleHelp => {
                self.view = View::Help;
            }
            AppAction::Escape => {
                if self.dataset.is_open() {
                    self.dataset.close();
                }
            }
            AppAction::ScrollUp => {
                if self.dataset.is_open() {
                    self.dataset.highlight_prev();
                } else {
                    self.scroll_by(-1);
                }
            }
            AppAction::ScrollDown => {
                if self.dataset.is_open() {
                    self.dataset.highlight_next();
                } else {
                    self.scroll_by(1);
                }
            }
            AppAction::ScrollPageUp => self.scroll_by(-10),
            AppAction::ScrollPageDown => self.scroll_by(10),
            AppAction::NextField => {
                if self.dataset.is_open() {
                    self.modal_focus = match self.modal_focus {
                        ModalFocus::Files => ModalFocus::UploadPath,
                        ModalFocus::UploadPath => ModalFocus::Files,
                    };
                }
            }
            AppAction::Input(key_event) => {
                self.handle_input(key_event);
            }
            AppAction::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
        }
    }

    /// Handle keyboard input
    fn handle_input(&mut self, key: crossterm::event::KeyEvent) {
        use crossterm::event::KeyCode;

        if self.dataset.is_open() {
            if self.modal_focus == ModalFocus::UploadPath {
                match key.code {
                    KeyCode::Char(c) => self.upload_path.push(c),
                    KeyCode::Backspace => {
                        self.upload_path.pop();
                    }
                    _ => {}
                }
            }
        } else if !self.chat.loading() {
            self.input.input(key);
        }
    }

    fn open_dataset_modal(&mut self) {
        if self.dataset.open() {
            self.modal_focus = ModalFocus::Files;
            self.spawn_listing();
        }
    }

    /// Enter inside the modal: upload the typed path or select the highlighted file
    fn confirm_in_modal(&mut self) {
        match self.modal_focus {
            ModalFocus::UploadPath => {
                let path = self.upload_path.trim();
                if path.is_empty() || !self.dataset.begin_upload() {
                    return;
                }
                let path = PathBuf::from(path);
                info!("Uploading {:?}", path);
                let gateway = self.gateway.clone();
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let outcome = gateway.upload_file(&path).await;
                    tx.send(AppEvent::Uploaded(outcome)).await.ok();
                });
            }
            ModalFocus::Files => {
                let Some(filename) = self.dataset.highlighted_file().map(|f| f.filename.clone())
                else {
                    return;
                };
                if !self.dataset.begin_select(&filename) {
                    return;
                }
                let gateway = self.gateway.clone();
                let tx = self.event_tx.clone();
                tokio::spawn(async move {
                    let outcome = gateway.select_file(&filename).await;
                    tx.send(AppEvent::Selected { filename, outcome }).await.ok();
                });
            }
        }
    }

    fn spawn_listing(&self) {
        let gateway = self.gateway.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = gateway.list_files().await;
            tx.send(AppEvent::FilesListed(outcome)).await.ok();
        });
    }

    /// Submit the current message
    fn submit_message(&mut self) {
        self.chat.set_input(self.input.lines().join("\n"));

        let Ok(pending) = self.chat.submit(&mut self.store, self.active_file.as_deref()) else {
            return;
        };

        self.input = new_input();
        self.notice = None;
        self.follow_tail = true;

        let gateway = self.gateway.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let outcome = gateway.send_chat_message(&pending.question).await;
            tx.send(AppEvent::ChatAnswered {
                id: pending.id,
                outcome,
            })
            .await
            .ok();
        });
    }

    /// Write the most recent table answer to the export directory
    async fn export_latest_table(&mut self) {
        let Some(rows) = self.latest_table_rows() else {
            self.notice = Some("No table result to export".to_string());
            return;
        };

        let built = CsvExport::from_rows(&valid_rows(rows));
        let export = match built {
            Ok(Some(export)) => export,
            Ok(None) => return,
            Err(e) => {
                error!("CSV export failed: {}", e);
                self.notice = Some(format!("Export failed: {}", e));
                return;
            }
        };

        let dir = self.config.export.dir.clone();
        self.notice = Some(match export.write_to(&dir).await {
            Ok(path) => format!("Saved {}", path.display()),
            Err(e) => {
                error!("Writing CSV export failed: {}", e);
                format!("Export failed: {}", e)
            }
        });
    }

    /// Rows of the newest assistant answer that renders as a table
    pub fn latest_table_rows(&self) -> Option<&[crate::models::RowObject]> {
        self.store
            .messages()
            .iter()
            .rev()
            .filter(|m| m.role == Role::Assistant)
            .filter_map(|m: &Message| m.data.as_deref())
            .find(|rows| ResultView::from_rows(rows).exportable())
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = (self.scroll_offset as i32 + delta).clamp(0, self.max_scroll as i32);
        self.scroll_offset = next as u16;
        self.follow_tail = self.scroll_offset >= self.max_scroll;
    }

    /// Update max scroll based on content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.follow_tail || self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}

fn new_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.set_placeholder_text(INPUT_PLACEHOLDER);
    input
}
