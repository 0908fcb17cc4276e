//! Dataset Selection Flow
//!
//! State machine behind the dataset modal:
//!
//! ```text
//!   Closed --open--> Listing --listed--> Open
//!   Open --upload--> Uploading --ok--> Listing --listed--> Open
//!                              --err-> Open (error shown)
//!   Open --select--> Selecting --ok--> Closed (dataset handed to caller)
//!                              --err-> Open (error shown, dataset unchanged)
//!   any  --close---> Closed
//! ```
//!
//! Each `begin_*`/`open` returns whether the caller should issue the
//! corresponding backend call; the outcome comes back through `complete_*`.

use crate::api::Gateway;
use crate::models::{DatasetFile, FileList};
use crate::types::{AppError, AppResult};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Listing,
    Open,
    Uploading,
    Selecting,
}

#[derive(Debug, Default)]
pub struct DatasetFlow {
    state: ModalState,
    files: Vec<DatasetFile>,
    error: Option<String>,
    highlighted: usize,
}

impl DatasetFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != ModalState::Closed
    }

    /// A backend call is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(
            self.state,
            ModalState::Listing | ModalState::Uploading | ModalState::Selecting
        )
    }

    pub fn files(&self) -> &[DatasetFile] {
        &self.files
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Open the modal; true when the file list must be fetched
    pub fn open(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.state = ModalState::Listing;
        self.error = None;
        true
    }

    pub fn close(&mut self) {
        self.state = ModalState::Closed;
    }

    pub fn complete_listing(&mut self, outcome: AppResult<FileList>) {
        match outcome {
            Ok(list) => {
                self.files = list.files;
                self.highlighted = self.highlighted.min(self.files.len().saturating_sub(1));
            }
            Err(e) => {
                warn!("Listing datasets failed: {}", e);
                self.error = Some(describe(e, AppError::ListFailed));
            }
        }
        if self.state == ModalState::Listing {
            self.state = ModalState::Open;
        }
    }

    /// Start an upload; true when the upload call must be issued
    pub fn begin_upload(&mut self) -> bool {
        if self.state != ModalState::Open {
            return false;
        }
        self.state = ModalState::Uploading;
        self.error = None;
        true
    }

    /// Finish an upload; true when the file list must be fetched again
    pub fn complete_upload(&mut self, outcome: AppResult<serde_json::Value>) -> bool {
        let still_open = self.state == ModalState::Uploading;
        match outcome {
            Ok(_) => {
                info!("Dataset uploaded");
                if still_open {
                    self.state = ModalState::Listing;
                }
                still_open
            }
            Err(e) => {
                warn!("Dataset upload failed: {}", e);
                self.error = Some(describe(e, AppError::UploadFailed));
                if still_open {
                    self.state = ModalState::Open;
                }
                false
            }
        }
    }

    /// Start selecting `filename`; true when the select call must be issued
    pub fn begin_select(&mut self, filename: &str) -> bool {
        if self.state != ModalState::Open || filename.is_empty() {
            return false;
        }
        self.state = ModalState::Selecting;
        self.error = None;
        true
    }

    /// Finish a selection; returns the newly active dataset on success
    pub fn complete_select(
        &mut self,
        filename: &str,
        outcome: AppResult<serde_json::Value>,
    ) -> Option<String> {
        match outcome {
            Ok(_) => {
                info!("Active dataset is now {}", filename);
                if self.state == ModalState::Selecting {
                    self.state = ModalState::Closed;
                }
                Some(filename.to_string())
            }
            Err(e) => {
                warn!("Selecting {} failed: {}", filename, e);
                self.error = Some(describe(e, AppError::SelectFailed));
                if self.state == ModalState::Selecting {
                    self.state = ModalState::Open;
                }
                None
            }
        }
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted_file(&self) -> Option<&DatasetFile> {
        self.files.get(self.highlighted)
    }

    pub fn highlight_next(&mut self) {
        if !self.files.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.files.len();
        }
    }

    pub fn highlight_prev(&mut self) {
        if !self.files.is_empty() {
            self.highlighted = self
                .highlighted
                .checked_sub(1)
                .unwrap_or(self.files.len() - 1);
        }
    }

    /// Open the modal and fetch the file list
    pub async fn refresh(&mut self, gateway: &dyn Gateway) {
        if self.open() || self.state == ModalState::Open {
            self.state = ModalState::Listing;
            let outcome = gateway.list_files().await;
            self.complete_listing(outcome);
        }
    }

    /// Upload a local file and refresh the list
    pub async fn upload(&mut self, gateway: &dyn Gateway, path: &Path) {
        if !self.begin_upload() {
            return;
        }
        let outcome = gateway.upload_file(path).await;
        if self.complete_upload(outcome) {
            let listing = gateway.list_files().await;
            self.complete_listing(listing);
        }
    }

    /// Select a dataset; returns it when the backend accepted the choice
    pub async fn select(&mut self, gateway: &dyn Gateway, filename: &str) -> Option<String> {
        if !self.begin_select(filename) {
            return None;
        }
        let outcome = gateway.select_file(filename).await;
        self.complete_select(filename, outcome)
    }
}

/// Modal error text; transport failures keep their detail
fn describe(error: AppError, generic: AppError) -> String {
    match error {
        AppError::ListFailed | AppError::UploadFailed | AppError::SelectFailed => error.to_string(),
        other => format!("{}: {}", generic, other),
    }
}
