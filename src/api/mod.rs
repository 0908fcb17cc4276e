// Backend gateway

pub mod client;

pub use client::ApiClient;

use crate::models::{ChatResponse, FileList};
use crate::types::AppResult;
use async_trait::async_trait;
use std::path::Path;

/// The four backend calls the client makes. One attempt each, no retry.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET /api/files`
    async fn list_files(&self) -> AppResult<FileList>;

    /// `POST /api/upload` with the file as multipart field `file`
    async fn upload_file(&self, path: &Path) -> AppResult<serde_json::Value>;

    /// `POST /api/select-file`
    async fn select_file(&self, filename: &str) -> AppResult<serde_json::Value>;

    /// `POST /api/chat/csv/groq`
    async fn send_chat_message(&self, question: &str) -> AppResult<ChatResponse>;
}
