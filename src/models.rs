// Conversation and backend payload models

use serde::{Deserialize, Serialize};

/// One query-result record: column name to scalar value, in backend order.
pub type RowObject = serde_json::Map<String, serde_json::Value>;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A chat message.
///
/// User messages always carry `text`. Assistant messages carry either `data`
/// (rows returned by the backend) or `text` (a fixed notice), never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<RowObject>>,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: Some(text.into()),
            data: None,
        }
    }

    /// Create an assistant message with a plain text answer
    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: Some(text.into()),
            data: None,
        }
    }

    /// Create an assistant message holding result rows
    pub fn assistant_data(rows: Vec<RowObject>) -> Self {
        Self {
            role: Role::Assistant,
            text: None,
            data: Some(rows),
        }
    }
}

/// A dataset registered with the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFile {
    pub filename: String,
}

/// `GET /api/files` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub files: Vec<DatasetFile>,
}

/// `POST /api/select-file` request
#[derive(Debug, Clone, Serialize)]
pub struct SelectFileRequest<'a> {
    pub filename: &'a str,
}

/// `POST /api/chat/csv/groq` request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub question: &'a str,
}

/// `POST /api/chat/csv/groq` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub result: Option<Vec<RowObject>>,
}
