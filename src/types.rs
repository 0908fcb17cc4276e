// Error types shared by the store, gateway and flows

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch files")]
    ListFailed,

    #[error("Upload failed")]
    UploadFailed,

    #[error("Failed to select file")]
    SelectFailed,

    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
