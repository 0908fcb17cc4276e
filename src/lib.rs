// Sheetchat - terminal chat client for questions about uploaded spreadsheets

pub mod api;
pub mod cli;
pub mod config;
pub mod flows;
pub mod models;
pub mod results;
pub mod store;
pub mod tui;   // Terminal User Interface
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use types::{AppError, AppResult};
