//! TUI Widgets
//!
//! Custom widgets for the chat TUI.

mod dataset;
mod result;

pub use dataset::render_dataset_modal;
pub use result::result_lines;
