// User-facing flows built on the store and the gateway

pub mod chat;
pub mod dataset;

pub use chat::{ChatFlow, Completion, PendingQuery, SubmitRejected};
pub use dataset::{DatasetFlow, ModalState};
