//! Chat Interaction Flow
//!
//! Submitting a question appends the user message right away, then the answer
//! (or a fallback notice) when the backend call resolves. Every request gets a
//! fresh id; a response is applied only if its id is the latest one issued and
//! no reset happened since it was issued.

use crate::api::Gateway;
use crate::models::{ChatResponse, Message};
use crate::store::ChatStore;
use crate::types::AppResult;
use tracing::{debug, error, info};

pub const NO_DATASET_ERROR: &str = "Please select a dataset first.";
pub const BACKEND_ERROR: &str =
    "Failed to reach the chatbot backend. Make sure the server is running.";
pub const FALLBACK_ANSWER: &str =
    "Cannot answer reliably. Please check if the backend server is running.";
pub const NO_RESULTS_ANSWER: &str = "No results returned from the query.";

/// A question accepted for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub id: u64,
    pub question: String,
}

/// Why a submit did not start a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Input empty after trimming
    EmptyInput,
    /// A request is already in flight
    Busy,
    /// No active dataset; the validation banner is set
    NoDataset,
}

/// What happened when a response came back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Answered,
    Failed,
    /// Stale response, nothing appended
    Discarded,
}

#[derive(Debug, Default)]
pub struct ChatFlow {
    input: String,
    loading: bool,
    error: Option<String>,
    last_issued: u64,
    /// Responses with an id at or below this are stale
    discard_through: u64,
}

impl ChatFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Banner text, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate the input and record the user message.
    ///
    /// On success the caller must send the returned question and hand the
    /// outcome to [`ChatFlow::complete`].
    pub fn submit(
        &mut self,
        store: &mut ChatStore,
        active_dataset: Option<&str>,
    ) -> Result<PendingQuery, SubmitRejected> {
        let question = self.input.trim().to_string();
        if question.is_empty() {
            return Err(SubmitRejected::EmptyInput);
        }
        if self.loading {
            return Err(SubmitRejected::Busy);
        }
        if active_dataset.map_or(true, str::is_empty) {
            self.error = Some(NO_DATASET_ERROR.to_string());
            return Err(SubmitRejected::NoDataset);
        }

        store.add_message(Message::user(question.clone()));
        self.input.clear();
        self.error = None;
        self.loading = true;

        self.last_issued += 1;
        debug!("Issuing chat request {}", self.last_issued);
        Ok(PendingQuery {
            id: self.last_issued,
            question,
        })
    }

    /// Reconcile the backend outcome of request `id`
    pub fn complete(
        &mut self,
        store: &mut ChatStore,
        id: u64,
        outcome: AppResult<ChatResponse>,
    ) -> Completion {
        if id == self.last_issued {
            self.loading = false;
        }
        if id != self.last_issued || id <= self.discard_through {
            debug!("Discarding stale chat response {}", id);
            return Completion::Discarded;
        }

        match outcome {
            Ok(response) => {
                let message = match response.result {
                    Some(rows) => {
                        info!("Chat request {} returned {} row(s)", id, rows.len());
                        Message::assistant_data(rows)
                    }
                    None => Message::assistant_text(NO_RESULTS_ANSWER),
                };
                store.add_message(message);
                Completion::Answered
            }
            Err(e) => {
                error!("Chat request {} failed: {}", id, e);
                self.error = Some(BACKEND_ERROR.to_string());
                store.add_message(Message::assistant_text(FALLBACK_ANSWER));
                Completion::Failed
            }
        }
    }

    /// Clear history, banner and input. Loading is left alone; the response
    /// of a request issued before the reset is dropped.
    pub fn reset(&mut self, store: &mut ChatStore) {
        store.reset_messages();
        self.error = None;
        self.input.clear();
        self.discard_through = self.last_issued;
    }

    /// Submit and await the answer in one go
    pub async fn ask(
        &mut self,
        store: &mut ChatStore,
        gateway: &dyn Gateway,
        active_dataset: Option<&str>,
    ) -> Result<Completion, SubmitRejected> {
        let pending = self.submit(store, active_dataset)?;
        let outcome = gateway.send_chat_message(&pending.question).await;
        Ok(self.complete(store, pending.id, outcome))
    }
}
