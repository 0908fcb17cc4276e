//! Chat State
//!
//! Conversation history plus an auxiliary selected id. Only `messages` is
//! persisted, so the selected id starts empty after every restart.

use super::persist::{PersistentStore, StoreOptions};
use super::storage::SessionStorage;
use crate::models::Message;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const CHAT_ENTITY: &str = "chat";
pub const CHAT_PERSISTED_FIELDS: &[&str] = &["messages"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatState {
    pub selected_id: String,
    pub messages: Vec<Message>,
}

pub struct ChatStore {
    inner: PersistentStore<ChatState>,
}

impl ChatStore {
    pub fn new(storage: Arc<dyn SessionStorage>, options: &StoreOptions) -> Self {
        Self {
            inner: PersistentStore::create(
                storage,
                options,
                CHAT_ENTITY,
                Some(CHAT_PERSISTED_FIELDS),
            ),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.inner.state().messages
    }

    pub fn add_message(&mut self, msg: Message) {
        self.inner.mutate(|s| s.messages.push(msg));
    }

    pub fn reset_messages(&mut self) {
        self.inner.mutate(|s| s.messages.clear());
    }

    pub fn selected_id(&self) -> &str {
        &self.inner.state().selected_id
    }

    pub fn set_selected_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.inner.mutate(|s| s.selected_id = id);
    }

    /// Storage key of the persisted snapshot
    pub fn storage_key(&self) -> &str {
        self.inner.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::storage::MemorySessionStorage;
    use serde_json::{json, Value};

    fn store_over(storage: &MemorySessionStorage) -> ChatStore {
        ChatStore::new(Arc::new(storage.clone()), &StoreOptions::default())
    }

    #[test]
    fn test_append_order_is_kept() {
        let storage = MemorySessionStorage::new();
        let mut store = store_over(&storage);
        store.add_message(Message::user("one"));
        store.add_message(Message::assistant_text("two"));
        store.add_message(Message::user("one"));

        let texts: Vec<_> = store
            .messages()
            .iter()
            .map(|m| m.text.clone().unwrap())
            .collect();
        assert_eq!(texts, vec!["one", "two", "one"]);
    }

    #[test]
    fn test_reset_empties_history_and_snapshot() {
        let storage = MemorySessionStorage::new();
        let mut store = store_over(&storage);
        for i in 0..5 {
            store.add_message(Message::user(format!("q{}", i)));
        }
        store.reset_messages();

        assert!(store.messages().is_empty());
        let raw = storage.get_item("zpp:dev:chat").unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, json!({"messages": []}));
    }

    #[test]
    fn test_reload_keeps_messages_but_not_selected_id() {
        let storage = MemorySessionStorage::new();
        let mut row = serde_json::Map::new();
        row.insert("a".to_string(), json!(1));
        {
            let mut store = store_over(&storage);
            store.set_selected_id("sales.xlsx");
            store.add_message(Message::user("total?"));
            store.add_message(Message::assistant_data(vec![row.clone()]));
            assert_eq!(store.selected_id(), "sales.xlsx");
        }

        let reloaded = store_over(&storage);
        assert_eq!(
            reloaded.messages(),
            &[Message::user("total?"), Message::assistant_data(vec![row])]
        );
        assert_eq!(reloaded.selected_id(), "");
    }

    #[test]
    fn test_snapshot_key() {
        let storage = MemorySessionStorage::new();
        let store = store_over(&storage);
        assert_eq!(store.storage_key(), "zpp:dev:chat");
    }
}
