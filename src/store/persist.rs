//! Persistent Store
//!
//! Wraps a state value so that a declared subset of its fields is written to
//! [`SessionStorage`] after every mutation and restored when the store is
//! created again. The state type only has to be a serde struct with a
//! `Default`; field selection works on its JSON object form.
//!
//! Snapshots live under `<namespace>:<mode>:<entity>` where `mode` is cut to
//! its first three characters (`development` becomes `dev`).

use super::storage::SessionStorage;
use crate::types::{AppError, AppResult};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Namespace settings shared by every store of the application
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub namespace: String,
    pub mode: String,
}

impl StoreOptions {
    pub fn new(namespace: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            mode: mode.into(),
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.store.namespace.clone(), config.store.mode.clone())
    }

    /// Storage key for an entity
    pub fn storage_key(&self, entity_name: &str) -> String {
        let mode: String = self.mode.chars().take(3).collect();
        format!("{}:{}:{}", self.namespace, mode, entity_name)
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new("zpp", "development")
    }
}

/// State container with a persisted field subset
pub struct PersistentStore<T> {
    state: T,
    key: String,
    /// `None` persists every field
    fields: Option<Vec<String>>,
    storage: Arc<dyn SessionStorage>,
}

impl<T> PersistentStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Create the store and rehydrate it from storage.
    ///
    /// Any problem reading the snapshot falls back to `T::default()`.
    pub fn create(
        storage: Arc<dyn SessionStorage>,
        options: &StoreOptions,
        entity_name: &str,
        persisted_fields: Option<&[&str]>,
    ) -> Self {
        let mut store = Self {
            state: T::default(),
            key: options.storage_key(entity_name),
            fields: persisted_fields.map(|f| f.iter().map(|s| s.to_string()).collect()),
            storage,
        };
        store.state = store.load();
        store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> &T {
        &self.state
    }

    /// Apply a mutation, then write the persisted subset back
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.state);
        if let Err(e) = self.save() {
            warn!("Failed to persist {}: {}", self.key, e);
        }
        out
    }

    /// Read the stored snapshot merged over the defaults
    pub fn load(&self) -> T {
        match self.try_load() {
            Ok(Some(state)) => {
                debug!("Rehydrated {}", self.key);
                state
            }
            Ok(None) => T::default(),
            Err(e) => {
                warn!("Ignoring unreadable snapshot {}: {}", self.key, e);
                T::default()
            }
        }
    }

    /// Serialize the persisted subset of the current state
    pub fn snapshot(&self) -> AppResult<Map<String, Value>> {
        let mut map = state_object(&self.state)?;
        if let Some(fields) = &self.fields {
            map.retain(|k, _| fields.iter().any(|f| f == k));
        }
        Ok(map)
    }

    /// Write the persisted subset to storage
    pub fn save(&self) -> AppResult<()> {
        let snapshot = serde_json::to_string(&Value::Object(self.snapshot()?))?;
        self.storage.set_item(&self.key, &snapshot)
    }

    fn try_load(&self) -> AppResult<Option<T>> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let Value::Object(snapshot) = serde_json::from_str::<Value>(&raw)? else {
            return Err(AppError::Snapshot(format!(
                "snapshot {} is not a JSON object",
                self.key
            )));
        };

        let mut merged = state_object(&T::default())?;
        for (field, value) in snapshot {
            if self.is_persisted(&field) && merged.contains_key(&field) {
                merged.insert(field, value);
            }
        }

        Ok(Some(serde_json::from_value(Value::Object(merged))?))
    }

    fn is_persisted(&self, field: &str) -> bool {
        self.fields
            .as_ref()
            .map_or(true, |fields| fields.iter().any(|f| f == field))
    }
}

fn state_object<T: Serialize>(state: &T) -> AppResult<Map<String, Value>> {
    match serde_json::to_value(state)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Internal(
            "persisted state must serialize to a JSON object".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::storage::MemorySessionStorage;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Counter {
        count: u32,
        label: String,
        scratch: String,
    }

    fn counter_store(storage: &MemorySessionStorage) -> PersistentStore<Counter> {
        PersistentStore::create(
            Arc::new(storage.clone()),
            &StoreOptions::default(),
            "counter",
            Some(&["count", "label"]),
        )
    }

    #[test]
    fn test_storage_key_format() {
        assert_eq!(StoreOptions::default().storage_key("chat"), "zpp:dev:chat");
        assert_eq!(StoreOptions::new("app", "production").storage_key("x"), "app:pro:x");
        assert_eq!(StoreOptions::new("app", "qa").storage_key("x"), "app:qa:x");
    }

    #[test]
    fn test_only_declared_fields_are_written() {
        let storage = MemorySessionStorage::new();
        let mut store = counter_store(&storage);
        store.mutate(|s| {
            s.count = 3;
            s.scratch = "temp".to_string();
        });

        let raw = storage.get_item("zpp:dev:counter").unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({"count": 3, "label": ""}));
    }

    #[test]
    fn test_reload_restores_declared_fields_only() {
        let storage = MemorySessionStorage::new();
        {
            let mut store = counter_store(&storage);
            store.mutate(|s| {
                s.count = 7;
                s.label = "seven".to_string();
                s.scratch = "lost".to_string();
            });
        }

        let store = counter_store(&storage);
        assert_eq!(
            store.state(),
            &Counter {
                count: 7,
                label: "seven".to_string(),
                scratch: String::new(),
            }
        );
    }

    #[test]
    fn test_undeclared_fields_in_snapshot_are_ignored() {
        let storage = MemorySessionStorage::new();
        storage
            .set_item("zpp:dev:counter", r#"{"count":2,"scratch":"injected"}"#)
            .unwrap();
        let store = counter_store(&storage);
        assert_eq!(store.state().count, 2);
        assert_eq!(store.state().scratch, "");
    }

    #[test]
    fn test_malformed_snapshot_falls_back_to_defaults() {
        for raw in ["{not json", "[1,2,3]", r#"{"count":"three"}"#, ""] {
            let storage = MemorySessionStorage::new();
            storage.set_item("zpp:dev:counter", raw).unwrap();
            let store = counter_store(&storage);
            assert_eq!(store.state(), &Counter::default(), "snapshot {:?}", raw);
        }
    }

    #[test]
    fn test_non_object_snapshot_is_a_snapshot_error() {
        let storage = MemorySessionStorage::new();
        let store = counter_store(&storage);
        storage.set_item("zpp:dev:counter", "[1,2,3]").unwrap();

        let err = store.try_load().unwrap_err();
        assert!(matches!(err, AppError::Snapshot(_)));
        assert_eq!(err.to_string(), "Invalid snapshot: snapshot zpp:dev:counter is not a JSON object");
    }

    #[test]
    fn test_without_field_list_everything_persists() {
        let storage = MemorySessionStorage::new();
        let mut store: PersistentStore<Counter> = PersistentStore::create(
            Arc::new(storage.clone()),
            &StoreOptions::default(),
            "all",
            None,
        );
        store.mutate(|s| s.scratch = "kept".to_string());

        let reloaded: PersistentStore<Counter> = PersistentStore::create(
            Arc::new(storage),
            &StoreOptions::default(),
            "all",
            None,
        );
        assert_eq!(reloaded.state().scratch, "kept");
    }
}
