//! Client State Storage
//!
//! Session-scoped persistence for client state containers.

pub mod chat;
pub mod persist;
pub mod storage;

pub use chat::{ChatState, ChatStore};
pub use persist::{PersistentStore, StoreOptions};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
