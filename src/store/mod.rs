//! Message persistence module
//!
//! Defines the stored entities and the `Datastore` seam the request handlers
//! write through. Two backends are provided: SQLite for real deployments and
//! an in-memory store used by tests and throwaway instances.

mod memory;
mod sqlite;

pub use memory::MemoryDatastore;
pub use sqlite::SqliteDatastore;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};

/// A posted message. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: String,
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl Message {
    /// Create a message with a fresh id and the current time
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user: user.into(),
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Country of a message author, derived from IP geolocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLocation {
    pub user: String,
    pub country_code: String,
}

impl UserLocation {
    pub fn new(user: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            country_code: country_code.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence backend shared by all requests
pub trait Datastore: Send + Sync {
    /// All messages posted by `user`, newest first
    fn get_messages(&self, user: &str) -> StoreResult<Vec<Message>>;

    fn store_message(&self, message: &Message) -> StoreResult<()>;

    fn store_location(&self, location: &UserLocation) -> StoreResult<()>;

    /// All locations recorded for `user`, in insertion order
    fn get_locations(&self, user: &str) -> StoreResult<Vec<UserLocation>>;
}

/// Run a datastore call on the blocking pool.
///
/// Backends do synchronous I/O, and connections are served from a single
/// local task set, so handlers must not call them inline.
pub async fn blocking<T, F>(store: &Arc<dyn Datastore>, f: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Datastore) -> StoreResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || f(store.as_ref())).await?
}

/// Open the backend selected in configuration
pub fn open(config: &StoreConfig) -> StoreResult<Arc<dyn Datastore>> {
    let store: Arc<dyn Datastore> = match config.backend {
        StoreBackend::Sqlite if config.path == ":memory:" => {
            Arc::new(SqliteDatastore::in_memory()?)
        }
        StoreBackend::Sqlite => Arc::new(SqliteDatastore::open(&config.path)?),
        StoreBackend::Memory => Arc::new(MemoryDatastore::new()),
    };
    Ok(store)
}
