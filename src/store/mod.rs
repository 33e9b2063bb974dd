//! Person storage.
//!
//! Handlers only see the [`PersonStore`] trait. The concrete backend is chosen
//! once at startup by [`connect`] and injected through `AppState`.
//!
//! Identifiers are document object ids (24 hex digits) in every backend, so a
//! malformed identifier is rejected the same way whether or not a database is
//! attached.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::config::Config;
use crate::models::{Person, PersonFields};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

/// Storage operations backing the HTTP API
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// All persons, in insertion order
    async fn list(&self) -> Result<Vec<Person>, StoreError>;

    /// Look up one person. `Ok(None)` for a well-formed id with no record.
    async fn get(&self, id: &str) -> Result<Option<Person>, StoreError>;

    /// Insert a new person with a freshly assigned id
    async fn create(&self, fields: PersonFields) -> Result<Person, StoreError>;

    /// Replace name and number. `Ok(None)` if no record has this id.
    async fn update(&self, id: &str, fields: PersonFields) -> Result<Option<Person>, StoreError>;

    /// Remove a person. Returns whether a record existed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Total number of stored persons
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Parse an identifier into the storage id format
pub fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::MalformedId(id.to_string()))
}

/// Build the store selected by `config`.
pub async fn connect(config: &Config) -> Result<Arc<dyn PersonStore>, StoreError> {
    match &config.mongodb_uri {
        Some(uri) => {
            let store = MongoStore::connect(
                uri,
                config.mongodb_database.as_deref(),
                &config.mongodb_collection,
            )
            .await?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("malformed id: {0}")]
    MalformedId(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}
