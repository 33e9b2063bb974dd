//! In-memory person store.
//!
//! Used when no database is configured and by the test suite. Data is lost on
//! restart.

use super::{parse_id, PersonStore, StoreError};
use crate::models::{Person, PersonFields};
use async_trait::async_trait;
use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredPerson {
    /// Insertion sequence, used to keep listing order stable
    seq: u64,
    name: String,
    number: String,
}

impl StoredPerson {
    fn to_person(&self, id: &ObjectId) -> Person {
        Person {
            id: id.to_hex(),
            name: self.name.clone(),
            number: self.number.clone(),
        }
    }
}

/// Thread-safe in-memory store
#[derive(Clone, Default)]
pub struct MemoryStore {
    persons: Arc<DashMap<ObjectId, StoredPerson>>,
    next_seq: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Person>, StoreError> {
        let mut entries: Vec<(u64, Person)> = self
            .persons
            .iter()
            .map(|entry| (entry.value().seq, entry.value().to_person(entry.key())))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);

        Ok(entries.into_iter().map(|(_, person)| person).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Person>, StoreError> {
        let oid = parse_id(id)?;
        Ok(self.persons.get(&oid).map(|entry| entry.value().to_person(&oid)))
    }

    async fn create(&self, fields: PersonFields) -> Result<Person, StoreError> {
        let oid = ObjectId::new();
        let stored = StoredPerson {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            name: fields.name,
            number: fields.number,
        };
        let person = stored.to_person(&oid);
        self.persons.insert(oid, stored);

        debug!(id = %oid, "Stored person");

        Ok(person)
    }

    async fn update(&self, id: &str, fields: PersonFields) -> Result<Option<Person>, StoreError> {
        let oid = parse_id(id)?;

        Ok(self.persons.get_mut(&oid).map(|mut entry| {
            let stored = entry.value_mut();
            stored.name = fields.name;
            stored.number = fields.number;
            stored.to_person(&oid)
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        Ok(self.persons.remove(&oid).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.persons.len() as u64)
    }
}
