//! MongoDB-backed person store.

use super::{parse_id, PersonStore, StoreError};
use crate::config::DEFAULT_DATABASE;
use crate::models::{Person, PersonFields};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Person as stored in the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersonDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    number: String,
}

impl From<PersonDocument> for Person {
    fn from(doc: PersonDocument) -> Self {
        Person {
            id: doc.id.to_hex(),
            name: doc.name,
            number: doc.number,
        }
    }
}

/// Store backed by a single MongoDB collection
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<PersonDocument>,
}

impl MongoStore {
    /// Connect and verify the deployment is reachable.
    ///
    /// The database is `database` if given, otherwise the one named in the
    /// connection string, otherwise `phonebook`.
    pub async fn connect(
        uri: &str,
        database: Option<&str>,
        collection: &str,
    ) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;

        let db = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        };

        db.run_command(doc! { "ping": 1 }).await?;

        info!(database = db.name(), collection, "Connected to MongoDB");

        Ok(Self {
            collection: db.collection(collection),
        })
    }
}

#[async_trait]
impl PersonStore for MongoStore {
    async fn list(&self) -> Result<Vec<Person>, StoreError> {
        let docs: Vec<PersonDocument> = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(docs.into_iter().map(Person::from).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Person>, StoreError> {
        let oid = parse_id(id)?;
        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(Person::from))
    }

    async fn create(&self, fields: PersonFields) -> Result<Person, StoreError> {
        let document = PersonDocument {
            id: ObjectId::new(),
            name: fields.name,
            number: fields.number,
        };
        self.collection.insert_one(&document).await?;

        debug!(id = %document.id, "Inserted person");

        Ok(document.into())
    }

    async fn update(&self, id: &str, fields: PersonFields) -> Result<Option<Person>, StoreError> {
        let oid = parse_id(id)?;
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": oid },
                doc! { "$set": { "name": fields.name.as_str(), "number": fields.number.as_str() } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated.map(Person::from))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let oid = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
