use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::schema::{Document, Schema, ValidationErrors};
use crate::types::Operation;

use super::manager::DatabaseError;
use super::store::{DocumentStore, Record};

/// Outcome kinds of a gateway call, switched on by the resource handlers.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("duplicate value for unique field '{field}'")]
    Duplicate { field: String, source: DatabaseError },

    #[error("malformed identifier: {0}")]
    InvalidId(String),

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Store(DatabaseError),
}

impl From<DatabaseError> for RepositoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate { ref field, .. } => RepositoryError::Duplicate {
                field: field.clone(),
                source: err,
            },
            other => RepositoryError::Store(other),
        }
    }
}

/// Schema-aware gateway over a [`DocumentStore`] collection.
pub struct Repository<'a> {
    store: &'a dyn DocumentStore,
    schema: &'a Schema,
}

impl<'a> Repository<'a> {
    pub fn new(store: &'a dyn DocumentStore, schema: &'a Schema) -> Self {
        Self { store, schema }
    }

    /// Identifiers must be UUIDs; anything else is malformed rather than missing.
    pub fn parse_id(id: &str) -> Result<Uuid, RepositoryError> {
        Uuid::parse_str(id).map_err(|_| RepositoryError::InvalidId(id.to_string()))
    }

    pub async fn find_all(&self) -> Result<Vec<Record>, RepositoryError> {
        Ok(self.store.find_all(self.schema).await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Record, RepositoryError> {
        let id = Self::parse_id(id)?;
        self.store
            .find_by_id(self.schema, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    pub async fn find_one(&self, field: &str, value: &str) -> Result<Option<Record>, RepositoryError> {
        Ok(self.store.find_one(self.schema, field, value).await?)
    }

    pub async fn create(&self, input: &Document) -> Result<Record, RepositoryError> {
        let fields = self.schema.prepare(Operation::Create, &Document::new(), input)?;
        let record = Record::new(fields, Utc::now());
        Ok(self.store.insert(self.schema, record).await?)
    }

    /// Merge `patch` onto the stored document, re-validate the result, persist.
    pub async fn update(&self, id: &str, patch: &Document) -> Result<Record, RepositoryError> {
        let mut record = self.find_by_id(id).await?;
        record.fields = self.schema.prepare(Operation::Update, &record.fields, patch)?;
        record.updated_at = Utc::now();
        self.store
            .replace(self.schema, record)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    pub async fn delete(&self, id: &str) -> Result<Record, RepositoryError> {
        let id = Self::parse_id(id)?;
        self.store
            .delete(self.schema, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::schema::{CLIENT_SCHEMA, PERFUME_SCHEMA};
    use serde_json::{json, Value};

    fn doc(v: Value) -> Document {
        v.as_object().cloned().unwrap()
    }

    fn perfume() -> Document {
        doc(json!({
            "name": "Light Blue",
            "brand": "Dolce & Gabbana",
            "fraganceFamily": "Citrus",
            "size": 100,
            "price": 89.99,
            "stock": 12,
            "gender": "Women"
        }))
    }

    #[tokio::test]
    async fn distinguishes_malformed_from_missing_ids() {
        let store = MemoryStore::new();
        let repo = Repository::new(&store, &PERFUME_SCHEMA);
        assert!(matches!(repo.find_by_id("not-an-id").await, Err(RepositoryError::InvalidId(_))));
        let missing = Uuid::new_v4().to_string();
        assert!(matches!(repo.find_by_id(&missing).await, Err(RepositoryError::NotFound)));
        assert!(matches!(repo.delete(&missing).await, Err(RepositoryError::NotFound)));
        assert!(matches!(repo.update("xyz", &Document::new()).await, Err(RepositoryError::InvalidId(_))));
        assert!(matches!(repo.delete("xyz").await, Err(RepositoryError::InvalidId(_))));
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let store = MemoryStore::new();
        let repo = Repository::new(&store, &PERFUME_SCHEMA);
        let created = repo.create(&perfume()).await.unwrap();
        let updated = repo
            .update(&created.id.to_string(), &doc(json!({"price": 79.5})))
            .await
            .unwrap();
        assert_eq!(updated.fields["price"], json!(79.5));
        assert_eq!(updated.fields["name"], json!("Light Blue"));
        assert_eq!(updated.fields["stock"], json!(12));
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn invalid_update_leaves_record_untouched() {
        let store = MemoryStore::new();
        let repo = Repository::new(&store, &PERFUME_SCHEMA);
        let created = repo.create(&perfume()).await.unwrap();
        let id = created.id.to_string();
        let err = repo.update(&id, &doc(json!({"price": -1}))).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(ref e) if e.has_field("price")));
        assert_eq!(repo.find_by_id(&id).await.unwrap().fields["price"], json!(89.99));
    }

    #[tokio::test]
    async fn duplicate_email_is_a_distinct_kind() {
        let store = MemoryStore::new();
        let repo = Repository::new(&store, &CLIENT_SCHEMA);
        let input = doc(json!({
            "firstName": "Maria",
            "lastName": "Garcia",
            "email": "maria@x.com",
            "phone": "5551234567",
            "address": "123 Main St",
            "city": "CDMX"
        }));
        repo.create(&input).await.unwrap();
        let mut again = input.clone();
        again.insert("email".into(), json!("MARIA@x.com"));
        let err = repo.create(&again).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { ref field, .. } if field == "email"));
    }
}
