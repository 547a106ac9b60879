//! In-process document store. Used by the test suite and `--memory` mode.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::store::{DocumentStore, Record, StoreResult};
use crate::schema::Schema;

/// Collections are vectors so listing keeps insertion order. All writes take
/// the single write lock, which makes the unique check and the write atomic.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> DatabaseError {
        DatabaseError::QueryError("memory store lock poisoned".to_string())
    }

    /// First unique field of `candidate` already taken by another record.
    fn conflicting_field(schema: &Schema, records: &[Record], candidate: &Record) -> Option<&'static str> {
        schema.unique_fields().into_iter().find(|field| {
            let Some(value) = candidate.fields.get(*field) else {
                return false;
            };
            records
                .iter()
                .any(|r| r.id != candidate.id && r.fields.get(*field) == Some(value))
        })
    }

    fn duplicate(schema: &Schema, field: &str) -> DatabaseError {
        DatabaseError::Duplicate {
            collection: schema.collection.to_string(),
            field: field.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_all(&self, schema: &Schema) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections.get(schema.collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(&self, schema: &Schema, id: Uuid) -> StoreResult<Option<Record>> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections
            .get(schema.collection)
            .and_then(|records| records.iter().find(|r| r.id == id).cloned()))
    }

    async fn find_one(&self, schema: &Schema, field: &str, value: &str) -> StoreResult<Option<Record>> {
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections
            .get(schema.collection)
            .and_then(|records| records.iter().find(|r| r.get_str(field) == Some(value)).cloned()))
    }

    async fn insert(&self, schema: &Schema, record: Record) -> StoreResult<Record> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let records = collections.entry(schema.collection).or_default();
        if let Some(field) = Self::conflicting_field(schema, records, &record) {
            return Err(Self::duplicate(schema, field));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, schema: &Schema, record: Record) -> StoreResult<Option<Record>> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let Some(records) = collections.get_mut(schema.collection) else {
            return Ok(None);
        };
        if let Some(field) = Self::conflicting_field(schema, records, &record) {
            return Err(Self::duplicate(schema, field));
        }
        let Some(slot) = records.iter_mut().find(|r| r.id == record.id) else {
            return Ok(None);
        };
        slot.fields = record.fields;
        slot.updated_at = record.updated_at;
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, schema: &Schema, id: Uuid) -> StoreResult<Option<Record>> {
        let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
        let Some(records) = collections.get_mut(schema.collection) else {
            return Ok(None);
        };
        let position = records.iter().position(|r| r.id == id);
        Ok(position.map(|index| records.remove(index)))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.collections.read().map(|_| ()).map_err(|_| Self::poisoned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CLIENT_SCHEMA;
    use chrono::Utc;
    use serde_json::json;

    fn client(email: &str) -> Record {
        let fields = json!({"firstName": "Ana", "email": email}).as_object().cloned().unwrap();
        Record::new(fields, Utc::now())
    }

    #[tokio::test]
    async fn rejects_duplicate_unique_field() {
        let store = MemoryStore::new();
        store.insert(&CLIENT_SCHEMA, client("a@x.com")).await.unwrap();
        let err = store.insert(&CLIENT_SCHEMA, client("a@x.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate { ref field, .. } if field == "email"));
        assert_eq!(store.find_all(&CLIENT_SCHEMA).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replace_allows_keeping_own_unique_value() {
        let store = MemoryStore::new();
        let mut record = store.insert(&CLIENT_SCHEMA, client("a@x.com")).await.unwrap();
        record.fields.insert("firstName".into(), json!("Anna"));
        let updated = store.replace(&CLIENT_SCHEMA, record).await.unwrap().unwrap();
        assert_eq!(updated.fields["firstName"], json!("Anna"));
    }

    #[tokio::test]
    async fn replace_rejects_taking_another_records_value() {
        let store = MemoryStore::new();
        store.insert(&CLIENT_SCHEMA, client("a@x.com")).await.unwrap();
        let mut second = store.insert(&CLIENT_SCHEMA, client("b@x.com")).await.unwrap();
        second.fields.insert("email".into(), json!("a@x.com"));
        assert!(store.replace(&CLIENT_SCHEMA, second).await.is_err());
    }

    #[tokio::test]
    async fn delete_and_lookup_unknown_ids() {
        let store = MemoryStore::new();
        let record = store.insert(&CLIENT_SCHEMA, client("a@x.com")).await.unwrap();
        assert!(store.find_by_id(&CLIENT_SCHEMA, Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.delete(&CLIENT_SCHEMA, record.id).await.unwrap().is_some());
        assert!(store.delete(&CLIENT_SCHEMA, record.id).await.unwrap().is_none());
        assert!(store.find_one(&CLIENT_SCHEMA, "email", "a@x.com").await.unwrap().is_none());
    }
}
