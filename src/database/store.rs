use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

use crate::schema::{Document, Schema};

use super::manager::DatabaseError;

pub type StoreResult<T> = Result<T, DatabaseError>;

/// A stored document together with its system fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: Uuid,
    pub fields: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new(fields: Document, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }
}

/// Wire format: `{ "_id", ...fields, "createdAt", "updatedAt" }`
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 3))?;
        map.serialize_entry("_id", &self.id)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry("createdAt", &self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true))?;
        map.serialize_entry("updatedAt", &self.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true))?;
        map.end()
    }
}

/// Document storage keyed by collection. Implementations enforce the unique
/// fields declared by the schema atomically and report collisions as
/// [`DatabaseError::Duplicate`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in insertion order.
    async fn find_all(&self, schema: &Schema) -> StoreResult<Vec<Record>>;

    async fn find_by_id(&self, schema: &Schema, id: Uuid) -> StoreResult<Option<Record>>;

    /// First document whose string field equals `value`.
    async fn find_one(&self, schema: &Schema, field: &str, value: &str) -> StoreResult<Option<Record>>;

    async fn insert(&self, schema: &Schema, record: Record) -> StoreResult<Record>;

    /// Overwrite fields and `updated_at`. `None` when the id is unknown.
    async fn replace(&self, schema: &Schema, record: Record) -> StoreResult<Option<Record>>;

    /// Remove and return the document. `None` when the id is unknown.
    async fn delete(&self, schema: &Schema, id: Uuid) -> StoreResult<Option<Record>>;

    /// Liveness probe used by `/health`.
    async fn ping(&self) -> StoreResult<()>;
}
