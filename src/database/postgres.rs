//! Postgres-backed document store: one JSONB table per collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use tracing::info;
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::store::{DocumentStore, Record, StoreResult};
use crate::schema::Schema;

const COLUMNS: &str = "id, doc, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the collection table and one unique expression index per
    /// unique field.
    pub async fn migrate(&self, schemas: &[&Schema]) -> StoreResult<()> {
        for schema in schemas {
            let table = DatabaseManager::quote_identifier(schema.collection);
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id UUID PRIMARY KEY,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL
                )"
            );
            sqlx::query(&ddl).execute(&self.pool).await?;

            for field in schema.unique_fields() {
                let index = DatabaseManager::quote_identifier(&index_name(schema, field));
                let ddl = format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS {index} ON {table} ((doc->>'{}'))",
                    field.replace('\'', "''")
                );
                sqlx::query(&ddl).execute(&self.pool).await?;
            }
            info!(collection = schema.collection, "Collection ready");
        }
        Ok(())
    }

    fn table(schema: &Schema) -> String {
        DatabaseManager::quote_identifier(schema.collection)
    }

    fn to_record(schema: &Schema, row: &PgRow) -> StoreResult<Record> {
        let doc: Value = row.try_get("doc")?;
        let Value::Object(fields) = doc else {
            return Err(DatabaseError::Corrupt {
                collection: schema.collection.to_string(),
                message: "document is not an object".to_string(),
            });
        };
        Ok(Record {
            id: row.try_get::<Uuid, _>("id")?,
            fields,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }

    /// Translate unique index violations into `Duplicate`.
    fn map_write_error(schema: &Schema, err: sqlx::Error) -> DatabaseError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let field = schema
                    .unique_fields()
                    .into_iter()
                    .find(|field| db_err.constraint() == Some(index_name(schema, field).as_str()))
                    .unwrap_or("_id");
                return DatabaseError::Duplicate {
                    collection: schema.collection.to_string(),
                    field: field.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

fn index_name(schema: &Schema, field: &str) -> String {
    format!("{}_{}_key", schema.collection, field)
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find_all(&self, schema: &Schema) -> StoreResult<Vec<Record>> {
        let sql = format!("SELECT {COLUMNS} FROM {} ORDER BY created_at, id", Self::table(schema));
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|row| Self::to_record(schema, row)).collect()
    }

    async fn find_by_id(&self, schema: &Schema, id: Uuid) -> StoreResult<Option<Record>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", Self::table(schema));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| Self::to_record(schema, &row)).transpose()
    }

    async fn find_one(&self, schema: &Schema, field: &str, value: &str) -> StoreResult<Option<Record>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE doc->>$1 = $2 ORDER BY created_at LIMIT 1",
            Self::table(schema)
        );
        let row = sqlx::query(&sql)
            .bind(field)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| Self::to_record(schema, &row)).transpose()
    }

    async fn insert(&self, schema: &Schema, record: Record) -> StoreResult<Record> {
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}",
            Self::table(schema)
        );
        let row = sqlx::query(&sql)
            .bind(record.id)
            .bind(Json(&record.fields))
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(schema, e))?;
        Self::to_record(schema, &row)
    }

    async fn replace(&self, schema: &Schema, record: Record) -> StoreResult<Option<Record>> {
        let sql = format!(
            "UPDATE {} SET doc = $2, updated_at = $3 WHERE id = $1 RETURNING {COLUMNS}",
            Self::table(schema)
        );
        let row = sqlx::query(&sql)
            .bind(record.id)
            .bind(Json(&record.fields))
            .bind(record.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(schema, e))?;
        row.map(|row| Self::to_record(schema, &row)).transpose()
    }

    async fn delete(&self, schema: &Schema, id: Uuid) -> StoreResult<Option<Record>> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING {COLUMNS}", Self::table(schema));
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.map(|row| Self::to_record(schema, &row)).transpose()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
