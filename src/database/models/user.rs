use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::{DatabaseError, Record};
use crate::schema::{Document, USER_SCHEMA};

/// Local account linked to a GitHub identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub github_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Input document for a first-time login.
    pub fn new_document(
        github_id: &str,
        username: &str,
        display_name: Option<&str>,
        email: Option<&str>,
    ) -> Document {
        let mut doc = Document::new();
        doc.insert("githubId".into(), json!(github_id));
        doc.insert("username".into(), json!(username));
        if let Some(name) = display_name {
            doc.insert("displayName".into(), json!(name));
        }
        if let Some(email) = email {
            doc.insert("email".into(), json!(email));
        }
        doc
    }

    /// Name shown in the login greeting.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Guest")
    }
}

impl TryFrom<Record> for User {
    type Error = DatabaseError;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        let required = |field: &str| {
            record
                .get_str(field)
                .map(str::to_string)
                .ok_or_else(|| DatabaseError::Corrupt {
                    collection: USER_SCHEMA.collection.to_string(),
                    message: format!("user {} has no {}", record.id, field),
                })
        };
        let optional = |field: &str| record.fields.get(field).and_then(Value::as_str).map(str::to_string);

        Ok(User {
            id: record.id,
            github_id: required("githubId")?,
            username: required("username")?,
            display_name: optional("displayName"),
            email: optional("email"),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}
