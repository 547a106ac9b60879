//! Session (de)serialization of the logged-in user.
//!
//! Only the user's internal id is kept in the session; the full record is
//! loaded from the store on every request that needs it.

use tower_sessions::Session;
use uuid::Uuid;

use crate::database::models::User;
use crate::database::{DatabaseError, DocumentStore};
use crate::schema::USER_SCHEMA;

/// Session key holding the serialized user reference.
pub const USER_KEY: &str = "user";

/// Session key holding the pending OAuth `state`.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

pub fn serialize_user(user: &User) -> Uuid {
    user.id
}

/// `None` when the referenced user no longer exists.
pub async fn deserialize_user(store: &dyn DocumentStore, id: Uuid) -> Result<Option<User>, DatabaseError> {
    store
        .find_by_id(&USER_SCHEMA, id)
        .await?
        .map(User::try_from)
        .transpose()
}

/// Bind `user` to the session under a fresh session id.
pub async fn establish(session: &Session, user: &User) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_KEY, serialize_user(user)).await
}

/// Resolve the session's user. Missing, unreadable or dangling references
/// all count as unauthenticated.
pub async fn current_user(session: &Session, store: &dyn DocumentStore) -> Option<User> {
    let id = match session.get::<Uuid>(USER_KEY).await {
        Ok(Some(id)) => id,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read session: {}", e);
            return None;
        }
    };

    match deserialize_user(store, id).await {
        Ok(Some(user)) => Some(user),
        Ok(None) => {
            tracing::warn!(user_id = %id, "Session references a user that no longer exists");
            None
        }
        Err(e) => {
            tracing::error!("Failed to load session user {}: {}", id, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, Record};
    use chrono::Utc;
    use std::sync::Arc;
    use tower_sessions::MemoryStore as SessionMemoryStore;

    #[tokio::test]
    async fn round_trips_user_through_session() {
        let store = MemoryStore::new();
        let doc = User::new_document("7", "mona", Some("Mona"), None);
        let record = store.insert(&USER_SCHEMA, Record::new(doc, Utc::now())).await.unwrap();
        let user = User::try_from(record).unwrap();

        let session = Session::new(None, Arc::new(SessionMemoryStore::default()), None);
        assert!(current_user(&session, &store).await.is_none());

        establish(&session, &user).await.unwrap();
        assert_eq!(current_user(&session, &store).await, Some(user.clone()));

        store.delete(&USER_SCHEMA, user.id).await.unwrap();
        assert!(current_user(&session, &store).await.is_none());
    }
}
