//! GitHub login: provider abstraction, local user mapping and session helpers.

pub mod github;
pub mod session;

use async_trait::async_trait;
use rand::{distr::Alphanumeric, Rng};
use thiserror::Error;

use crate::database::models::User;
use crate::database::{DocumentStore, Repository, RepositoryError};
use crate::schema::USER_SCHEMA;

pub use github::GithubProvider;

/// Profile returned by the identity provider after a code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider rejected the request: {0}")]
    Rejected(String),

    #[error("invalid provider URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// OAuth2 authorization-code identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Consent page URL the user is redirected to.
    fn authorize_url(&self, state: &str) -> Result<String, ProviderError>;

    /// Exchange an authorization code for the user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, ProviderError>;
}

/// Random CSRF token for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Reuse the local user linked to `profile`, creating it on first login.
pub async fn find_or_create_user(
    store: &dyn DocumentStore,
    profile: &ExternalProfile,
) -> Result<User, RepositoryError> {
    let users = Repository::new(store, &USER_SCHEMA);

    if let Some(record) = users.find_one("githubId", &profile.id).await? {
        return Ok(User::try_from(record)?);
    }

    let doc = User::new_document(
        &profile.id,
        &profile.username,
        profile.display_name.as_deref(),
        profile.email.as_deref(),
    );
    match users.create(&doc).await {
        Ok(record) => {
            tracing::info!(github_id = %profile.id, username = %profile.username, "Created user from GitHub login");
            Ok(User::try_from(record)?)
        }
        // A concurrent first login for the same account won the insert.
        Err(RepositoryError::Duplicate { .. }) => users
            .find_one("githubId", &profile.id)
            .await?
            .ok_or(RepositoryError::NotFound)
            .and_then(|record| Ok(User::try_from(record)?)),
        Err(other) => Err(other),
    }
}
