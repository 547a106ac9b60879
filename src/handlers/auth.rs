// handlers/auth.rs - GitHub login, callback and logout
//
// Every callback failure sends the browser back to /login without touching
// the session's user binding.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tower_sessions::Session;

use crate::auth::session::{establish, OAUTH_STATE_KEY};
use crate::auth::{find_or_create_user, generate_state, ProviderError};
use crate::database::models::User;
use crate::database::RepositoryError;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
enum LoginError {
    #[error("provider returned error: {0}")]
    Denied(String),

    #[error("missing authorization code")]
    MissingCode,

    #[error("state parameter does not match the session")]
    StateMismatch,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// GET /login - Redirect to the provider's consent page
pub async fn login(State(state): State<AppState>, session: Session) -> Result<Redirect, ApiError> {
    let oauth_state = generate_state();
    session
        .insert(OAUTH_STATE_KEY, &oauth_state)
        .await
        .map_err(|e| ApiError::internal_server_error("Error starting login", e))?;

    let url = state
        .identity
        .authorize_url(&oauth_state)
        .map_err(|e| ApiError::internal_server_error("Error starting login", e))?;

    Ok(Redirect::to(&url))
}

/// GET /github/callback - Finish the OAuth exchange and bind the user
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Response {
    match complete_login(&state, &session, params).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User logged in with GitHub");
            ApiResponse::message(format!(
                "Welcome, {}! You have successfully logged in with GitHub.",
                user.greeting_name()
            ))
            .into_response()
        }
        Err(e) => {
            tracing::warn!("GitHub login failed: {}", e);
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

async fn complete_login(state: &AppState, session: &Session, params: CallbackParams) -> Result<User, LoginError> {
    // The state is single-use whatever the outcome.
    let expected: Option<String> = session.remove(OAUTH_STATE_KEY).await?;

    if let Some(error) = params.error {
        return Err(LoginError::Denied(error));
    }
    let code = params.code.filter(|c| !c.is_empty()).ok_or(LoginError::MissingCode)?;
    match (expected, params.state) {
        (Some(expected), Some(received)) if expected == received => {}
        _ => return Err(LoginError::StateMismatch),
    }

    let profile = state.identity.exchange_code(&code).await?;
    let user = find_or_create_user(state.store.as_ref(), &profile).await?;
    establish(session, &user).await?;
    Ok(user)
}

/// GET /logout - Destroy the session
pub async fn logout(session: Session) -> ApiResult<Value> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::internal_server_error("Error logging out", e))?;

    Ok(ApiResponse::message("You have successfully logged out."))
}
