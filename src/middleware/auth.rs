use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

use crate::auth::session::current_user;
use crate::error::ApiError;
use crate::state::AppState;

pub const UNAUTHORIZED_MESSAGE: &str = "You are not authorized to do this, please log in";

/// Access guard: the request proceeds only when the session resolves to an
/// existing user, which is then available to handlers as `Extension<User>`.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = current_user(&session, state.store.as_ref())
        .await
        .ok_or_else(|| ApiError::unauthorized(UNAUTHORIZED_MESSAGE))?;

    tracing::debug!(user_id = %user.id, "{} {}", request.method(), request.uri().path());
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
