use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{service::SignedCookie, SessionManagerLayer, SessionStore};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::handlers::{auth, clients, perfumes, service};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full application router.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(service::root))
        .route("/health", get(service::health))
        .merge(auth_routes())
        .merge(perfume_routes(&state))
        .merge(client_routes())
        .fallback(not_found)
        .with_state(state)
        // Global middleware
        .layer(session_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/github/callback", get(auth::callback))
        .route("/logout", get(auth::logout))
}

/// Reads are open; POST, PUT and DELETE pass through the access guard.
fn perfume_routes(state: &AppState) -> Router<AppState> {
    let guard = middleware::from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route(
            "/parfums",
            get(perfumes::list).merge(post(perfumes::create).route_layer(guard.clone())),
        )
        .route(
            "/parfums/{id}",
            get(perfumes::get).merge(
                put(perfumes::update)
                    .delete(perfumes::delete)
                    .route_layer(guard),
            ),
        )
}

fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(clients::list).post(clients::create))
        .route(
            "/clients/{id}",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
}

fn cors_layer(config: &SecurityConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
