//! Session middleware configuration.
//!
//! Cookie-backed sessions using tower-sessions. The store is chosen at startup
//! (Postgres in production, in-memory for `--memory` and tests).

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::{
    cookie::{time::Duration, Key, SameSite},
    service::SignedCookie,
    Expiry, SessionManagerLayer, SessionStore,
};

use crate::config::SessionConfig;

/// Signing key derived from the configured secret. SHA-512 yields the 64
/// bytes `Key` requires regardless of the secret's length.
pub fn signing_key(config: &SessionConfig) -> Key {
    let digest = Sha512::digest(config.secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer over `store`.
pub fn create_session_layer<S>(store: S, config: &SessionConfig) -> SessionManagerLayer<S, SignedCookie>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_expiry(Expiry::OnInactivity(Duration::hours(config.expiry_hours)))
        .with_secure(config.secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}
