#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use parfum_api::auth::{ExternalProfile, IdentityProvider, ProviderError};
use parfum_api::config::AppConfig;
use parfum_api::database::MemoryStore;
use parfum_api::middleware::create_session_layer;
use parfum_api::router;
use parfum_api::state::AppState;

/// Authorization code the stub provider accepts for a user with a display name.
pub const OCTOCAT_CODE: &str = "octocat";
/// Authorization code for a user without a display name.
pub const ANONYMOUS_CODE: &str = "anonymous";

/// Identity provider that never leaves the process.
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn authorize_url(&self, state: &str) -> Result<String, ProviderError> {
        Ok(format!(
            "https://github.test/login/oauth/authorize?client_id=test&scope=user%3Aemail&state={}",
            state
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, ProviderError> {
        match code {
            OCTOCAT_CODE => Ok(ExternalProfile {
                id: "583231".to_string(),
                username: "octocat".to_string(),
                display_name: Some("The Octocat".to_string()),
                email: Some("octocat@github.com".to_string()),
            }),
            ANONYMOUS_CODE => Ok(ExternalProfile {
                id: "1".to_string(),
                username: "ghost".to_string(),
                display_name: None,
                email: None,
            }),
            _ => Err(ProviderError::Rejected("bad_verification_code".to_string())),
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub cookie: Option<String>,
    /// Full Set-Cookie header, attributes included.
    pub set_cookie: Option<String>,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::from_env();
        let store = Arc::new(MemoryStore::new());
        let sessions = create_session_layer(tower_sessions::MemoryStore::default(), &config.session);
        let state = AppState::new(store.clone(), Arc::new(StubProvider), config);

        Self {
            router: router::app(state, sessions),
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        // Keep only the `name=value` pair of the session cookie.
        let cookie = set_cookie
            .as_deref()
            .and_then(|v| v.split(';').next())
            .map(str::to_string);

        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };

        Ok(TestResponse {
            status,
            location,
            cookie,
            set_cookie,
            body,
        })
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.request(Method::GET, uri, None, None).await
    }

    /// Start a login and return the pending session cookie and OAuth state.
    pub async fn begin_login(&self) -> Result<(String, String)> {
        let res = self.get("/login").await?;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "login should redirect: {}", res.body);
        let location = res.location.context("login redirect without Location")?;
        let state = url::Url::parse(&location)?
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .context("authorize URL without state")?;
        let cookie = res.cookie.context("login did not set a session cookie")?;
        Ok((cookie, state))
    }

    /// Complete the full OAuth round trip and return the authenticated cookie.
    pub async fn login(&self, code: &str) -> Result<String> {
        let (cookie, state) = self.begin_login().await?;
        let res = self
            .request(
                Method::GET,
                &format!("/github/callback?code={}&state={}", code, state),
                None,
                Some(&cookie),
            )
            .await?;
        assert_eq!(res.status, StatusCode::OK, "callback failed: {:?}", res.location);
        // The session id is cycled on login.
        Ok(res.cookie.unwrap_or(cookie))
    }
}

pub fn perfume() -> Value {
    json!({
        "name": "Light Blue",
        "brand": "Dolce & Gabbana",
        "fraganceFamily": "Citrus",
        "size": 100,
        "price": 89.99,
        "stock": 12,
        "gender": "Women"
    })
}

pub fn maria() -> Value {
    json!({
        "firstName": "Maria",
        "lastName": "Garcia",
        "email": "maria@x.com",
        "phone": "5551234567",
        "address": "123 Main St",
        "city": "CDMX"
    })
}
