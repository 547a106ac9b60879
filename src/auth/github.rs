//! GitHub OAuth app client.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ExternalProfile, IdentityProvider, ProviderError};
use crate::config::GithubConfig;

/// Scope requested on the consent page.
pub const SCOPE: &str = "user:email";

const CLIENT_USER_AGENT: &str = concat!("parfum-api/", env!("CARGO_PKG_VERSION"));

pub struct GithubProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
    callback_url: String,
    authorize_url: String,
    token_url: String,
    api_url: String,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct GithubUser {
    id: u64,
    login: String,
    name: Option<String>,
}

#[derive(Deserialize)]
struct GithubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

impl GithubProvider {
    pub fn new(config: &GithubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
            authorize_url: config.authorize_url.clone(),
            token_url: config.token_url.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    async fn access_token(&self, code: &str) -> Result<String, ProviderError> {
        let response: TokenResponse = self
            .http
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&TokenRequest {
                client_id: &self.client_id,
                client_secret: self.client_secret.expose_secret(),
                code,
                redirect_uri: &self.callback_url,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.access_token, response.error) {
            (Some(token), None) => Ok(token),
            (_, Some(error)) => Err(ProviderError::Rejected(
                response.error_description.unwrap_or(error),
            )),
            (None, None) => Err(ProviderError::Rejected("no access token in response".to_string())),
        }
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str, token: &str) -> Result<T, ProviderError> {
        Ok(self
            .http
            .get(format!("{}{}", self.api_url, path))
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// Primary verified address, else the first one listed. Lookup failures
    /// leave the profile without an email.
    async fn primary_email(&self, token: &str) -> Option<String> {
        match self.get_json::<Vec<GithubEmail>>("/user/emails", token).await {
            Ok(emails) => pick_email(emails),
            Err(e) => {
                tracing::warn!("Could not read GitHub emails: {}", e);
                None
            }
        }
    }
}

fn pick_email(emails: Vec<GithubEmail>) -> Option<String> {
    let primary = emails.iter().position(|e| e.primary && e.verified);
    match primary {
        Some(index) => emails.into_iter().nth(index).map(|e| e.email),
        None => emails.into_iter().next().map(|e| e.email),
    }
}

#[async_trait]
impl IdentityProvider for GithubProvider {
    fn authorize_url(&self, state: &str) -> Result<String, ProviderError> {
        let url = Url::parse_with_params(
            &self.authorize_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.callback_url.as_str()),
                ("scope", SCOPE),
                ("state", state),
            ],
        )?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, ProviderError> {
        let token = self.access_token(code).await?;
        let user: GithubUser = self.get_json("/user", &token).await?;
        let email = self.primary_email(&token).await;

        Ok(ExternalProfile {
            id: user.id.to_string(),
            username: user.login,
            display_name: user.name,
            email,
        })
    }
}
