use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("{0} must be at least {1} characters in production")]
    TooShort(&'static str, usize),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database: DatabaseConfig,
    pub github: GithubConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<SecretString>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub callback_url: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: SecretString,
    pub cookie_name: String,
    pub secure: bool,
    pub expiry_hours: i64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
}

/// Minimum session secret length accepted outside development.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.port = v.parse().unwrap_or(self.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(SecretString::from(v));
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // GitHub OAuth overrides
        if let Ok(v) = env::var("GITHUB_CLIENT_ID") {
            self.github.client_id = v;
        }
        if let Ok(v) = env::var("GITHUB_CLIENT_SECRET") {
            self.github.client_secret = SecretString::from(v);
        }
        if let Ok(v) = env::var("GITHUB_CALLBACK_URL") {
            self.github.callback_url = v;
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_SECRET") {
            self.session.secret = SecretString::from(v);
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_SECURE") {
            self.session.secure = v.parse().unwrap_or(self.session.secure);
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            self.session.expiry_hours = v.parse().unwrap_or(self.session.expiry_hours);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    /// Reject configurations that cannot serve logins or sign cookies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.client_id.is_empty() {
            return Err(ConfigError::Missing("GITHUB_CLIENT_ID"));
        }
        if self.github.client_secret.expose_secret().is_empty() {
            return Err(ConfigError::Missing("GITHUB_CLIENT_SECRET"));
        }
        if self.environment != Environment::Development
            && self.session.secret.expose_secret().len() < MIN_SESSION_SECRET_LEN
        {
            return Err(ConfigError::TooShort("SESSION_SECRET", MIN_SESSION_SECRET_LEN));
        }
        Ok(())
    }

    fn base(environment: Environment) -> Self {
        Self {
            environment,
            port: 3000,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            github: GithubConfig {
                client_id: String::new(),
                client_secret: SecretString::from(String::new()),
                callback_url: "http://localhost:3000/github/callback".to_string(),
                authorize_url: "https://github.com/login/oauth/authorize".to_string(),
                token_url: "https://github.com/login/oauth/access_token".to_string(),
                api_url: "https://api.github.com".to_string(),
            },
            session: SessionConfig {
                secret: SecretString::from("development-session-secret".to_string()),
                cookie_name: "connect.sid".to_string(),
                secure: false,
                expiry_hours: 24,
            },
            security: SecurityConfig { cors_origins: Vec::new() },
        }
    }

    fn development() -> Self {
        Self::base(Environment::Development)
    }

    fn staging() -> Self {
        let mut config = Self::base(Environment::Staging);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.session.secure = true;
        config
    }

    fn production() -> Self {
        let mut config = Self::base(Environment::Production);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.session.secure = true;
        config.session.expiry_hours = 8;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
