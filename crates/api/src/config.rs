use std::fmt::Display;
use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

/// Default minimum password length for registration and password changes.
const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Environment variable lookup. `std::env::var` in production, a map in tests.
pub trait Lookup: Fn(&str) -> Option<String> {}
impl<F: Fn(&str) -> Option<String>> Lookup for F {}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Anything that is not recognisably development or test is treated as production.
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Environment::Development,
            "test" => Environment::Test,
            _ => Environment::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Log output format, from `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Documentation portal settings.
#[derive(Debug, Clone)]
pub struct DocsConfig {
    /// Mount path of the Swagger UI; the JSON document is served at `{path}-json`.
    pub path: String,
    /// Basic-auth password. Required outside development.
    pub password: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// Everything except the secrets has a default suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub environment: Environment,
    pub database_url: String,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub password_min_length: usize,
    pub docs: DocsConfig,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `APP_ENV`                 | `production`               |
    /// | `DATABASE_URL`            | **required**               |
    /// | `PASSWORD_MIN_LENGTH`     | `8`                        |
    /// | `DOCS_PATH`               | `/docs`                    |
    /// | `SWAGGER_PASSWORD`        | required unless development|
    /// | `LOG_FORMAT`              | `pretty` (or `json`)       |
    ///
    /// JWT variables are documented on [`JwtConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Lookup) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_var(&lookup, "PORT", 3000)?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let request_timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let environment = lookup("APP_ENV")
            .map(|v| Environment::parse(&v))
            .unwrap_or(Environment::Production);
        let database_url = required_var(&lookup, "DATABASE_URL")?;
        let jwt = JwtConfig::from_lookup(&lookup)?;
        let password_min_length =
            parse_var(&lookup, "PASSWORD_MIN_LENGTH", DEFAULT_PASSWORD_MIN_LENGTH)?;

        let docs_path = lookup("DOCS_PATH").unwrap_or_else(|| "/docs".into());
        if !docs_path.starts_with('/') || docs_path.len() < 2 {
            return Err(ConfigError::Invalid {
                name: "DOCS_PATH",
                value: docs_path,
                reason: "must start with '/' and name a path".into(),
            });
        }
        let docs_password = lookup("SWAGGER_PASSWORD").filter(|p| !p.is_empty());
        if docs_password.is_none() && !environment.is_development() {
            return Err(ConfigError::Missing("SWAGGER_PASSWORD"));
        }

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected 'pretty' or 'json'".into(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            environment,
            database_url,
            jwt,
            password_min_length,
            docs: DocsConfig {
                path: docs_path,
                password: docs_password,
            },
            log_format,
        })
    }
}

/// Read a required, non-empty variable.
pub(crate) fn required_var(lookup: &impl Lookup, name: &'static str) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parse a variable, falling back to `default` when unset.
pub(crate) fn parse_var<T>(
    lookup: &impl Lookup,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
