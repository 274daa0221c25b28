//! Process configuration.
//!
//! Settings are read once at startup from an optional `.env` file in the base
//! directory plus the process environment, validated in one pass, and then handed
//! to every component by parameter. Lookup is case-insensitive and variables
//! the application does not know about are ignored.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use validator::{Validate, ValidationErrors};

pub mod database;
mod env;

pub use database::DatabaseConfig;
pub use env::EnvSource;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Overrides the directory the `.env` file is looked up in.
pub const BASE_DIR_VAR: &str = "APP_BASE_DIR";

/// Location of the optional env file: `.env` in the base directory.
///
/// The base directory is `APP_BASE_DIR` when set, otherwise the working
/// directory, and this crate's manifest directory as a last resort.
pub fn default_env_file() -> PathBuf {
    env_file_in(
        std::env::var_os(BASE_DIR_VAR).map(PathBuf::from),
        std::env::current_dir().ok(),
    )
}

fn env_file_in(base_override: Option<PathBuf>, working_dir: Option<PathBuf>) -> PathBuf {
    base_override
        .filter(|dir| !dir.as_os_str().is_empty())
        .or(working_dir)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")))
        .join(".env")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to decode environment: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),
}

impl ConfigError {
    /// Field issues carried by an [`ConfigError::Invalid`] error, empty otherwise.
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            ConfigError::Invalid(issues) => issues,
            _ => &[],
        }
    }
}

/// One missing or malformed setting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Validated, immutable application settings.
#[derive(Clone)]
pub struct Settings {
    pub app_name: String,
    pub env: String,
    pub database_url: String,
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: u32,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    signing_algorithm: Algorithm,
}

impl Settings {
    /// Loads settings from the default `.env` location and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_env_file())
    }

    pub fn load_from(env_file: &Path) -> Result<Self, ConfigError> {
        let source = EnvSource::load(env_file)?;
        let settings = Self::from_source(&source)?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Builds settings from an already collected source.
    ///
    /// Every missing or malformed field is reported in a single
    /// [`ConfigError::Invalid`], sorted by field name.
    pub fn from_source(source: &EnvSource) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_value(source.to_value()?)?;

        let mut issues = Issues::default();
        if let Err(errors) = raw.validate() {
            issues.extend_validation(&errors);
        }

        let signing_algorithm = issues.parse::<Algorithm>(
            "algorithm",
            raw.algorithm.as_deref(),
            "a JWT signing algorithm such as HS256",
        );
        let access_token_expire_minutes = issues.parse_where::<u32>(
            "access_token_expire_minutes",
            raw.access_token_expire_minutes.as_deref(),
            |minutes| *minutes > 0,
            "a positive integer",
        );
        let server = ServerConfig {
            host: raw.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: issues
                .parse::<u16>("port", raw.port.as_deref(), "a TCP port number")
                .unwrap_or(DEFAULT_PORT),
        };
        let database = DatabaseConfig::from_raw(&raw, &mut issues);

        match (
            raw.app_name,
            raw.env,
            raw.database_url,
            raw.secret_key,
            raw.algorithm,
            signing_algorithm,
            access_token_expire_minutes,
        ) {
            (
                Some(app_name),
                Some(env),
                Some(database_url),
                Some(secret_key),
                Some(algorithm),
                Some(signing_algorithm),
                Some(access_token_expire_minutes),
            ) if issues.is_empty() => Ok(Self {
                app_name,
                env,
                database_url,
                secret_key,
                algorithm,
                access_token_expire_minutes,
                server,
                database,
                signing_algorithm,
            }),
            _ => Err(issues.into_error()),
        }
    }

    /// `algorithm` parsed into the signing algorithm tokens are issued with.
    pub fn signing_algorithm(&self) -> Algorithm {
        self.signing_algorithm
    }

    /// Lifetime of an access token, from `access_token_expire_minutes`.
    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.access_token_expire_minutes))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("env", &self.env)
            .field("database_url", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("server", &self.server)
            .field("database", &self.database)
            .finish()
    }
}

/// Name-matched view of the environment before type conversion.
#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct RawSettings {
    #[validate(required(message = "is required"))]
    pub app_name: Option<String>,
    #[validate(required(message = "is required"))]
    pub env: Option<String>,
    #[validate(required(message = "is required"))]
    pub database_url: Option<String>,
    #[validate(required(message = "is required"))]
    pub secret_key: Option<String>,
    #[validate(required(message = "is required"))]
    pub algorithm: Option<String>,
    #[validate(required(message = "is required"))]
    pub access_token_expire_minutes: Option<String>,

    pub host: Option<String>,
    pub port: Option<String>,

    pub db_max_connections: Option<String>,
    pub db_min_connections: Option<String>,
    pub db_connect_timeout_secs: Option<String>,
    pub db_acquire_timeout_secs: Option<String>,
    pub db_idle_timeout_secs: Option<String>,
    pub db_max_lifetime_secs: Option<String>,
    pub db_sqlx_logging: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct Issues(Vec<FieldIssue>);

impl Issues {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldIssue {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn extend_validation(&mut self, errors: &ValidationErrors) {
        for (field, errors) in errors.field_errors() {
            for error in errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                self.push(&field, message);
            }
        }
    }

    /// Parses an optional value; absent values yield `None` without an issue.
    pub fn parse<T: FromStr>(&mut self, field: &str, raw: Option<&str>, expected: &str) -> Option<T> {
        self.parse_where(field, raw, |_| true, expected)
    }

    pub fn parse_where<T: FromStr>(
        &mut self,
        field: &str,
        raw: Option<&str>,
        accept: impl FnOnce(&T) -> bool,
        expected: &str,
    ) -> Option<T> {
        let raw = raw?;
        match raw.trim().parse::<T>() {
            Ok(value) if accept(&value) => Some(value),
            _ => {
                self.push(field, format!("must be {expected}, got {raw:?}"));
                None
            }
        }
    }

    pub fn flag(&mut self, field: &str, raw: Option<&str>) -> Option<bool> {
        let raw = raw?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => {
                self.push(field, format!("must be a boolean, got {raw:?}"));
                None
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_error(mut self) -> ConfigError {
        self.0.sort();
        ConfigError::Invalid(self.0)
    }
}
