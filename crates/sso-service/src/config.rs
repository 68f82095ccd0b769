use crate::services::AuthConfig;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default bcrypt cost factor (~200ms per hash).
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Minimum accepted bcrypt cost.
pub const MIN_BCRYPT_COST: u32 = 10;

/// Maximum accepted bcrypt cost.
pub const MAX_BCRYPT_COST: u32 = 14;

/// Default session token lifetime in seconds (1 hour).
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct Config {
    pub database_url: SecretString,
    pub bind_address: String,
    pub token_ttl_seconds: i64,
    pub bcrypt_cost: u32,
    pub request_timeout: Duration,
    pub db_max_connections: u32,
}

/// Custom Debug implementation that redacts the database URL, which
/// usually embeds credentials.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("request_timeout", &self.request_timeout)
            .field("db_max_connections", &self.db_max_connections)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },

    #[error("Invalid token TTL: {0} (must be greater than 0 seconds)")]
    InvalidTokenTtl(i64),

    #[error("Invalid bcrypt cost: {0} (must be {min}-{max})", min = MIN_BCRYPT_COST, max = MAX_BCRYPT_COST)]
    InvalidBcryptCost(u32),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let token_ttl_seconds = parse_or(vars, "TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECONDS)?;
        if token_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidTokenTtl(token_ttl_seconds));
        }

        let bcrypt_cost = parse_or(vars, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(bcrypt_cost));
        }

        let request_timeout_seconds = parse_positive(
            vars,
            "REQUEST_TIMEOUT_SECONDS",
            DEFAULT_REQUEST_TIMEOUT_SECONDS,
        )?;

        let db_max_connections =
            parse_positive(vars, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        Ok(Config {
            database_url: SecretString::from(database_url.as_str()),
            bind_address,
            token_ttl_seconds,
            bcrypt_cost,
            request_timeout: Duration::from_secs(request_timeout_seconds),
            db_max_connections,
        })
    }

    /// Settings for the authentication core.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            token_ttl: chrono::Duration::seconds(self.token_ttl_seconds),
            bcrypt_cost: self.bcrypt_cost,
        }
    }

    pub fn database_url(&self) -> &str {
        self.database_url.expose_secret()
    }
}

fn parse_or<T: FromStr>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.clone(),
        }),
        None => Ok(default),
    }
}

fn parse_positive<T>(vars: &HashMap<String, String>, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    let value = parse_or(vars, name, default)?;
    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: vars.get(name).cloned().unwrap_or_default(),
        });
    }
    Ok(value)
}
