//! Server configuration loaded from the environment.
//!
//! Required variables:
//! - `MERIDIAN_DATABASE_URL` - `PostgreSQL` connection string, with a
//!   fallback to plain `DATABASE_URL`
//! - `PAYMENT_PROVIDER_SECRET_KEY` - payment provider secret API key
//!
//! Optional:
//! - `MERIDIAN_HOST` / `MERIDIAN_PORT` - bind address (127.0.0.1:3000)
//! - `PAYMENT_PROVIDER_URL` - provider base URL (<https://api.stripe.com>)
//! - `MERIDIAN_CURRENCY` - ISO 4217 settlement currency (PLN)
//! - `SENTRY_DSN` / `SENTRY_ENVIRONMENT` - error tracking
//!
//! Secrets are rejected at startup when they look like placeholders or
//! have too little entropy to be real keys.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Secrets below this Shannon entropy (bits per character) are refused.
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a secret as a template value, matched
/// case-insensitively.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Everything the server needs to run, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` connection URL; treated as a secret since it embeds
    /// the database password.
    pub database_url: SecretString,
    pub host: IpAddr,
    pub port: u16,
    pub provider: ProviderConfig,
    /// ISO 4217 currency code applied to every order.
    pub currency: String,
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Payment provider API configuration.
///
/// `Debug` is implemented by hand so the secret key can never end up in a
/// log line.
#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub secret_key: SecretString,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Resolve the configuration from the process environment, reading a
    /// `.env` file first when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is absent, fails
    /// to parse, or a secret fails the strength checks.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = database_url_from_env("MERIDIAN_DATABASE_URL")?;
        let host = parse_env("MERIDIAN_HOST", "127.0.0.1")?;
        let port = parse_env("MERIDIAN_PORT", "3000")?;

        Ok(Self {
            database_url,
            host,
            port,
            provider: ProviderConfig::from_env()?,
            currency: env_or("MERIDIAN_CURRENCY", "PLN"),
            sentry_dsn: maybe_env("SENTRY_DSN"),
            sentry_environment: maybe_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// The address the listener binds to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ProviderConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: env_or("PAYMENT_PROVIDER_URL", "https://api.stripe.com"),
            secret_key: validated_secret("PAYMENT_PROVIDER_SECRET_KEY")?,
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn maybe_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// The database URL may arrive under the service-specific name or, on
/// managed platforms that attach a database, plain `DATABASE_URL`.
fn database_url_from_env(primary_key: &str) -> Result<SecretString, ConfigError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Shannon entropy of a string in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // secrets are far below f64 precision limits
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

fn validate_secret_strength(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("looks like a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(value);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy {entropy:.2} bits/char is below {MIN_ENTROPY_BITS_PER_CHAR:.1}; use a randomly generated key"
            ),
        ));
    }

    Ok(())
}

fn validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = require_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
