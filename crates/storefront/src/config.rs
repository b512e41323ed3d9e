//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional. An unset `ORDER_WEBHOOK_URL` is not a start-up
//! error: the server runs, and every submission fails until it is configured.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `ORDER_WEBHOOK_URL` - Endpoint receiving finished orders
//! - `ORDER_WEBHOOK_TIMEOUT_SECS` - Outbound request timeout (default: none)
//! - `PRODUCT_ID_5X7`, `PRODUCT_ID_6X6`, `PRODUCT_ID_6X8`, `PRODUCT_ID_8X8` -
//!   Product id overrides per print size
//! - `MAX_UPLOAD_BYTES` - Largest accepted image upload (default: 20 MiB)
//! - `DRAFT_IDLE_TIMEOUT_SECS` - Drafts and sessions expire after this much
//!   inactivity (default: 3600, at most 30 days)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use certificate_order_core::{ProductId, ProductIdOverrides};
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
const DEFAULT_DRAFT_IDLE_TIMEOUT_SECS: u64 = 60 * 60;
const MAX_DRAFT_IDLE_TIMEOUT_SECS: u64 = 30 * 24 * 60 * 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Order endpoint configuration
    pub webhook: WebhookConfig,
    /// Product id overrides for the size catalog
    pub product_ids: ProductIdOverrides,
    /// Largest accepted multipart body for the image upload
    pub max_upload_bytes: usize,
    /// Inactivity after which a draft and its session are dropped
    pub draft_idle_timeout: Duration,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Order endpoint configuration.
///
/// Implements `Debug` manually to redact the URL, which usually embeds a
/// token.
#[derive(Clone, Default)]
pub struct WebhookConfig {
    /// Endpoint URL; `None` makes every submission fail
    pub url: Option<SecretString>,
    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: &Lookup<'_>) -> Result<Self, ConfigError> {
        let host = parse_or_default(lookup, "STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port = parse_or_default(lookup, "STOREFRONT_PORT", 3000)?;
        let base_url = get_optional_env(lookup, "STOREFRONT_BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        let webhook = WebhookConfig::from_lookup(lookup)?;
        let product_ids = ProductIdOverrides {
            five_by_seven: parse_optional::<ProductId>(lookup, "PRODUCT_ID_5X7")?,
            six_by_six: parse_optional::<ProductId>(lookup, "PRODUCT_ID_6X6")?,
            six_by_eight: parse_optional::<ProductId>(lookup, "PRODUCT_ID_6X8")?,
            eight_by_eight: parse_optional::<ProductId>(lookup, "PRODUCT_ID_8X8")?,
        };

        let max_upload_bytes =
            parse_or_default(lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let draft_idle_timeout = parse_idle_timeout(lookup)?;
        let json_logs = get_optional_env(lookup, "LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        Ok(Self {
            host,
            port,
            base_url,
            webhook,
            product_ids,
            max_upload_bytes,
            draft_idle_timeout,
            json_logs,
            sentry_dsn: get_optional_env(lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(lookup, "SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_or_default(lookup, "SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_or_default(lookup, "SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl WebhookConfig {
    fn from_lookup(lookup: &Lookup<'_>) -> Result<Self, ConfigError> {
        let url = match get_optional_env(lookup, "ORDER_WEBHOOK_URL") {
            Some(raw) => {
                validate_url(&raw, "ORDER_WEBHOOK_URL")?;
                Some(SecretString::from(raw))
            }
            None => None,
        };
        let timeout = parse_optional::<u64>(lookup, "ORDER_WEBHOOK_TIMEOUT_SECS")?
            .map(Duration::from_secs);

        Ok(Self { url, timeout })
    }

    /// Whether an endpoint is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup used while loading configuration.
pub type Lookup<'a> = dyn Fn(&str) -> Option<String> + 'a;

/// Get an optional variable; blank values count as unset.
fn get_optional_env(lookup: &Lookup<'_>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Parse an optional variable.
fn parse_optional<T>(lookup: &Lookup<'_>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    get_optional_env(lookup, key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Parse a variable, falling back to `default` when unset.
fn parse_or_default<T>(lookup: &Lookup<'_>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    Ok(parse_optional(lookup, key)?.unwrap_or(default))
}

/// Parse `DRAFT_IDLE_TIMEOUT_SECS`, which must lie in `1..=30 days`.
fn parse_idle_timeout(lookup: &Lookup<'_>) -> Result<Duration, ConfigError> {
    const KEY: &str = "DRAFT_IDLE_TIMEOUT_SECS";
    let secs = parse_or_default(lookup, KEY, DEFAULT_DRAFT_IDLE_TIMEOUT_SECS)?;
    if !(1..=MAX_DRAFT_IDLE_TIMEOUT_SECS).contains(&secs) {
        return Err(ConfigError::InvalidEnvVar(
            KEY.to_string(),
            format!("must be between 1 and {MAX_DRAFT_IDLE_TIMEOUT_SECS} seconds"),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Validate that a URL is absolute http(s).
fn validate_url(raw: &str, var_name: &str) -> Result<(), ConfigError> {
    let url = url::Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(())
}
