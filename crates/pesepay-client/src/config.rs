//! Client configuration.
//!
//! Credentials are passed explicitly at construction; there are no
//! process-wide defaults. [`PesepayConfig::from_env`] is a convenience for
//! applications that keep them in the environment.

use std::env;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

use pesepay::{DEFAULT_BASE_URL, KEY_LENGTH};

/// Credentials and transport settings for [`crate::PesepayClient`].
///
/// `Debug` redacts the integration and encryption keys.
#[derive(Clone)]
pub struct PesepayConfig {
    /// Sent verbatim as the `Authorization` header.
    pub integration_key: Zeroizing<String>,
    /// Shared AES key material; the first 32 bytes are used.
    pub encryption_key: Zeroizing<String>,
    /// Where the gateway posts the final transaction result.
    pub result_url: String,
    /// Where the payer is sent after completing a redirect payment.
    pub return_url: String,
    /// Gateway host. Default: <https://api.pesepay.com>
    pub base_url: Url,
    /// Request timeout handed to the HTTP transport. `None` = no timeout.
    pub timeout: Option<Duration>,
    /// Skip TLS certificate validation. Test environments only.
    pub danger_accept_invalid_certs: bool,
}

impl std::fmt::Debug for PesepayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PesepayConfig")
            .field("integration_key", &"[REDACTED]")
            .field("encryption_key", &"[REDACTED]")
            .field("result_url", &self.result_url)
            .field("return_url", &self.return_url)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field(
                "danger_accept_invalid_certs",
                &self.danger_accept_invalid_certs,
            )
            .finish()
    }
}

impl PesepayConfig {
    /// Configuration against the production gateway.
    pub fn new(
        integration_key: impl Into<String>,
        encryption_key: impl Into<String>,
        result_url: impl Into<String>,
        return_url: impl Into<String>,
    ) -> Self {
        Self {
            integration_key: Zeroizing::new(integration_key.into()),
            encryption_key: Zeroizing::new(encryption_key.into()),
            result_url: result_url.into(),
            return_url: return_url.into(),
            base_url: default_base_url(),
            timeout: None,
            danger_accept_invalid_certs: false,
        }
    }

    /// Point the client at another host (sandbox, mock server).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PESEPAY_INTEGRATION_KEY` (required)
    /// - `PESEPAY_ENCRYPTION_KEY` (required, at least 32 bytes)
    /// - `PESEPAY_RESULT_URL` (required)
    /// - `PESEPAY_RETURN_URL` (required)
    /// - `PESEPAY_BASE_URL` (default: `https://api.pesepay.com`)
    /// - `PESEPAY_TIMEOUT_SECS` (default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        let integration_key = required("PESEPAY_INTEGRATION_KEY")?;
        let encryption_key = required("PESEPAY_ENCRYPTION_KEY")?;
        if encryption_key.len() < KEY_LENGTH {
            return Err(ConfigError::KeyTooShort(encryption_key.len()));
        }

        let result_url = required("PESEPAY_RESULT_URL")?;
        Url::parse(&result_url)
            .map_err(|e| ConfigError::InvalidUrl("PESEPAY_RESULT_URL".into(), e.to_string()))?;
        let return_url = required("PESEPAY_RETURN_URL")?;
        Url::parse(&return_url)
            .map_err(|e| ConfigError::InvalidUrl("PESEPAY_RETURN_URL".into(), e.to_string()))?;

        let base_url = env::var("PESEPAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidUrl("PESEPAY_BASE_URL".into(), e.to_string()))?;

        let timeout = optional_secs("PESEPAY_TIMEOUT_SECS")?;

        Ok(Self {
            integration_key: Zeroizing::new(integration_key),
            encryption_key: Zeroizing::new(encryption_key),
            result_url,
            return_url,
            base_url,
            timeout,
            danger_accept_invalid_certs: false,
        })
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL")
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::MissingRequired(var))
}

/// Unset means `None`; set but not a whole number of seconds is an error.
fn optional_secs(var: &'static str) -> Result<Option<Duration>, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|e| ConfigError::InvalidValue(var, format!("{raw:?}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::InvalidValue(var, e.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("PESEPAY_ENCRYPTION_KEY is {0} bytes, need at least 32")]
    KeyTooShort(usize),

    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
