//! Client configuration loaded from the environment.
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file. Every setting has a default so an empty environment yields a
//! working client pointed at the public poster service.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_API_ENDPOINT: &str = "https://myqr-backend-2q84.onrender.com/generate-pdf";
/// The poster service sleeps when idle and can take 30-60s to wake up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;
pub const EXPECTED_DOCUMENT_TYPE: &str = "application/pdf";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MYQR_API_ENDPOINT is not a valid http(s) URL: {0}")]
    InvalidEndpoint(String),
    #[error("MYQR_REQUEST_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),
}

/// Maps in-form auxiliary field names to the part names the service expects.
///
/// Fields without an entry are sent under their own name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireNames {
    renames: BTreeMap<String, String>,
}

impl WireNames {
    pub fn new() -> Self {
        Self {
            renames: BTreeMap::new(),
        }
    }

    pub fn rename(mut self, field: impl Into<String>, wire: impl Into<String>) -> Self {
        self.renames.insert(field.into(), wire.into());
        self
    }

    pub fn wire_name<'a>(&'a self, field: &'a str) -> &'a str {
        self.renames.get(field).map(String::as_str).unwrap_or(field)
    }
}

impl Default for WireNames {
    fn default() -> Self {
        Self::new().rename("website", "website_url")
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub timeout: Duration,
    pub user_agent: String,
    pub wire_names: WireNames,
    pub expected_content_type: String,
}

impl ClientConfig {
    /// Build the configuration from `MYQR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        match env::var("MYQR_API_ENDPOINT") {
            Ok(raw) => config.endpoint = parse_endpoint(&raw)?,
            Err(_) => {
                log::warn!(
                    "MYQR_API_ENDPOINT not set, using default endpoint {}",
                    DEFAULT_API_ENDPOINT
                );
            }
        }

        if let Ok(raw) = env::var("MYQR_REQUEST_TIMEOUT_SECS") {
            config.timeout = parse_timeout(&raw)?;
        }

        if let Ok(agent) = env::var("MYQR_USER_AGENT") {
            if !agent.trim().is_empty() {
                config.user_agent = agent.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_API_ENDPOINT).expect("Default endpoint must be a valid URL"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("myqr-studio/{}", env!("CARGO_PKG_VERSION")),
            wire_names: WireNames::default(),
            expected_content_type: EXPECTED_DOCUMENT_TYPE.to_string(),
        }
    }
}

pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidEndpoint(raw.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::InvalidEndpoint(raw.to_string())),
    }
}

pub fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
