//! Configuration constants, validation and registry settings.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{HarvesterError, Result};

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum number of attempts for transient failures.
pub const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
pub const RETRY_BASE_DELAY_MS: u64 = 500;

/// Category fetches run one at a time unless configured otherwise.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 1;

/// Upper bound for the category fetch pool.
pub const MAX_FETCH_CONCURRENCY: usize = 32;

/// Scheme prefix of every DDI URN.
pub const URN_PREFIX: &str = "urn:ddi";

/// Environment variable names read by [`RegistryConfig::from_env`].
pub const ENV_HOST: &str = "COLECTICA_HOST";
pub const ENV_USERNAME: &str = "COLECTICA_USERNAME";
pub const ENV_PASSWORD: &str = "COLECTICA_PASSWORD";
pub const ENV_ITEM_TYPES: &str = "COLECTICA_ITEM_TYPES";
pub const ENV_FETCH_CONCURRENCY: &str = "COLECTICA_FETCH_CONCURRENCY";

/// Agency pattern: dot-separated name segments (e.g. uk.cls.nextsteps).
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static AGENCY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]*(\.[A-Za-z0-9][A-Za-z0-9-]*)*$").expect("valid regex")
});

/// Identifier pattern: a hyphenated UUID.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("valid regex")
});

/// Validate an agency identifier.
///
/// # Examples
/// ```
/// use ddi_harvester::config::validate_agency;
///
/// assert!(validate_agency("uk.cls.nextsteps").is_ok());
/// assert!(validate_agency("uk..cls").is_err());
/// ```
pub fn validate_agency(agency: &str) -> Result<()> {
    if AGENCY_PATTERN.is_match(agency) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidAgency(agency.to_string()))
    }
}

/// Validate an item identifier.
///
/// # Examples
/// ```
/// use ddi_harvester::config::validate_identifier;
///
/// assert!(validate_identifier("a6f96245-5c00-4ad3-89e9-79afaefa0c28").is_ok());
/// assert!(validate_identifier("a6f96245").is_err());
/// ```
pub fn validate_identifier(identifier: &str) -> Result<()> {
    if IDENTIFIER_PATTERN.is_match(identifier) {
        Ok(())
    } else {
        Err(HarvesterError::InvalidIdentifier(identifier.to_string()))
    }
}

/// Turn a bare host into a base URL without a trailing slash.
///
/// # Examples
/// ```
/// use ddi_harvester::config::normalize_base_url;
///
/// assert_eq!(normalize_base_url("discovery.closer.ac.uk"), "https://discovery.closer.ac.uk");
/// assert_eq!(normalize_base_url("http://localhost:8080/"), "http://localhost:8080");
/// ```
#[must_use]
pub fn normalize_base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

/// URL of the token endpoint.
#[must_use]
pub fn token_url(base_url: &str) -> String {
    format!("{base_url}/token/createtoken")
}

/// URL of a single item.
#[must_use]
pub fn item_url(base_url: &str, agency: &str, identifier: &str) -> String {
    format!("{base_url}/api/v1/item/{agency}/{identifier}")
}

/// URL of an item's typed member set.
#[must_use]
pub fn set_url(base_url: &str, agency: &str, identifier: &str, version: &str) -> String {
    format!("{base_url}/api/v1/set/{agency}/{identifier}/{version}/typed")
}

/// Settings for talking to a registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub item_types_path: Option<PathBuf>,
    pub fetch_concurrency: usize,
}

impl RegistryConfig {
    pub fn new(host: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(host.as_ref()),
            username: None,
            password: None,
            item_types_path: None,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup(ENV_HOST)
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| HarvesterError::Config(format!("{ENV_HOST} not set")))?;

        let mut config = Self::new(host);
        config.username = lookup(ENV_USERNAME);
        config.password = lookup(ENV_PASSWORD);
        config.item_types_path = lookup(ENV_ITEM_TYPES).map(PathBuf::from);

        if let Some(raw) = lookup(ENV_FETCH_CONCURRENCY) {
            let value = raw.trim().parse::<usize>().map_err(|_| {
                HarvesterError::Config(format!(
                    "{ENV_FETCH_CONCURRENCY} must be a number, got '{raw}'"
                ))
            })?;
            config = config.with_fetch_concurrency(value);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_item_types_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.item_types_path = Some(path.into());
        self
    }

    /// Clamp to `1..=MAX_FETCH_CONCURRENCY`.
    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.clamp(1, MAX_FETCH_CONCURRENCY);
        self
    }

    /// Credentials must be given together.
    pub fn validate(&self) -> Result<()> {
        match (&self.username, &self.password) {
            (Some(_), None) => Err(HarvesterError::Config(format!(
                "{ENV_USERNAME} is set but {ENV_PASSWORD} is not"
            ))),
            (None, Some(_)) => Err(HarvesterError::Config(format!(
                "{ENV_PASSWORD} is set but {ENV_USERNAME} is not"
            ))),
            _ => Ok(()),
        }
    }
}
