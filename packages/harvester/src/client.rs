//! Registry access: the [`RegistryClient`] trait and its Colectica
//! implementation.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{self, RegistryConfig};
use crate::error::{HarvesterError, Result};
use crate::http;

/// An item as returned by the registry: envelope fields plus the XML payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEnvelope {
    /// Item type code (a GUID); see [`ItemTypeCodes`].
    #[serde(rename = "ItemType")]
    pub item_type: String,

    #[serde(rename = "AgencyId")]
    pub agency: String,

    #[serde(rename = "Identifier")]
    pub identifier: String,

    #[serde(rename = "Version", deserialize_with = "version_string")]
    pub version: String,

    /// The DDI XML fragment.
    #[serde(rename = "Item")]
    pub item: String,

    /// Every other envelope field, in registry order.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept a version given as a JSON number or string.
fn version_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a version number, got {other}"
        ))),
    }
}

/// One entry of a typed set: `{"Item1": {"Item1": id, ...}, "Item2": type_code}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMember {
    #[serde(rename = "Item1")]
    pub item: SetMemberItem,

    #[serde(rename = "Item2")]
    pub type_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetMemberItem {
    #[serde(rename = "Item1")]
    pub identifier: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SetMember {
    #[must_use]
    pub fn new(identifier: impl Into<String>, type_code: impl Into<String>) -> Self {
        Self {
            item: SetMemberItem {
                identifier: identifier.into(),
                extra: Map::new(),
            },
            type_code: type_code.into(),
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.item.identifier
    }
}

/// Item type labels keyed by registry type code.
///
/// Loaded from a JSON object mapping label to code, e.g.
/// `{"Question": "a1bb19bd-a24a-4443-8728-a6ad80eb42b8"}`. Codes are
/// matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ItemTypeCodes {
    labels: HashMap<String, String>,
}

impl ItemTypeCodes {
    pub fn from_pairs<I, L, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, C)>,
        L: Into<String>,
        C: AsRef<str>,
    {
        let labels = pairs
            .into_iter()
            .map(|(label, code)| (code.as_ref().to_lowercase(), label.into()))
            .collect();
        Self { labels }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let table: Map<String, Value> = serde_json::from_str(json)?;
        let pairs = table
            .into_iter()
            .map(|(label, code)| match code {
                Value::String(code) => Ok((label, code)),
                other => Err(HarvesterError::Config(format!(
                    "type code for '{label}' must be a string, got {other}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_pairs(pairs))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| {
            HarvesterError::Config(format!("cannot read type codes {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Human-readable label for a type code.
    pub fn label(&self, code: &str) -> Result<&str> {
        self.labels
            .get(&code.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| HarvesterError::UnknownTypeCode(code.to_string()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Read access to a metadata registry.
///
/// Implementations must be shareable across the category fetch pool.
pub trait RegistryClient: Send + Sync {
    /// Fetch one item by agency and identifier.
    fn get_an_item(&self, agency: &str, identifier: &str) -> Result<ItemEnvelope>;

    /// Fetch the typed member set of an item version.
    fn get_a_set_typed(&self, agency: &str, identifier: &str, version: &str)
        -> Result<Vec<SetMember>>;

    /// Decode an item type code into its label.
    fn item_type_label(&self, code: &str) -> Result<String>;
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Blocking client for the Colectica REST API.
pub struct ColecticaClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    type_codes: ItemTypeCodes,
}

impl ColecticaClient {
    /// Client without authentication.
    pub fn new(base_url: impl AsRef<str>, type_codes: ItemTypeCodes) -> Result<Self> {
        Ok(Self {
            http: http::create_client()?,
            base_url: config::normalize_base_url(base_url.as_ref()),
            token: None,
            type_codes,
        })
    }

    /// Build a client from configuration, loading the type code table and
    /// requesting a token when credentials are present.
    pub fn connect(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        let path = config.item_types_path.as_deref().ok_or_else(|| {
            HarvesterError::Config(format!("{} not set", config::ENV_ITEM_TYPES))
        })?;

        let mut client = Self::new(&config.base_url, ItemTypeCodes::from_file(path)?)?;
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            client.token = Some(client.create_token(username, password)?);
        }
        Ok(client)
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for an access token.
    pub fn create_token(&self, username: &str, password: &str) -> Result<String> {
        let url = config::token_url(&self.base_url);
        debug!(url = %url, "requesting access token");

        let body = TokenRequest { username, password };
        let response = http::send_with_retry(|| self.http.post(&url).json(&body))?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Err(HarvesterError::Auth(format!("token request rejected with {status}")));
        }
        let token: TokenResponse = response.error_for_status()?.json()?;
        Ok(token.access_token)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.http.get(url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl RegistryClient for ColecticaClient {
    fn get_an_item(&self, agency: &str, identifier: &str) -> Result<ItemEnvelope> {
        let url = config::item_url(&self.base_url, agency, identifier);
        debug!(agency, identifier, "fetching item");
        http::get_json(|| self.get(&url), agency, identifier)
    }

    fn get_a_set_typed(
        &self,
        agency: &str,
        identifier: &str,
        version: &str,
    ) -> Result<Vec<SetMember>> {
        let url = config::set_url(&self.base_url, agency, identifier, version);
        debug!(agency, identifier, version, "fetching set");
        http::get_json(|| self.get(&url), agency, identifier)
    }

    fn item_type_label(&self, code: &str) -> Result<String> {
        self.type_codes.label(code).map(str::to_string)
    }
}
