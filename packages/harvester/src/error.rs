//! Error types for the harvester.
//!
//! Uses the dual-error pattern: `HarvesterError` for library consumers
//! with detailed error context, and a crate-wide `Result` alias.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Invalid agency identifier format.
    #[error("Invalid agency ID: '{0}'. Expected a dotted name (e.g., uk.cls.nextsteps)")]
    InvalidAgency(String),

    /// Invalid item identifier format.
    #[error("Invalid identifier: '{0}'. Expected a UUID")]
    InvalidIdentifier(String),

    /// XML parsing failed.
    #[error("Malformed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),

    /// A JSON value embedded in an XML element could not be decoded.
    #[error("Malformed attribute value in {context}: {source}")]
    MalformedAttribute {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Missing required XML element or attribute.
    #[error("Missing required field {path} in {item_type}")]
    FieldNotFound { item_type: String, path: String },

    /// The registry has no item with this agency and identifier.
    #[error("Item not found: {agency}/{identifier}")]
    ItemNotFound { agency: String, identifier: String },

    /// Credentials were rejected or have expired.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// All retries for a transient failure were exhausted.
    #[error("Transient network failure after {attempts} attempts: {message}")]
    TransientNetwork { attempts: u32, message: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Item type code missing from the type code table.
    #[error("Unknown item type code: {0}")]
    UnknownTypeCode(String),

    /// A resolved item was not of the expected type.
    #[error("Expected a {expected} item, got {found}")]
    UnexpectedItemType { expected: String, found: String },

    /// The operation was cancelled by the caller.
    #[error("Operation cancelled")]
    Cancelled,

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    YamlSerialization(#[from] serde_yaml_ng::Error),
}

impl HarvesterError {
    /// Build a `FieldNotFound` error.
    pub fn field_not_found(item_type: impl Into<String>, path: impl Into<String>) -> Self {
        Self::FieldNotFound {
            item_type: item_type.into(),
            path: path.into(),
        }
    }

    /// True for errors caused by unparseable payload content.
    #[must_use]
    pub fn is_malformed_xml(&self) -> bool {
        matches!(self, Self::MalformedXml(_) | Self::MalformedAttribute { .. })
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
