//! DDI Harvester - Extract DDI-Lifecycle metadata from a Colectica registry.
//!
//! This crate decodes namespaced DDI 3.2 XML payloads into typed records
//! and assembles question/response tables from a registry's items.
//!
//! # Example
//!
//! ```
//! use ddi_harvester::extract::dispatch;
//!
//! let xml = r#"<Fragment xmlns:r="ddi:reusable:3_2"><r:URN>urn:ddi:uk.cls:cs1:1</r:URN></Fragment>"#;
//! let record = dispatch(xml, "Code Set").unwrap();
//! assert_eq!(record.to_map().unwrap()["URN"], "urn:ddi:uk.cls:cs1:1");
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Configuration constants, validation and registry settings
//! - [`types`]: Core data types (ItemType, Reference)
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Namespace-normalized tree and path lookups
//! - [`extract`]: Per-item-type extractors and the dispatcher
//! - [`http`]: HTTP client with retries
//! - [`client`]: Registry client trait and Colectica implementation
//! - [`resolver`]: Fetch, decode and merge one item
//! - [`pipeline`]: Question and category table assembly
//! - [`table`]: Tables with CSV output
//! - [`cancel`]: Cancellation token
//! - [`cli`]: Command-line interface
//! - [`harvester`]: Main harvester service

pub mod cancel;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod harvester;
pub mod http;
pub mod pipeline;
pub mod resolver;
pub mod table;
pub mod types;
pub mod xml;

// Re-export main functions
pub use harvester::{fetch_item, harvest_question, item_info_set, item_set_table};

// Re-export commonly used items
pub use cancel::CancellationToken;
pub use client::{ColecticaClient, ItemEnvelope, ItemTypeCodes, RegistryClient, SetMember};
pub use config::{validate_agency, validate_identifier, RegistryConfig};
pub use error::{HarvesterError, Result};
pub use extract::{dispatch, ExtractedRecord};
pub use pipeline::{assemble_question, PipelineOptions};
pub use resolver::{ItemResolver, ResolvedItem};
pub use table::Table;
pub use types::{ItemType, PositionedReference, Reference};
