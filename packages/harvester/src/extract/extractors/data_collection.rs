//! Data Collection extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::error::Result;
use crate::extract::extractor::{attribute_key_name, Extractor, FieldReader};
use crate::extract::record::{ExtractedRecord, UserAttributes};
use crate::types::{empty_map_if_none, ItemType, PositionedReference, Reference};
use crate::xml::get_text;

/// Decoded Data Collection item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataCollectionRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Label")]
    pub label: String,
    /// Cleaned user attributes, e.g. `instrumentId`.
    #[serde(rename = "Ref")]
    pub refs: UserAttributes,
    #[serde(rename = "CollectionEvent")]
    pub collection_event: CollectionEvent,
    /// The question scheme reference.
    #[serde(serialize_with = "empty_map_if_none")]
    pub reference: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionEvent {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "Agency")]
    pub agency: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "OrganizationRef")]
    pub organizations: Vec<PositionedReference>,
    #[serde(rename = "Date", serialize_with = "empty_map_if_none")]
    pub date: Option<CollectionDate>,
    #[serde(rename = "ModeOfCollection")]
    pub modes: Vec<ModeOfCollection>,
}

/// The single date recorded for a collection event.
///
/// Serializes as `{"StartDate": ...}`, `{"EndDate": ...}` or `{"SimpleDate": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CollectionDate {
    StartDate(String),
    EndDate(String),
    SimpleDate(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeOfCollection {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "Agency")]
    pub agency: String,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "TypeOfMode")]
    pub type_of_mode: String,
    #[serde(rename = "Description")]
    pub description: String,
}

pub struct DataCollectionExtractor;

impl Extractor for DataCollectionExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::DataCollection
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        extract_data_collection(root).map(ExtractedRecord::DataCollection)
    }
}

/// Extract a Data Collection payload.
pub fn extract_data_collection(root: Node<'_, '_>) -> Result<DataCollectionRecord> {
    let r = FieldReader::new(root, ItemType::DataCollection.label());

    let mut refs = UserAttributes::new();
    for pair in r.find_all(".//UserAttributePair") {
        let pair = r.within(pair);
        let key = pair.text(".//AttributeKey")?;
        let value = pair.text(".//AttributeValue")?;
        refs.insert(attribute_key_name(&key), strip_list_syntax(&value));
    }

    Ok(DataCollectionRecord {
        urn: r.text(".//URN")?,
        name: r.text(".//DataCollectionModuleName/String")?,
        label: r.text(".//Label/Content")?,
        refs,
        collection_event: extract_collection_event(&r)?,
        reference: r.optional_reference(".//QuestionSchemeReference"),
    })
}

fn extract_collection_event(r: &FieldReader<'_, '_>) -> Result<CollectionEvent> {
    let date_node = r.element(".//CollectionEvent/DataCollectionDate")?;
    let date = r.within(date_node);
    let date = if let Some(d) = date.find(".//StartDate") {
        Some(CollectionDate::StartDate(get_text(d)))
    } else if let Some(d) = date.find(".//EndDate") {
        Some(CollectionDate::EndDate(get_text(d)))
    } else {
        date.find(".//SimpleDate")
            .map(|d| CollectionDate::SimpleDate(get_text(d)))
    };

    let modes = r
        .find_all(".//CollectionEvent/ModeOfCollection")
        .into_iter()
        .map(|node| {
            let m = r.within(node);
            Ok(ModeOfCollection {
                urn: m.text("./URN")?,
                agency: m.text("./Agency")?,
                id: m.text("./ID")?,
                version: m.text("./Version")?,
                type_of_mode: m.text("./TypeOfModeOfCollection")?,
                description: m.text("./Description/Content")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CollectionEvent {
        urn: r.text(".//CollectionEvent/URN")?,
        agency: r.text(".//CollectionEvent/Agency")?,
        id: r.text(".//CollectionEvent/ID")?,
        version: r.text(".//CollectionEvent/Version")?,
        organizations: r.references(".//CollectionEvent/DataCollectorOrganizationReference"),
        date,
        modes,
    })
}

/// Remove Python-style list punctuation from an attribute value.
///
/// # Examples
/// ```
/// use ddi_harvester::extract::strip_list_syntax;
///
/// assert_eq!(strip_list_syntax("['X']"), "X");
/// assert_eq!(strip_list_syntax(r#"["a", "b"]"#), "a, b");
/// ```
#[must_use]
pub fn strip_list_syntax(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '\''))
        .collect()
}
