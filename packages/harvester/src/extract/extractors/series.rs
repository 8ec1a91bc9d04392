//! Series (study group) extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::error::Result;
use crate::extract::extractor::{Extractor, FieldReader};
use crate::extract::record::ExtractedRecord;
use crate::types::{empty_map_if_none, ItemType, PositionedReference, Reference};

/// Decoded Series item.
///
/// The serialized `study` key holds the ordered study-unit references.
/// The citation block is kept in `description` but never serialized: it
/// used to share the `study` key and consumers only ever saw the list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(skip)]
    pub description: SeriesDescription,
    pub study: Vec<PositionedReference>,
    pub funding: SeriesFunding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDescription {
    pub title: String,
    pub principal_investigator: String,
    pub publisher: String,
    pub rights: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(serialize_with = "empty_map_if_none")]
    pub population: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesFunding {
    #[serde(rename = "GrantNumber")]
    pub grant_number: Option<String>,
    #[serde(serialize_with = "empty_map_if_none")]
    pub organization: Option<Reference>,
}

pub struct SeriesExtractor;

impl Extractor for SeriesExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Series
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        extract_series(root).map(ExtractedRecord::Series)
    }
}

/// Extract a Series payload.
pub fn extract_series(root: Node<'_, '_>) -> Result<SeriesRecord> {
    let r = FieldReader::new(root, ItemType::Series.label());

    let description = SeriesDescription {
        title: r.text(".//Citation/Title/String")?,
        principal_investigator: r.text(".//Citation/Creator/CreatorName/String")?,
        publisher: r.text(".//Citation/Publisher/PublisherName/String")?,
        rights: r.text(".//Citation/Copyright/String")?,
        abstract_text: r.text(".//Abstract/Content")?,
        population: r.required_reference(".//UniverseReference")?,
    };

    let funding = SeriesFunding {
        grant_number: r.optional_text(".//FundingInformation/GrantNumber"),
        organization: r.required_reference(".//FundingInformation/AgencyOrganizationReference")?,
    };

    Ok(SeriesRecord {
        urn: r.text(".//URN")?,
        description,
        study: r.references(".//StudyUnitReference"),
        funding,
    })
}
