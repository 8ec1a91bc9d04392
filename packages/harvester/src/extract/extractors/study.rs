//! Study (sweep) extraction.

use roxmltree::Node;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::extract::extractor::{Extractor, FieldReader};
use crate::extract::record::ExtractedRecord;
use crate::types::{empty_map_if_none, ItemType, Reference};
use crate::xml::get_text;

/// Decoded Study item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    pub sweep: SweepDescription,
    pub funding: StudyFunding,
    pub data: StudyData,
    #[serde(rename = "Data Collection", serialize_with = "empty_map_if_none")]
    pub data_collection: Option<Reference>,
    #[serde(rename = "Metadata Packages", serialize_with = "empty_map_if_none")]
    pub metadata_packages: Option<Reference>,
}

/// Citation and abstract of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepDescription {
    pub title: String,
    pub principal_investigator: String,
    pub publisher: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    #[serde(serialize_with = "empty_map_if_none")]
    pub population: Option<Reference>,
    /// JSON-decoded `UserAttributePair` values.
    pub custom_field: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyFunding {
    #[serde(serialize_with = "empty_map_if_none")]
    pub organization: Option<Reference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyData {
    #[serde(rename = "KindOfData")]
    pub kind_of_data: String,
    #[serde(rename = "Analysis Unit")]
    pub analysis_unit: String,
    #[serde(rename = "Data File", serialize_with = "empty_map_if_none")]
    pub data_file: Option<Reference>,
}

pub struct StudyExtractor;

impl Extractor for StudyExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Study
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        extract_study(root).map(ExtractedRecord::Study)
    }
}

/// Extract a Study payload.
pub fn extract_study(root: Node<'_, '_>) -> Result<StudyRecord> {
    let r = FieldReader::new(root, ItemType::Study.label());

    let publisher = match r.find(".//Citation/Publisher") {
        Some(_) => Some(r.text(".//Citation/Publisher/PublisherName/String")?),
        None => None,
    };

    let custom_field = r
        .find_all(".//UserAttributePair/AttributeValue")
        .into_iter()
        .map(|node| r.decode_json::<Value>(&get_text(node)))
        .collect::<Result<Vec<_>>>()?;

    let sweep = SweepDescription {
        title: r.text(".//Citation/Title/String")?,
        principal_investigator: r.text(".//Citation/Creator/CreatorName/String")?,
        publisher,
        abstract_text: r.text(".//Abstract/Content")?,
        population: r.optional_reference(".//UniverseReference"),
        custom_field,
    };

    let funding = StudyFunding {
        organization: r.required_reference(".//FundingInformation/AgencyOrganizationReference")?,
    };

    let data = StudyData {
        kind_of_data: kind_of_data(&r)?,
        analysis_unit: r.text(".//AnalysisUnit")?,
        data_file: r.optional_reference(".//PhysicalInstanceReference"),
    };

    Ok(StudyRecord {
        urn: r.text(".//URN")?,
        sweep,
        funding,
        data,
        data_collection: r.required_reference(".//DataCollectionReference")?,
        metadata_packages: r
            .optional_reference(".//RequiredResourcePackages/ResourcePackageReference"),
    })
}

/// Text of every child of the first `KindOfData`, joined with `-`.
fn kind_of_data(r: &FieldReader<'_, '_>) -> Result<String> {
    let kind = r.element(".//KindOfData")?;
    let parts: Vec<String> = kind
        .children()
        .filter(|c| c.is_element())
        .map(get_text)
        .collect();
    Ok(parts.join("-"))
}
