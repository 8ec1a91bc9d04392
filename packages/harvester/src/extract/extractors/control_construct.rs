//! Control construct extraction: Sequence, Statement and Instrument.

use roxmltree::Node;
use serde::Serialize;

use crate::error::Result;
use crate::extract::extractor::{Extractor, FieldReader};
use crate::extract::record::ExtractedRecord;
use crate::types::{ItemType, PositionedReference};
use crate::xml::{find_by_attribute, text_content};

/// `typeOfUserID` of the instrument's source identifier.
const SOURCE_ID_TYPE: &str = "colectica:sourceId";

/// `typeOfUserID` of the instrument's source file name.
const SOURCE_FILE_NAME_TYPE: &str = "closer:sourceFileName";

/// Decoded Sequence item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "SourceId")]
    pub source_id: String,
    #[serde(rename = "ConstructName")]
    pub construct_name: String,
    #[serde(rename = "Label")]
    pub label: String,
    pub references: Vec<PositionedReference>,
}

/// Decoded Statement item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "SourceId")]
    pub source_id: String,
    /// Raw attribute value; `""` when the registry stored `{}`.
    #[serde(rename = "Instruction")]
    pub instruction: String,
    #[serde(rename = "Label")]
    pub label: String,
    #[serde(rename = "Literal")]
    pub literal: String,
}

/// Decoded Instrument item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "InstrumentSourceID")]
    pub source_id: Option<String>,
    #[serde(rename = "InstrumentLabel")]
    pub label: Option<String>,
    #[serde(rename = "InstrumentName")]
    pub name: String,
    #[serde(rename = "ExternalInstrumentLocation")]
    pub external_location: String,
    pub references: Vec<PositionedReference>,
}

pub struct SequenceExtractor;

impl Extractor for SequenceExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Sequence
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        let r = FieldReader::new(root, ItemType::Sequence.label());
        Ok(ExtractedRecord::Sequence(SequenceRecord {
            urn: r.text(".//URN")?,
            source_id: r.text(".//UserID")?,
            construct_name: r.text(".//ConstructName/String")?,
            label: r.text(".//Label/Content")?,
            references: r.references(".//ControlConstructReference"),
        }))
    }
}

pub struct StatementExtractor;

impl Extractor for StatementExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Statement
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        let r = FieldReader::new(root, ItemType::Statement.label());

        let mut instruction = r.text(".//UserAttributePair/AttributeValue")?;
        if instruction == "{}" {
            instruction.clear();
        }

        Ok(ExtractedRecord::Statement(StatementRecord {
            urn: r.text(".//URN")?,
            source_id: r.text(".//UserID")?,
            instruction,
            label: r.text(".//ConstructName/String")?,
            literal: r.text(".//DisplayText/LiteralText/Text")?,
        }))
    }
}

pub struct InstrumentExtractor;

impl Extractor for InstrumentExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Instrument
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        let r = FieldReader::new(root, ItemType::Instrument.label());
        let user_id = |kind: &str| {
            find_by_attribute(root, "typeOfUserID", kind).and_then(text_content)
        };

        Ok(ExtractedRecord::Instrument(InstrumentRecord {
            urn: r.text(".//URN")?,
            source_id: user_id(SOURCE_ID_TYPE),
            label: user_id(SOURCE_FILE_NAME_TYPE),
            name: r.text(".//InstrumentName/String")?,
            external_location: r.text(".//ExternalInstrumentLocation")?,
            references: r.references(".//ControlConstructReference"),
        }))
    }
}
