//! Question Group extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::error::Result;
use crate::extract::extractor::{Extractor, FieldReader};
use crate::extract::record::ExtractedRecord;
use crate::types::{empty_map_if_none, ItemType, PositionedReference, Reference};
use crate::xml::text_content;

/// Decoded Question Group item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionGroupRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Label")]
    pub label: Option<String>,
    #[serde(rename = "ConceptRef", serialize_with = "empty_map_if_none")]
    pub concept: Option<Reference>,
    #[serde(rename = "QuestionItemRef")]
    pub question_items: Vec<PositionedReference>,
    #[serde(rename = "QuestionGroupRef")]
    pub question_groups: Vec<PositionedReference>,
}

pub struct QuestionGroupExtractor;

impl Extractor for QuestionGroupExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::QuestionGroup
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        let r = FieldReader::new(root, ItemType::QuestionGroup.label());

        // The label element must exist even when it carries no text.
        let label = text_content(r.element(".//Label/Content")?);

        Ok(ExtractedRecord::QuestionGroup(QuestionGroupRecord {
            urn: r.text(".//URN")?,
            name: r.optional_text(".//QuestionGroupName/String"),
            label,
            concept: r.optional_reference(".//ConceptReference"),
            question_items: r.references(".//QuestionItemReference"),
            question_groups: r.references(".//QuestionGroupReference"),
        }))
    }
}
