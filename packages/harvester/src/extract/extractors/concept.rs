//! Concept and Interviewer Instruction extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::error::Result;
use crate::extract::extractor::{Extractor, FieldReader};
use crate::extract::record::ExtractedRecord;
use crate::types::ItemType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConceptRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    pub version_responsibility: String,
    pub version_rationale: String,
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewerInstructionRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "InstructionText")]
    pub instruction_text: String,
}

pub struct ConceptExtractor;

impl Extractor for ConceptExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Concept
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        let r = FieldReader::new(root, ItemType::Concept.label());
        Ok(ExtractedRecord::Concept(ConceptRecord {
            urn: r.text(".//URN")?,
            version_responsibility: r.text(".//VersionResponsibility")?,
            version_rationale: r.text(".//VersionRationale/RationaleDescription/String")?,
            name: r.text(".//ConceptName/String")?,
            label: r.text(".//Label/Content")?,
        }))
    }
}

pub struct InterviewerInstructionExtractor;

impl Extractor for InterviewerInstructionExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::InterviewerInstruction
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        extract_interviewer_instruction(root).map(ExtractedRecord::InterviewerInstruction)
    }
}

/// Extract an Interviewer Instruction payload.
pub fn extract_interviewer_instruction(root: Node<'_, '_>) -> Result<InterviewerInstructionRecord> {
    let r = FieldReader::new(root, ItemType::InterviewerInstruction.label());
    Ok(InterviewerInstructionRecord {
        urn: r.text(".//URN")?,
        user_id: r.text(".//UserID")?,
        instruction_text: r.text(".//InstructionText/LiteralText/Text")?,
    })
}
