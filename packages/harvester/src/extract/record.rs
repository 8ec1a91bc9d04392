//! The record produced by dispatching an item payload.

use serde::Serialize;
use serde_json::{Map, Value};

use super::extractors::{
    CodeSetRecord, ConceptRecord, DataCollectionRecord, InstrumentRecord,
    InterviewerInstructionRecord, OrganizationRecord, QuestionGroupRecord, QuestionRecord,
    SequenceRecord, SeriesRecord, StatementRecord, StudyRecord,
};
use crate::error::Result;
use crate::types::ItemType;

/// Decoded metadata for one item, one variant per item type.
///
/// Serializes to the nested-mapping view: each variant's own key set, or
/// `{}` for [`ExtractedRecord::Empty`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedRecord {
    Series(SeriesRecord),
    Study(StudyRecord),
    DataCollection(DataCollectionRecord),
    Sequence(SequenceRecord),
    Statement(StatementRecord),
    Organization(OrganizationRecord),
    Instrument(InstrumentRecord),
    QuestionGroup(QuestionGroupRecord),
    Concept(ConceptRecord),
    Question(QuestionRecord),
    CodeSet(CodeSetRecord),
    InterviewerInstruction(InterviewerInstructionRecord),
    /// The item type has no extractor.
    Empty {},
}

impl ExtractedRecord {
    /// The item type this record was extracted as, `None` for `Empty`.
    #[must_use]
    pub fn item_type(&self) -> Option<ItemType> {
        Some(match self {
            Self::Series(_) => ItemType::Series,
            Self::Study(_) => ItemType::Study,
            Self::DataCollection(_) => ItemType::DataCollection,
            Self::Sequence(_) => ItemType::Sequence,
            Self::Statement(_) => ItemType::Statement,
            Self::Organization(_) => ItemType::Organization,
            Self::Instrument(_) => ItemType::Instrument,
            Self::QuestionGroup(_) => ItemType::QuestionGroup,
            Self::Concept(_) => ItemType::Concept,
            Self::Question(_) => ItemType::Question,
            Self::CodeSet(_) => ItemType::CodeSet,
            Self::InterviewerInstruction(_) => ItemType::InterviewerInstruction,
            Self::Empty {} => return None,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty {})
    }

    /// The nested-mapping view of this record.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

/// `UserAttributePair` entries keyed by the last segment of their key.
///
/// Keeps first-insertion order; a repeated key replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UserAttributes(Map<String, Value>);

impl UserAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record_is_empty_map() {
        let record = ExtractedRecord::Empty {};
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({}));
        assert!(record.to_map().unwrap().is_empty());
        assert_eq!(record.item_type(), None);
    }

    #[test]
    fn test_user_attributes_overwrite_keeps_position() {
        let mut attrs = UserAttributes::new();
        attrs.insert("instrumentId", "a");
        attrs.insert("sweep", "1");
        attrs.insert("instrumentId", "b");

        assert_eq!(attrs.get("instrumentId"), Some("b"));
        assert_eq!(attrs.keys().collect::<Vec<_>>(), ["instrumentId", "sweep"]);
    }
}
