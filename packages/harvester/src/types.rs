//! Core data types for the harvester.
//!
//! These types describe catalog items and the references between them.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Item types the extraction engine knows how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    #[serde(rename = "Series")]
    Series,
    #[serde(rename = "Study")]
    Study,
    #[serde(rename = "Data Collection")]
    DataCollection,
    #[serde(rename = "Sequence")]
    Sequence,
    #[serde(rename = "Statement")]
    Statement,
    #[serde(rename = "Organization")]
    Organization,
    #[serde(rename = "Instrument")]
    Instrument,
    #[serde(rename = "Question Group")]
    QuestionGroup,
    #[serde(rename = "Concept")]
    Concept,
    #[serde(rename = "Question")]
    Question,
    #[serde(rename = "Code Set")]
    CodeSet,
    #[serde(rename = "Interviewer Instruction")]
    InterviewerInstruction,
}

impl ItemType {
    /// Every dispatchable item type.
    pub const ALL: [ItemType; 12] = [
        Self::Series,
        Self::Study,
        Self::DataCollection,
        Self::Sequence,
        Self::Statement,
        Self::Organization,
        Self::Instrument,
        Self::QuestionGroup,
        Self::Concept,
        Self::Question,
        Self::CodeSet,
        Self::InterviewerInstruction,
    ];

    /// The registry's human-readable label for this type.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Series => "Series",
            Self::Study => "Study",
            Self::DataCollection => "Data Collection",
            Self::Sequence => "Sequence",
            Self::Statement => "Statement",
            Self::Organization => "Organization",
            Self::Instrument => "Instrument",
            Self::QuestionGroup => "Question Group",
            Self::Concept => "Concept",
            Self::Question => "Question",
            Self::CodeSet => "Code Set",
            Self::InterviewerInstruction => "Interviewer Instruction",
        }
    }

    /// Parse a label. Matching is exact; anything else is `None`.
    ///
    /// # Examples
    /// ```
    /// use ddi_harvester::types::ItemType;
    ///
    /// assert_eq!(ItemType::from_label("Code Set"), Some(ItemType::CodeSet));
    /// assert_eq!(ItemType::from_label("code set"), None);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pointer to another catalog item.
///
/// Always fully populated; an absent or partial reference is represented
/// as `None` by the code that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "Agency")]
    pub agency: String,

    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Version")]
    pub version: String,

    /// Value of the `TypeOfObject` element.
    #[serde(rename = "Type")]
    pub type_of_object: String,
}

impl Reference {
    /// Create a reference from its four parts.
    #[must_use]
    pub fn new(
        agency: impl Into<String>,
        id: impl Into<String>,
        version: impl Into<String>,
        type_of_object: impl Into<String>,
    ) -> Self {
        Self {
            agency: agency.into(),
            id: id.into(),
            version: version.into(),
            type_of_object: type_of_object.into(),
        }
    }

    /// DDI URN of the referenced item.
    ///
    /// # Examples
    /// ```
    /// use ddi_harvester::types::Reference;
    ///
    /// let r = Reference::new("uk.cls.nextsteps", "abc", "2", "CodeList");
    /// assert_eq!(r.urn(), "urn:ddi:uk.cls.nextsteps:abc:2");
    /// ```
    #[must_use]
    pub fn urn(&self) -> String {
        ddi_urn(&self.agency, &self.id, &self.version)
    }
}

/// Build `urn:ddi:{agency}:{id}:{version}`.
#[must_use]
pub fn ddi_urn(agency: &str, id: &str, version: &str) -> String {
    [crate::config::URN_PREFIX, agency, id, version].join(":")
}

/// A reference inside an ordered list, with its 1-based document position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionedReference {
    pub position: usize,

    /// `None` when the source element lacked one of the four fields.
    #[serde(flatten)]
    pub reference: Option<Reference>,
}

/// Serialize `None` as an empty mapping instead of `null`.
pub(crate) fn empty_map_if_none<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(v) => v.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_item_type_labels_round_trip() {
        for item_type in ItemType::ALL {
            assert_eq!(ItemType::from_label(item_type.label()), Some(item_type));
        }
        assert_eq!(ItemType::from_label("Category"), None);
    }

    #[test]
    fn test_reference_serializes_with_registry_keys() {
        let r = Reference::new("uk.cls.ncds", "1234", "1", "Universe");
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"Agency": "uk.cls.ncds", "ID": "1234", "Version": "1", "Type": "Universe"})
        );
    }

    #[test]
    fn test_positioned_reference_flattens() {
        let full = PositionedReference {
            position: 2,
            reference: Some(Reference::new("a", "b", "3", "Sequence")),
        };
        assert_eq!(
            serde_json::to_value(&full).unwrap(),
            json!({"position": 2, "Agency": "a", "ID": "b", "Version": "3", "Type": "Sequence"})
        );

        let empty = PositionedReference {
            position: 1,
            reference: None,
        };
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({"position": 1}));
    }

    #[test]
    fn test_ddi_urn() {
        assert_eq!(ddi_urn("uk.cls.bcs70", "x-y", "12"), "urn:ddi:uk.cls.bcs70:x-y:12");
    }

    proptest! {
        #[test]
        fn ddi_urn_has_five_segments(
            agency in "[a-z]{2,8}(\\.[a-z0-9]{1,8}){0,3}",
            id in "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
            version in 1u32..100_000,
        ) {
            let version = version.to_string();
            let urn = ddi_urn(&agency, &id, &version);
            let segments: Vec<&str> = urn.split(':').collect();
            let expected = ["urn", "ddi", agency.as_str(), id.as_str(), version.as_str()];

            prop_assert_eq!(segments, expected);
        }
    }
}
