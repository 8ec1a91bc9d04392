//! Item resolution: fetch an item, decode its payload and merge the result
//! with the envelope.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{ItemEnvelope, RegistryClient};
use crate::error::{HarvesterError, Result};
use crate::extract::extractors::InterviewerInstructionRecord;
use crate::extract::{dispatch, ExtractedRecord, QuestionRecord};
use crate::types::ItemType;

/// A fetched item with its decoded payload.
///
/// Serializes to the merged mapping described on [`ResolvedItem::to_map`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    /// Human-readable item type label.
    pub label: String,
    pub envelope: ItemEnvelope,
    pub record: ExtractedRecord,
}

impl ResolvedItem {
    /// Envelope fields with `ItemType` replaced by the label and `Item`
    /// dropped, then the extracted keys on top. Extracted keys win.
    pub fn to_map(&self) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        map.insert("ItemType".into(), Value::String(self.label.clone()));
        map.insert("AgencyId".into(), Value::String(self.envelope.agency.clone()));
        map.insert(
            "Identifier".into(),
            Value::String(self.envelope.identifier.clone()),
        );
        map.insert("Version".into(), Value::String(self.envelope.version.clone()));
        for (key, value) in &self.envelope.extra {
            map.insert(key.clone(), value.clone());
        }

        for (key, value) in self.record.to_map()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl Serialize for ResolvedItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Resolves items through a [`RegistryClient`].
#[derive(Clone, Copy)]
pub struct ItemResolver<'c> {
    client: &'c dyn RegistryClient,
}

impl<'c> ItemResolver<'c> {
    #[must_use]
    pub fn new(client: &'c dyn RegistryClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &'c dyn RegistryClient {
        self.client
    }

    /// Fetch the raw envelope without decoding it.
    pub fn fetch_raw(&self, agency: &str, identifier: &str) -> Result<ItemEnvelope> {
        self.client.get_an_item(agency, identifier)
    }

    /// Fetch an item and decode it according to its type.
    pub fn resolve(&self, agency: &str, identifier: &str) -> Result<ResolvedItem> {
        let envelope = self.fetch_raw(agency, identifier)?;
        let label = self.client.item_type_label(&envelope.item_type)?;
        debug!(agency, identifier, item_type = %label, "resolving item");

        let record = dispatch(&envelope.item, &label)?;
        Ok(ResolvedItem {
            label,
            envelope,
            record,
        })
    }

    /// Resolve an item that must be a Question.
    pub fn resolve_question(&self, agency: &str, identifier: &str) -> Result<QuestionRecord> {
        let item = self.resolve(agency, identifier)?;
        match item.record {
            ExtractedRecord::Question(question) => Ok(question),
            _ => Err(unexpected(ItemType::Question, item.label)),
        }
    }

    /// Resolve an item that must be an Interviewer Instruction.
    pub fn resolve_instruction(
        &self,
        agency: &str,
        identifier: &str,
    ) -> Result<InterviewerInstructionRecord> {
        let item = self.resolve(agency, identifier)?;
        match item.record {
            ExtractedRecord::InterviewerInstruction(instruction) => Ok(instruction),
            _ => Err(unexpected(ItemType::InterviewerInstruction, item.label)),
        }
    }
}

fn unexpected(expected: ItemType, found: String) -> HarvesterError {
    HarvesterError::UnexpectedItemType {
        expected: expected.label().to_string(),
        found,
    }
}
