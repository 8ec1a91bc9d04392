//! Extractor registry mapping item types to extractors.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use tracing::debug;

use super::extractor::Extractor;
use super::extractors::{
    CodeSetExtractor, ConceptExtractor, DataCollectionExtractor, InstrumentExtractor,
    InterviewerInstructionExtractor, OrganizationExtractor, QuestionExtractor,
    QuestionGroupExtractor, SequenceExtractor, SeriesExtractor, StatementExtractor,
    StudyExtractor,
};
use super::record::ExtractedRecord;
use crate::error::Result;
use crate::types::ItemType;
use crate::xml::NormalizedTree;

/// Registry mapping item types to their extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<ItemType, Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Register an extractor under the item type it reports.
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register(&mut self, extractor: impl Extractor + 'static) {
        self.extractors
            .insert(extractor.item_type(), Box::new(extractor));
    }

    /// Extractor for an item type, if one is registered.
    #[must_use]
    pub fn get(&self, item_type: ItemType) -> Option<&dyn Extractor> {
        self.extractors.get(&item_type).map(|e| e.as_ref())
    }

    #[must_use]
    pub fn has_extractor(&self, item_type: ItemType) -> bool {
        self.extractors.contains_key(&item_type)
    }

    /// Return set of all registered item types.
    #[must_use]
    pub fn registered_types(&self) -> HashSet<ItemType> {
        self.extractors.keys().copied().collect()
    }

    /// Decode `xml` as the item type named by `label`.
    ///
    /// The payload is parsed before the label is looked up, so malformed XML
    /// is reported even for labels without an extractor. Unknown labels give
    /// [`ExtractedRecord::Empty`].
    pub fn dispatch(&self, xml: &str, label: &str) -> Result<ExtractedRecord> {
        let tree = NormalizedTree::parse(xml)?;

        let Some(extractor) = ItemType::from_label(label).and_then(|t| self.get(t)) else {
            debug!(item_type = label, "no extractor registered");
            return Ok(ExtractedRecord::Empty {});
        };

        debug!(item_type = label, "extracting item");
        extractor.extract(tree.root())
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with an extractor for every [`ItemType`].
#[must_use]
pub fn create_default_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();

    // Study hierarchy
    registry.register(SeriesExtractor);
    registry.register(StudyExtractor);
    registry.register(DataCollectionExtractor);
    registry.register(OrganizationExtractor);

    // Control constructs
    registry.register(InstrumentExtractor);
    registry.register(SequenceExtractor);
    registry.register(StatementExtractor);

    // Questions and their parts
    registry.register(QuestionGroupExtractor);
    registry.register(QuestionExtractor);
    registry.register(InterviewerInstructionExtractor);
    registry.register(ConceptExtractor);
    registry.register(CodeSetExtractor);

    registry
}

static DEFAULT_REGISTRY: LazyLock<ExtractorRegistry> = LazyLock::new(create_default_registry);

/// Decode `xml` as `label` with the default registry.
///
/// # Examples
/// ```
/// use ddi_harvester::extract::dispatch;
///
/// let record = dispatch("<Fragment><URN>urn:ddi:a:b:1</URN></Fragment>", "Variable").unwrap();
/// assert!(record.is_empty());
///
/// let record = dispatch("<Fragment><URN>urn:ddi:a:b:1</URN></Fragment>", "Code Set").unwrap();
/// assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"URN":"urn:ddi:a:b:1"}"#);
/// ```
pub fn dispatch(xml: &str, label: &str) -> Result<ExtractedRecord> {
    DEFAULT_REGISTRY.dispatch(xml, label)
}
