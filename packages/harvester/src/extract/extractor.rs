//! Extractor trait and the field reader shared by all extractors.

use roxmltree::Node;

use super::record::ExtractedRecord;
use crate::error::{HarvesterError, Result};
use crate::types::{ItemType, PositionedReference, Reference};
use crate::xml::{get_attribute, get_text, select, select_all, text_content};

/// Trait for per-item-type extractors.
///
/// An extractor turns the root element of one registry payload into the
/// record for its item type. Extractors are pure: they never fetch, log
/// or retry.
pub trait Extractor: Send + Sync {
    /// The item type this extractor decodes.
    fn item_type(&self) -> ItemType;

    /// Decode the payload rooted at `root`.
    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord>;
}

/// Path-based field access with the guard rules every extractor follows.
///
/// Required fields fail with `FieldNotFound` naming the item type and path;
/// optional fields come back as `None`.
#[derive(Debug, Clone, Copy)]
pub struct FieldReader<'a, 'input> {
    node: Node<'a, 'input>,
    context: &'static str,
}

impl<'a, 'input> FieldReader<'a, 'input> {
    /// Create a reader over `node`. `context` names the item type in errors.
    #[must_use]
    pub fn new(node: Node<'a, 'input>, context: &'static str) -> Self {
        Self { node, context }
    }

    /// The element this reader is scoped to.
    #[must_use]
    pub fn node(&self) -> Node<'a, 'input> {
        self.node
    }

    /// A reader scoped to a sub-element, reporting errors under the same item type.
    #[must_use]
    pub fn within(&self, node: Node<'a, 'input>) -> Self {
        Self {
            node,
            context: self.context,
        }
    }

    fn missing(&self, path: &str) -> HarvesterError {
        HarvesterError::field_not_found(self.context, path)
    }

    /// First element at `path`, if any.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<Node<'a, 'input>> {
        select(self.node, path)
    }

    /// All elements at `path`, in document order.
    #[must_use]
    pub fn find_all(&self, path: &str) -> Vec<Node<'a, 'input>> {
        select_all(self.node, path)
    }

    /// First element at `path`; absence is fatal.
    pub fn element(&self, path: &str) -> Result<Node<'a, 'input>> {
        self.find(path).ok_or_else(|| self.missing(path))
    }

    /// Text of a required element. An element without text reads as `""`.
    pub fn text(&self, path: &str) -> Result<String> {
        self.element(path).map(get_text)
    }

    /// Text of an optional element; absent or empty yields `None`.
    #[must_use]
    pub fn optional_text(&self, path: &str) -> Option<String> {
        self.find(path).and_then(text_content)
    }

    /// Attribute `name` on the required element at `path`.
    pub fn attribute(&self, path: &str, name: &str) -> Result<String> {
        let element = self.element(path)?;
        get_attribute(element, name)
            .map(str::to_string)
            .ok_or_else(|| self.missing(&format!("{path}/@{name}")))
    }

    /// Reference at `path`; the reference element itself must exist.
    ///
    /// Returns `Ok(None)` when the element exists but is incomplete.
    pub fn required_reference(&self, path: &str) -> Result<Option<Reference>> {
        self.element(path).map(read_reference)
    }

    /// Reference at `path`, `None` when absent or incomplete.
    #[must_use]
    pub fn optional_reference(&self, path: &str) -> Option<Reference> {
        self.find(path).and_then(read_reference)
    }

    /// Every reference at `path` with its 1-based document position.
    #[must_use]
    pub fn references(&self, path: &str) -> Vec<PositionedReference> {
        self.find_all(path)
            .into_iter()
            .enumerate()
            .map(|(i, node)| PositionedReference {
                position: i + 1,
                reference: read_reference(node),
            })
            .collect()
    }

    /// Decode JSON stored as element text.
    pub fn decode_json<T>(&self, raw: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_str(raw).map_err(|source| HarvesterError::MalformedAttribute {
            context: self.context.to_string(),
            source,
        })
    }
}

/// Read a reference element's four fields.
///
/// All-or-nothing: if any of `Agency`, `ID`, `Version` or `TypeOfObject`
/// is missing the whole reference is `None`.
#[must_use]
pub fn read_reference(node: Node<'_, '_>) -> Option<Reference> {
    let field = |tag: &str| select(node, &format!(".//{tag}")).map(get_text);

    Some(Reference {
        agency: field("Agency")?,
        id: field("ID")?,
        version: field("Version")?,
        type_of_object: field("TypeOfObject")?,
    })
}

/// Last `:`-separated segment of a user attribute key.
///
/// # Examples
/// ```
/// use ddi_harvester::extract::attribute_key_name;
///
/// assert_eq!(attribute_key_name("extension:CustomField:instrumentId"), "instrumentId");
/// assert_eq!(attribute_key_name("plain"), "plain");
/// ```
#[must_use]
pub fn attribute_key_name(key: &str) -> &str {
    key.rsplit(':').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use roxmltree::Document;

    const XML: &str = r#"<Study>
        <URN>urn:ddi:uk.cls.ncds:1:1</URN>
        <Empty/>
        <UniverseReference>
            <Agency>uk.cls.ncds</Agency><ID>u1</ID><Version>2</Version><TypeOfObject>Universe</TypeOfObject>
        </UniverseReference>
        <PhysicalInstanceReference>
            <Agency>uk.cls.ncds</Agency><ID>p1</ID><Version>1</Version>
        </PhysicalInstanceReference>
        <ResponseCardinality minimumResponses="1"/>
    </Study>"#;

    #[test]
    fn test_required_and_optional_text() {
        let doc = Document::parse(XML).unwrap();
        let reader = FieldReader::new(doc.root_element(), "Study");

        assert_eq!(reader.text(".//URN").unwrap(), "urn:ddi:uk.cls.ncds:1:1");
        assert_eq!(reader.text(".//Empty").unwrap(), "");
        assert_eq!(reader.optional_text(".//Empty"), None);
        assert_eq!(reader.optional_text(".//Missing"), None);

        let err = reader.text(".//Missing").unwrap_err();
        assert!(matches!(
            err,
            HarvesterError::FieldNotFound { ref item_type, ref path }
                if item_type == "Study" && path == ".//Missing"
        ));
    }

    #[test]
    fn test_reference_all_or_nothing() {
        let doc = Document::parse(XML).unwrap();
        let reader = FieldReader::new(doc.root_element(), "Study");

        let universe = reader.optional_reference(".//UniverseReference").unwrap();
        assert_eq!(universe, Reference::new("uk.cls.ncds", "u1", "2", "Universe"));

        // TypeOfObject missing: nothing is kept
        assert_eq!(reader.optional_reference(".//PhysicalInstanceReference"), None);
        assert_eq!(
            reader.required_reference(".//PhysicalInstanceReference").unwrap(),
            None
        );
        assert!(reader.required_reference(".//DataCollectionReference").is_err());
    }

    #[test]
    fn test_attribute() {
        let doc = Document::parse(XML).unwrap();
        let reader = FieldReader::new(doc.root_element(), "Question");

        assert_eq!(
            reader.attribute(".//ResponseCardinality", "minimumResponses").unwrap(),
            "1"
        );
        let err = reader
            .attribute(".//ResponseCardinality", "maximumResponses")
            .unwrap_err();
        assert!(err.to_string().contains("@maximumResponses"));
    }

    #[test]
    fn test_decode_json_failure_is_malformed() {
        let doc = Document::parse(XML).unwrap();
        let reader = FieldReader::new(doc.root_element(), "Question");

        let err = reader
            .decode_json::<serde_json::Value>("{'en-GB': 'single quotes'}")
            .unwrap_err();
        assert!(err.is_malformed_xml());
    }

    const REFERENCE_FIELDS: [&str; 4] = ["Agency", "ID", "Version", "TypeOfObject"];

    proptest! {
        #[test]
        fn reference_is_all_or_nothing(
            present in prop::array::uniform4(any::<bool>()),
            values in prop::array::uniform4("[a-z0-9.]{1,12}"),
        ) {
            let fields: String = REFERENCE_FIELDS
                .iter()
                .zip(&present)
                .zip(&values)
                .filter(|((_, keep), _)| **keep)
                .map(|((tag, _), value)| format!("<{tag}>{value}</{tag}>"))
                .collect();
            let xml = format!("<Ref>{fields}</Ref>");
            let doc = Document::parse(&xml).unwrap();

            let reference = read_reference(doc.root_element());

            if present.iter().all(|keep| *keep) {
                let [agency, id, version, type_of_object] = values;
                prop_assert_eq!(
                    reference,
                    Some(Reference::new(agency, id, version, type_of_object))
                );
            } else {
                prop_assert_eq!(reference, None);
            }
        }
    }
}
