//! Namespace-normalized XML tree.

use roxmltree::{Document, Node, ParsingOptions};

use crate::error::Result;

/// A parsed XML document whose elements are addressed by bare tag names.
///
/// Registry payloads qualify every element with a DDI namespace
/// (`{ddi:reusable:3_2}URN`). Lookups through this tree, and through the
/// helpers in [`crate::xml`], only ever see the local part (`URN`).
/// Attribute names and values are left as they are.
pub struct NormalizedTree<'input> {
    doc: Document<'input>,
}

impl<'input> NormalizedTree<'input> {
    /// Parse XML text.
    ///
    /// # Errors
    /// `HarvesterError::MalformedXml` if the input is not well-formed.
    ///
    /// # Examples
    /// ```
    /// use ddi_harvester::xml::NormalizedTree;
    ///
    /// let xml = r#"<Fragment xmlns="ddi:instance:3_2"><URN>urn:ddi:a:b:1</URN></Fragment>"#;
    /// let tree = NormalizedTree::parse(xml).unwrap();
    /// assert_eq!(tree.root().tag_name().name(), "Fragment");
    /// ```
    pub fn parse(xml: &'input str) -> Result<Self> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;
        Ok(Self { doc })
    }

    /// The document's root element.
    pub fn root(&self) -> Node<'_, 'input> {
        self.doc.root_element()
    }

    /// Bare names of every element, in document order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.doc
            .descendants()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
    }
}
