//! Organization extraction.

use roxmltree::Node;
use serde::Serialize;

use crate::error::Result;
use crate::extract::extractor::{attribute_key_name, Extractor, FieldReader};
use crate::extract::record::{ExtractedRecord, UserAttributes};
use crate::types::ItemType;

/// Decoded Organization item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationRecord {
    #[serde(rename = "URN")]
    pub urn: String,
    /// User attributes with their raw values (nicknames and the like).
    pub cust: UserAttributes,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "Description")]
    pub description: String,
}

pub struct OrganizationExtractor;

impl Extractor for OrganizationExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::Organization
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        let r = FieldReader::new(root, ItemType::Organization.label());

        let mut cust = UserAttributes::new();
        for pair in r.find_all(".//UserAttributePair") {
            let pair = r.within(pair);
            let key = pair.text(".//AttributeKey")?;
            cust.insert(attribute_key_name(&key), pair.text(".//AttributeValue")?);
        }

        Ok(ExtractedRecord::Organization(OrganizationRecord {
            urn: r.text(".//URN")?,
            cust,
            name: r.text(".//OrganizationIdentification/OrganizationName/String")?,
            image: r.text(".//OrganizationIdentification/OrganizationImage/ImageLocation")?,
            description: r.text(".//Description/Content")?,
        }))
    }
}
