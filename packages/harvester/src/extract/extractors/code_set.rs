//! Code Set extraction, plus the code list and category readers used when
//! assembling question responses.

use roxmltree::Node;
use serde::Serialize;

use crate::error::Result;
use crate::extract::extractor::{Extractor, FieldReader};
use crate::extract::record::ExtractedRecord;
use crate::types::ItemType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeSetRecord {
    #[serde(rename = "URN")]
    pub urn: String,
}

pub struct CodeSetExtractor;

impl Extractor for CodeSetExtractor {
    fn item_type(&self) -> ItemType {
        ItemType::CodeSet
    }

    fn extract(&self, root: Node<'_, '_>) -> Result<ExtractedRecord> {
        let r = FieldReader::new(root, ItemType::CodeSet.label());
        Ok(ExtractedRecord::CodeSet(CodeSetRecord {
            urn: r.text(".//URN")?,
        }))
    }
}

/// Code list header and its categories in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListDetail {
    pub source_id: String,
    pub label: String,
    pub categories: Vec<CategoryPointer>,
}

/// The `CategoryReference` of one code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPointer {
    /// `None` when the reference omits its agency.
    pub agency: Option<String>,
    pub id: String,
}

/// One answer category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDetail {
    pub name: String,
    pub user_id: String,
    pub label: String,
}

/// Read a code list payload.
pub fn extract_code_list_detail(root: Node<'_, '_>) -> Result<CodeListDetail> {
    let r = FieldReader::new(root, ItemType::CodeSet.label());

    let categories = r
        .find_all(".//Code/CategoryReference")
        .into_iter()
        .map(|node| {
            let c = r.within(node);
            Ok(CategoryPointer {
                agency: c.optional_text(".//Agency"),
                id: c.text(".//ID")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CodeListDetail {
        source_id: r.text(".//UserID")?,
        label: r.text(".//Label/Content")?,
        categories,
    })
}

/// Read a category payload.
pub fn extract_category_detail(root: Node<'_, '_>) -> Result<CategoryDetail> {
    let r = FieldReader::new(root, "Category");
    Ok(CategoryDetail {
        name: r.text(".//CategoryName/String")?,
        user_id: r.text(".//UserID")?,
        label: r.text(".//Label/Content")?,
    })
}
