//! Type-keyed field extraction.
//!
//! Each registry item type has an [`Extractor`] that turns a normalized
//! payload into a typed record. [`dispatch`] selects the extractor from the
//! item type label and returns an [`ExtractedRecord`].

mod extractor;
pub mod extractors;
mod record;
mod registry;

pub use extractor::{attribute_key_name, read_reference, Extractor, FieldReader};
pub use extractors::{
    extract_category_detail, extract_code_list_detail, extract_question, strip_list_syntax,
    CategoryDetail, CategoryPointer, CodeListDetail, QuestionRecord, ResponseDomain,
};
pub use record::{ExtractedRecord, UserAttributes};
pub use registry::{create_default_registry, dispatch, ExtractorRegistry};
