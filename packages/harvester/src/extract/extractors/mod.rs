//! One extractor per item type.

mod code_set;
mod concept;
mod control_construct;
mod data_collection;
mod organization;
mod question;
mod question_group;
mod series;
mod study;

pub use code_set::{
    extract_category_detail, extract_code_list_detail, CategoryDetail, CategoryPointer,
    CodeListDetail, CodeSetExtractor, CodeSetRecord,
};
pub use concept::{
    extract_interviewer_instruction, ConceptExtractor, ConceptRecord,
    InterviewerInstructionExtractor, InterviewerInstructionRecord,
};
pub use control_construct::{
    InstrumentExtractor, InstrumentRecord, SequenceExtractor, SequenceRecord, StatementExtractor,
    StatementRecord,
};
pub use data_collection::{
    extract_data_collection, strip_list_syntax, CollectionDate, CollectionEvent,
    DataCollectionExtractor, DataCollectionRecord, ModeOfCollection,
};
pub use organization::{OrganizationExtractor, OrganizationRecord};
pub use question::{
    extract_question, QuestionExtractor, QuestionRecord, ResponseCardinality, ResponseDomain,
};
pub use question_group::{QuestionGroupExtractor, QuestionGroupRecord};
pub use series::{extract_series, SeriesDescription, SeriesExtractor, SeriesFunding, SeriesRecord};
pub use study::{
    extract_study, StudyData, StudyExtractor, StudyFunding, StudyRecord, SweepDescription,
};
