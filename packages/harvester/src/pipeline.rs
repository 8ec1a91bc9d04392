//! Question assembly: one question plus its response categories as tables.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::config::{DEFAULT_FETCH_CONCURRENCY, MAX_FETCH_CONCURRENCY};
use crate::error::{HarvesterError, Result};
use crate::extract::{
    extract_category_detail, extract_code_list_detail, CategoryDetail, CategoryPointer,
    ResponseDomain,
};
use crate::resolver::ItemResolver;
use crate::table::Table;
use crate::xml::NormalizedTree;

/// Columns every question row starts with.
pub const QUESTION_COLUMNS: [&str; 8] = [
    "QuestionURN",
    "QuestionUserID",
    "QuestionLabel",
    "QuestionItemName",
    "QuestionLiteral",
    "response_type",
    "Instruction_URN",
    "Instruction",
];

pub const CODE_LIST_CATEGORY_COLUMNS: [&str; 10] = [
    "response_type",
    "Name",
    "ID",
    "Label",
    "code_list_URN",
    "code_list_sourceId",
    "code_list_label",
    "Order",
    "QuestionURN",
    "QuestionItemName",
];

pub const TEXT_CATEGORY_COLUMNS: [&str; 4] =
    ["QuestionURN", "QuestionItemName", "response_type", "Label"];

pub const NUMERIC_CATEGORY_COLUMNS: [&str; 7] = [
    "QuestionURN",
    "QuestionItemName",
    "response_type",
    "Label",
    "response_NumericType",
    "response_RangeLow",
    "response_RangeHigh",
];

/// Tuning for [`assemble_question`].
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Category fetches in flight at once; 1 fetches sequentially.
    pub fetch_concurrency: usize,
    pub cancel: CancellationToken,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            cancel: CancellationToken::new(),
        }
    }
}

impl PipelineOptions {
    /// Clamp to `1..=MAX_FETCH_CONCURRENCY`.
    #[must_use]
    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.clamp(1, MAX_FETCH_CONCURRENCY);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Build the question table (one row) and the category table for a question.
///
/// The category table's shape depends on the response domain: one row per
/// code for code lists, a single row for text and numeric answers, and an
/// empty table otherwise. Any failure aborts the whole assembly.
pub fn assemble_question(
    resolver: &ItemResolver<'_>,
    agency: &str,
    identifier: &str,
    options: &PipelineOptions,
) -> Result<(Table, Table)> {
    options.cancel.check()?;
    let question = resolver.resolve_question(agency, identifier)?;
    debug!(
        agency,
        identifier,
        response_type = question.response_type().unwrap_or("none"),
        "assembling question"
    );

    let (instruction_urn, instruction_text) = match &question.instruction {
        Some(reference) => {
            let instruction = resolver.resolve_instruction(&reference.agency, &reference.id)?;
            (Some(instruction.urn), Some(instruction.instruction_text))
        }
        None => (None, None),
    };

    let mut columns: Vec<&str> = QUESTION_COLUMNS.to_vec();
    let mut row = vec![
        Some(question.urn.clone()),
        Some(question.user_id.clone()),
        question.label.clone(),
        Some(question.item_name.clone()),
        question.literal.clone(),
        question.response_type().map(str::to_string),
        instruction_urn,
        instruction_text,
    ];

    let categories = match &question.response {
        Some(ResponseDomain::CodeList {
            agency: list_agency,
            id,
            urn,
            ..
        }) => {
            let envelope = resolver.fetch_raw(list_agency, id)?;
            let tree = NormalizedTree::parse(&envelope.item)?;
            let code_list = extract_code_list_detail(tree.root())?;

            let details = fetch_categories(resolver, &code_list.categories, list_agency, options)?;
            let rows = details
                .into_iter()
                .enumerate()
                .map(|(i, category)| {
                    vec![
                        Some("CodeList".to_string()),
                        Some(category.name),
                        Some(category.user_id),
                        Some(category.label),
                        Some(urn.clone()),
                        Some(code_list.source_id.clone()),
                        Some(code_list.label.clone()),
                        Some((i + 1).to_string()),
                        Some(question.urn.clone()),
                        Some(question.item_name.clone()),
                    ]
                })
                .collect();

            columns.extend(["response", "response_domain"]);
            row.extend([Some(code_list.label), Some(urn.clone())]);
            Table::new(CODE_LIST_CATEGORY_COLUMNS, rows)
        }
        Some(ResponseDomain::Text { label }) => {
            columns.push("response");
            row.push(label.clone());
            Table::new(
                TEXT_CATEGORY_COLUMNS,
                vec![vec![
                    Some(question.urn.clone()),
                    Some(question.item_name.clone()),
                    Some("Text".to_string()),
                    label.clone(),
                ]],
            )
        }
        Some(ResponseDomain::Numeric {
            label,
            numeric_type,
            range_low,
            range_high,
        }) => {
            columns.push("response");
            row.push(label.clone());
            Table::new(
                NUMERIC_CATEGORY_COLUMNS,
                vec![vec![
                    Some(question.urn.clone()),
                    Some(question.item_name.clone()),
                    Some("Numeric".to_string()),
                    label.clone(),
                    Some(numeric_type.clone()),
                    range_low.clone(),
                    range_high.clone(),
                ]],
            )
        }
        Some(ResponseDomain::DateTime { .. }) => Table::empty(Vec::<String>::new()),
        None => {
            warn!(
                agency,
                identifier,
                question = %question.urn,
                "question has no recognised response domain"
            );
            Table::empty(Vec::<String>::new())
        }
    };

    Ok((Table::new(columns, vec![row]), categories))
}

/// Fetch every category of a code list, preserving list order.
///
/// Categories without an agency of their own are looked up under the code
/// list's agency.
fn fetch_categories(
    resolver: &ItemResolver<'_>,
    pointers: &[CategoryPointer],
    default_agency: &str,
    options: &PipelineOptions,
) -> Result<Vec<CategoryDetail>> {
    let fetch = |pointer: &CategoryPointer| -> Result<CategoryDetail> {
        options.cancel.check()?;
        let agency = pointer.agency.as_deref().unwrap_or(default_agency);
        let envelope = resolver.fetch_raw(agency, &pointer.id)?;
        let tree = NormalizedTree::parse(&envelope.item)?;
        extract_category_detail(tree.root())
    };

    if options.fetch_concurrency <= 1 || pointers.len() <= 1 {
        return pointers.iter().map(fetch).collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.fetch_concurrency)
        .build()
        .map_err(|e| HarvesterError::Config(format!("cannot start fetch pool: {e}")))?;
    debug!(
        categories = pointers.len(),
        threads = options.fetch_concurrency,
        "fetching categories in parallel"
    );
    pool.install(|| pointers.par_iter().map(fetch).collect())
}

