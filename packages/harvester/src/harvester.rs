//! Main harvester service that ties all components together.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::client::RegistryClient;
use crate::config::{validate_agency, validate_identifier};
use crate::error::Result;
use crate::pipeline::{assemble_question, PipelineOptions};
use crate::resolver::{ItemResolver, ResolvedItem};
use crate::table::Table;

/// Columns of an item set table.
pub const SET_COLUMNS: [&str; 2] = ["ItemType", "Identifier"];

/// Validate an agency/identifier pair before any request is made.
fn validate_item(agency: &str, identifier: &str) -> Result<()> {
    validate_agency(agency)?;
    validate_identifier(identifier)
}

/// Fetch and decode one item.
pub fn fetch_item(
    client: &dyn RegistryClient,
    agency: &str,
    identifier: &str,
) -> Result<ResolvedItem> {
    validate_item(agency, identifier)?;
    ItemResolver::new(client).resolve(agency, identifier)
}

/// List the members of an item version as `ItemType`/`Identifier` rows.
///
/// Type codes are decoded to labels; an unknown code fails the whole table.
pub fn item_set_table(
    client: &dyn RegistryClient,
    agency: &str,
    identifier: &str,
    version: &str,
) -> Result<Table> {
    validate_item(agency, identifier)?;

    let members = client.get_a_set_typed(agency, identifier, version)?;
    debug!(agency, identifier, version, members = members.len(), "fetched set");

    let rows = members
        .iter()
        .map(|member| {
            Ok(vec![
                Some(client.item_type_label(&member.type_code)?),
                Some(member.identifier().to_string()),
            ])
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Table::new(SET_COLUMNS, rows))
}

/// Resolve an item, then list its set at the resolved version.
pub fn item_info_set(
    client: &dyn RegistryClient,
    agency: &str,
    identifier: &str,
) -> Result<(Table, ResolvedItem)> {
    let item = fetch_item(client, agency, identifier)?;
    let table = item_set_table(client, agency, identifier, &item.envelope.version)?;
    Ok((table, item))
}

/// Assemble the question and category tables for one question.
pub fn harvest_question(
    client: &dyn RegistryClient,
    agency: &str,
    identifier: &str,
    options: &PipelineOptions,
) -> Result<(Table, Table)> {
    validate_item(agency, identifier)?;
    assemble_question(&ItemResolver::new(client), agency, identifier, options)
}

/// Write `<stem>_question.csv` and `<stem>_categories.csv` into `dir`.
///
/// Path separators in `stem` are replaced so both files stay inside `dir`.
/// Returns the two paths in that order.
pub fn save_question_tables(
    question: &Table,
    categories: &Table,
    dir: &Path,
    stem: &str,
) -> Result<(PathBuf, PathBuf)> {
    let stem = file_stem(stem);
    let question_path = dir.join(format!("{stem}_question.csv"));
    let categories_path = dir.join(format!("{stem}_categories.csv"));

    question.save_csv(&question_path)?;
    categories.save_csv(&categories_path)?;
    Ok((question_path, categories_path))
}

/// Make a registry-supplied name safe to use as a file name prefix.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HarvesterError;

    #[test]
    fn test_save_question_tables() {
        let dir = tempfile::tempdir().unwrap();
        let question = Table::new(["QuestionURN"], vec![vec![Some("urn:ddi:a:b:1".into())]]);
        let categories = Table::empty(Vec::<String>::new());

        let (q, c) = save_question_tables(&question, &categories, dir.path(), "W1OwnLive").unwrap();

        assert!(q.ends_with("W1OwnLive_question.csv"));
        assert!(c.ends_with("W1OwnLive_categories.csv"));
        assert_eq!(std::fs::read_to_string(q).unwrap(), "QuestionURN\nurn:ddi:a:b:1\n");
    }

    #[test]
    fn test_stem_cannot_leave_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let question = Table::new(["QuestionURN"], vec![vec![Some("urn:ddi:a:b:1".into())]]);
        let categories = Table::empty(Vec::<String>::new());

        let (q, c) =
            save_question_tables(&question, &categories, dir.path(), "../W1/..\\x").unwrap();

        assert_eq!(q.parent(), Some(dir.path()));
        assert_eq!(c.parent(), Some(dir.path()));
        assert_eq!(q.file_name().unwrap(), ".._W1_.._x_question.csv");
        assert!(q.exists());
    }

    #[test]
    fn test_validate_item() {
        assert!(
            validate_item("uk.cls.nextsteps", "a6f96245-5c00-4ad3-89e9-79afaefa0c28").is_ok()
        );
        assert!(matches!(
            validate_item("uk cls", "a6f96245-5c00-4ad3-89e9-79afaefa0c28"),
            Err(HarvesterError::InvalidAgency(_))
        ));
        assert!(matches!(
            validate_item("uk.cls", "q1"),
            Err(HarvesterError::InvalidIdentifier(_))
        ));
    }
}
