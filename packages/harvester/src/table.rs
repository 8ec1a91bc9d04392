//! Ordered-column tables with CSV output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// A table of optional string cells with a fixed column order.
///
/// Built once from complete rows; `None` cells are written as empty fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    /// Create a table. Rows shorter than the header are padded with `None`,
    /// longer rows are truncated.
    pub fn new<C, S>(columns: C, rows: Vec<Vec<Option<String>>>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(columns.len(), None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// A table with a header and no rows.
    pub fn empty<C, S>(columns: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns, Vec::new())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in column `name`; `None` for missing rows, columns or values.
    #[must_use]
    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)?.as_deref()
    }

    /// All values of column `name`, in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Vec<Option<&str>> {
        match self.column_index(name) {
            Some(col) => self.rows.iter().map(|r| r[col].as_deref()).collect(),
            None => Vec::new(),
        }
    }

    /// Write the table as CSV with a header row.
    ///
    /// A table without columns writes nothing.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.columns)?;
        for row in &self.rows {
            csv.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the table to a CSV file, replacing any existing file.
    pub fn save_csv(&self, path: &Path) -> Result<()> {
        self.write_csv(File::create(path)?)
    }
}
