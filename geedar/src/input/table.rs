//! Raw input table.

use std::fmt;

use super::InputError;

/// How input rows describe dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunningMode {
    /// One row per site and date (`date` column).
    #[default]
    SpecificDates,
    /// One row per site and date range (`start_date`, `end_date` columns).
    DateRanges,
}

impl RunningMode {
    /// Picks date-range mode when both range columns are present.
    pub fn detect(table: &InputTable) -> Self {
        if table.column_index("start_date").is_some() && table.column_index("end_date").is_some() {
            RunningMode::DateRanges
        } else {
            RunningMode::SpecificDates
        }
    }
}

impl fmt::Display for RunningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunningMode::SpecificDates => write!(f, "specific dates"),
            RunningMode::DateRanges => write!(f, "date ranges"),
        }
    }
}

/// A table of raw text cells as read from the user's file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InputTable {
    /// Builds a table, checking every row has one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, InputError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(InputError::RaggedRow {
                    row: i + 1,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Convenience constructor for literal tables.
    pub fn from_strs(columns: &[&str], rows: &[&[&str]]) -> Result<Self, InputError> {
        Self::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first column whose name matches, ignoring case and
    /// surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }
}
