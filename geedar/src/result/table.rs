//! Output table.

use std::fmt;

use crate::compute::Value;

/// One output cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Text cell, or missing when blank.
    pub fn text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Missing
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<&Value> for Cell {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => Cell::Number(*n),
            Value::Text(s) => Cell::Text(s.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Consolidated results: named columns over rows of cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Rows as display strings, for writers.
    pub fn string_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(Cell::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_missing() {
        assert_eq!(Cell::text("  "), Cell::Missing);
        assert_eq!(Cell::text("a"), Cell::Text("a".into()));
    }

    #[test]
    fn test_display_and_lookup() {
        let table = ResultTable::new(
            vec!["id".into(), "B4_median".into()],
            vec![
                vec![Cell::text("lake"), Cell::Number(0.25)],
                vec![Cell::text("river"), Cell::Missing],
            ],
        );
        assert_eq!(table.cell(0, "B4_median"), Some(&Cell::Number(0.25)));
        assert_eq!(table.cell(1, "nope"), None);
        let rows: Vec<Vec<String>> = table.string_rows().collect();
        assert_eq!(rows[1], vec!["river".to_string(), String::new()]);
    }
}
