//! Input tables and site/date expansion.
//!
//! Users describe what they want either as explicit dates (one row per
//! site and date) or as date ranges (one row per site with `start_date` and
//! `end_date`). [`SiteDateExpander`] turns either form into:
//!
//! - a [`Template`]: the output row skeleton, one row per requested
//!   (site, query date), to which retrieved values are joined later
//! - a list of [`Site`]s, each with its region and the unique ascending set
//!   of dates to query
//!
//! Column names are matched case-insensitively.

mod expander;
mod table;

pub use expander::{
    parse_date, Expansion, Site, SiteDateExpander, Template, TemplateRow, IMG_DATE_COLUMN,
};
pub use table::{InputTable, RunningMode};

use thiserror::Error;

/// Fatal input problems, raised before any remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The table has a header but no data rows
    #[error("the input table must have a header row and at least one data row")]
    NoRows,

    /// Columns required by the running mode are absent
    #[error("the input table is missing required columns: {0}")]
    MissingColumns(String),

    /// Every row was rejected
    #[error("the input table has no valid rows (rows with a valid date and site)")]
    NoValidRows,

    /// A data row has a different number of cells than the header
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
}
