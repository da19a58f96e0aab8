//! Result consolidation.
//!
//! Fragments arrive per (site, plan) and are joined onto the expanded input
//! rows by site and query date. The column layout depends on the run:
//!
//! | Run                | Data column names                                  |
//! |--------------------|----------------------------------------------------|
//! | one plan           | engine names as-is (`B4_median`)                   |
//! | several plans      | `<code>_<name>` (`20109001_B4_median`)             |
//! | append mode        | canonical names (`red_median`), one row block per plan, led by `ProcCode` and `Source` |
//!
//! Building is pure: the same absorbed fragments and template always give
//! the same table.

mod consolidator;
mod table;

pub use consolidator::{Layout, ResultConsolidator, PROC_CODE_COLUMN, SOURCE_COLUMN};
pub use table::{Cell, ResultTable};
