//! Fragment consolidation.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::{Cell, ResultTable};
use crate::code::ProcessingPlan;
use crate::compute::Fragment;
use crate::input::{RunningMode, Template, TemplateRow};
use crate::registry::{self, CANONICAL_BANDS};

/// Column holding the processing code in append mode.
pub const PROC_CODE_COLUMN: &str = "ProcCode";

/// Column holding the product's sensor in append mode.
pub const SOURCE_COLUMN: &str = "Source";

/// How data columns are named and laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One plan: engine names as-is.
    Single,
    /// Several plans side by side: `<code>_<name>`.
    PerCode,
    /// Plans stacked vertically under canonical band names.
    Append,
}

impl Layout {
    pub fn for_run(plan_count: usize, append: bool) -> Self {
        if append {
            Layout::Append
        } else if plan_count > 1 {
            Layout::PerCode
        } else {
            Layout::Single
        }
    }
}

/// Accumulates fragments and builds the final table.
#[derive(Debug, Clone)]
pub struct ResultConsolidator {
    plans: Vec<ProcessingPlan>,
    layout: Layout,
    fragments: HashMap<(String, u64), Fragment>,
}

impl ResultConsolidator {
    pub fn new(plans: Vec<ProcessingPlan>, append: bool) -> Self {
        let layout = Layout::for_run(plans.len(), append);
        Self {
            plans,
            layout,
            fragments: HashMap::new(),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Adds a fragment for a site and plan; values already held win.
    pub fn absorb(&mut self, site: &str, plan: &ProcessingPlan, fragment: Fragment) {
        if fragment.is_empty() {
            return;
        }
        self.fragments
            .entry((site.to_string(), plan.code()))
            .or_default()
            .merge(fragment);
    }

    /// Whether any value was absorbed.
    pub fn has_data(&self) -> bool {
        self.fragments.values().any(|f| !f.is_empty())
    }

    /// Builds the table for `template`.
    pub fn build(&self, template: &Template) -> ResultTable {
        let table = match self.layout {
            Layout::Single | Layout::PerCode => self.build_side_by_side(template),
            Layout::Append => self.build_stacked(template),
        };
        debug!(
            rows = table.len(),
            columns = table.columns().len(),
            layout = ?self.layout,
            "Results consolidated"
        );
        table
    }

    fn fragment_for(&self, row: &TemplateRow, plan: &ProcessingPlan) -> Option<&Fragment> {
        let site = row.site.as_ref()?;
        self.fragments.get(&(site.clone(), plan.code()))
    }

    /// Engine names present for a plan across all sites, ascending.
    fn names_for(&self, plan: &ProcessingPlan) -> Vec<String> {
        let names: BTreeSet<String> = self
            .fragments
            .iter()
            .filter(|((_, code), _)| *code == plan.code())
            .flat_map(|(_, fragment)| fragment.names())
            .collect();
        names.into_iter().collect()
    }

    fn build_side_by_side(&self, template: &Template) -> ResultTable {
        let prefixed = self.layout == Layout::PerCode;
        let mut columns = template.columns.clone();
        let mut blocks: Vec<(&ProcessingPlan, Vec<String>)> = Vec::new();
        for plan in &self.plans {
            let names = self.names_for(plan);
            columns.extend(names.iter().map(|name| {
                if prefixed {
                    format!("{}_{}", plan.code(), name)
                } else {
                    name.clone()
                }
            }));
            blocks.push((plan, names));
        }

        let mut rows = Vec::with_capacity(template.rows.len());
        for row in &template.rows {
            let mut cells: Vec<Cell> = row.cells.iter().map(|c| Cell::text(c)).collect();
            let mut data = Vec::new();
            for (plan, names) in &blocks {
                let fragment = self.fragment_for(row, plan);
                for name in names {
                    data.push(lookup(fragment, row, name));
                }
            }
            if keep_row(template.mode, &data) {
                cells.extend(data);
                rows.push(cells);
            }
        }
        ResultTable::new(columns, rows)
    }

    fn build_stacked(&self, template: &Template) -> ResultTable {
        // Canonical column → engine name, per plan.
        let mappings: Vec<Vec<(String, String)>> = self
            .plans
            .iter()
            .map(|plan| {
                self.names_for(plan)
                    .into_iter()
                    .flat_map(|name| {
                        canonical_names(plan, &name)
                            .into_iter()
                            .map(move |column| (column, name.clone()))
                    })
                    .collect()
            })
            .collect();

        let all: BTreeSet<&str> = mappings
            .iter()
            .flatten()
            .map(|(column, _)| column.as_str())
            .collect();
        let data_columns = order_append_columns(&all);

        let mut columns = template.columns.clone();
        columns.push(PROC_CODE_COLUMN.to_string());
        columns.push(SOURCE_COLUMN.to_string());
        columns.extend(data_columns.iter().cloned());

        let mut rows = Vec::new();
        for (plan, mapping) in self.plans.iter().zip(&mappings) {
            let by_column: HashMap<&str, &str> = mapping
                .iter()
                .map(|(column, name)| (column.as_str(), name.as_str()))
                .collect();
            for row in &template.rows {
                let fragment = self.fragment_for(row, plan);
                let data: Vec<Cell> = data_columns
                    .iter()
                    .map(|column| match by_column.get(column.as_str()) {
                        Some(name) => lookup(fragment, row, name),
                        None => Cell::Missing,
                    })
                    .collect();
                if !keep_row(template.mode, &data) {
                    continue;
                }
                let mut cells: Vec<Cell> = row.cells.iter().map(|c| Cell::text(c)).collect();
                cells.push(Cell::Text(plan.code().to_string()));
                cells.push(Cell::Text(plan.product().sensor.to_string()));
                cells.extend(data);
                rows.push(cells);
            }
        }
        ResultTable::new(columns, rows)
    }
}

fn lookup(fragment: Option<&Fragment>, row: &TemplateRow, name: &str) -> Cell {
    match (fragment, row.query_date) {
        (Some(fragment), Some(date)) => fragment.get(date, name).map(Cell::from).unwrap_or_default(),
        _ => Cell::Missing,
    }
}

/// Date-range rows with no data at all are artifacts of the expansion.
fn keep_row(mode: RunningMode, data: &[Cell]) -> bool {
    mode == RunningMode::SpecificDates || data.iter().any(|c| !c.is_missing())
}

/// Output names of an engine name in append mode.
///
/// `<band>_<suffix>` becomes `<canonical>_<suffix>` for every canonical name
/// mapped to `band`; anything else keeps its name.
fn canonical_names(plan: &ProcessingPlan, name: &str) -> Vec<String> {
    let mut out: Vec<String> = plan
        .product()
        .common_bands
        .iter()
        .filter_map(|(canonical, band)| {
            name.strip_prefix(band)
                .filter(|rest| rest.starts_with('_'))
                .map(|rest| format!("{}{}", canonical, rest))
        })
        .collect();
    if out.is_empty() {
        out.push(name.to_string());
    }
    out.dedup();
    out
}

/// Non-canonical columns ascending, then canonical columns in canonical-band
/// order (ascending within one band).
fn order_append_columns(columns: &BTreeSet<&str>) -> Vec<String> {
    let mut ordered: Vec<String> = columns
        .iter()
        .filter(|c| !registry::is_canonical_column(c))
        .map(|c| c.to_string())
        .collect();
    for band in CANONICAL_BANDS {
        ordered.extend(
            columns
                .iter()
                .filter(|c| c.split('_').next() == Some(*band))
                .map(|c| c.to_string()),
        );
    }
    ordered
}
