//! Site/date expansion.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, Local, NaiveDate};
use tracing::{debug, info, warn};

use super::{InputError, InputTable, RunningMode};
use crate::config::MAX_TIME_WINDOW;
use crate::geo::{Region, RegionSource};
use crate::registry;

/// Name of the column holding the query date when a time window is used.
pub const IMG_DATE_COLUMN: &str = "img_date";

/// Start date used for blank or `auto` range starts.
fn default_range_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1960, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Parses an ISO date, ignoring any time part.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let head = text.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%Y/%m/%d"))
        .ok()
}

/// One output row skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateRow {
    /// Input cells (plus the inserted `img_date` cell when windowed).
    pub cells: Vec<String>,
    /// Site the row belongs to; `None` for rows that failed validation.
    pub site: Option<String>,
    /// Date queried for this row; `None` for rows that failed validation.
    pub query_date: Option<NaiveDate>,
}

/// The output row skeleton retrieved values are joined onto.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub columns: Vec<String>,
    pub rows: Vec<TemplateRow>,
    pub mode: RunningMode,
}

/// A site and the dates to query for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub id: String,
    pub region: Region,
    /// Unique, ascending.
    pub dates: Vec<NaiveDate>,
    /// Template rows belonging to this site.
    pub rows: Vec<usize>,
}

/// Result of expanding an input table.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub template: Template,
    pub sites: Vec<Site>,
    /// Sites whose region could not be resolved; their rows stay empty.
    pub unresolved_sites: Vec<String>,
}

/// Column positions the expander works with.
struct Columns {
    date: usize,
    id: Option<usize>,
    lat: Option<usize>,
    long: Option<usize>,
}

impl Columns {
    fn resolve(table: &InputTable) -> Result<Self, InputError> {
        let date = table
            .column_index("date")
            .ok_or_else(|| InputError::MissingColumns("date".to_string()))?;
        let columns = Self {
            date,
            id: table.column_index("id"),
            lat: table.column_index("lat"),
            long: table.column_index("long"),
        };
        if !columns.has_site_columns() {
            return Err(InputError::MissingColumns("id, or lat and long".to_string()));
        }
        Ok(columns)
    }

    fn has_site_columns(&self) -> bool {
        self.id.is_some() || (self.lat.is_some() && self.long.is_some())
    }
}

/// A validated input row.
struct ParsedRow {
    date: NaiveDate,
    site: String,
    coords: Option<(f64, f64)>,
}

/// Turns an input table into output templates and per-site demand dates.
///
/// # Example
///
/// ```
/// use geedar::geo::PointBuffer;
/// use geedar::input::{InputTable, RunningMode, SiteDateExpander};
///
/// let table = InputTable::from_strs(
///     &["date", "id", "lat", "long"],
///     &[&["2021-01-01", "lake", "-3.1", "-60.0"]],
/// )
/// .unwrap();
/// let expansion = SiteDateExpander::new(RunningMode::SpecificDates)
///     .with_time_window(1)
///     .expand(&table, &PointBuffer::new(1000.0))
///     .unwrap();
///
/// assert_eq!(expansion.template.rows.len(), 3);
/// assert_eq!(expansion.sites[0].dates.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SiteDateExpander {
    mode: RunningMode,
    time_window: u32,
    product_ids: Vec<u16>,
    today: NaiveDate,
}

impl SiteDateExpander {
    pub fn new(mode: RunningMode) -> Self {
        Self {
            mode,
            time_window: 0,
            product_ids: Vec::new(),
            today: Local::now().date_naive(),
        }
    }

    /// Days queried on each side of every explicit date.
    ///
    /// Ignored in date-range mode. Capped at 365 days.
    pub fn with_time_window(mut self, days: u32) -> Self {
        self.time_window = days.min(MAX_TIME_WINDOW);
        self
    }

    /// Products whose start dates clip date ranges.
    pub fn with_product_ids(mut self, ids: Vec<u16>) -> Self {
        self.product_ids = ids;
        self
    }

    /// Date used for blank or `auto` range ends.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn mode(&self) -> RunningMode {
        self.mode
    }

    /// Time window actually applied for the current mode.
    pub fn effective_time_window(&self) -> u32 {
        match self.mode {
            RunningMode::SpecificDates => self.time_window,
            RunningMode::DateRanges => 0,
        }
    }

    /// Expands `table` into a template and the sites to query.
    pub fn expand(
        &self,
        table: &InputTable,
        regions: &dyn RegionSource,
    ) -> Result<Expansion, InputError> {
        if table.is_empty() {
            return Err(InputError::NoRows);
        }

        let dated = match self.mode {
            RunningMode::SpecificDates => table.clone(),
            RunningMode::DateRanges => {
                if self.time_window > 0 {
                    info!(
                        time_window = self.time_window,
                        "Time window is ignored in date-range mode"
                    );
                }
                self.ranges_to_dates(table)?
            }
        };

        let columns = Columns::resolve(&dated)?;
        let window = self.effective_time_window();
        let parsed: Vec<Option<ParsedRow>> = dated
            .rows()
            .iter()
            .enumerate()
            .map(|(i, cells)| {
                parse_row(&columns, i, cells).filter(|p| {
                    let fits = window_dates(p.date, window).is_some();
                    if !fits {
                        warn!(row = i + 1, date = %p.date, window, "Time window runs past the calendar; row ignored");
                    }
                    fits
                })
            })
            .collect();

        let valid = parsed.iter().filter(|p| p.is_some()).count();
        if valid == 0 {
            return Err(InputError::NoValidRows);
        }
        debug!(rows = dated.len(), valid, window, "Input rows validated");

        let template = build_template(&dated, &columns, &parsed, window, self.mode);
        let (sites, unresolved_sites) = group_sites(&template, &parsed, regions);

        Ok(Expansion {
            template,
            sites,
            unresolved_sites,
        })
    }

    /// Explodes `start_date`/`end_date` rows into one row per day.
    fn ranges_to_dates(&self, table: &InputTable) -> Result<InputTable, InputError> {
        let (Some(start_col), Some(end_col)) = (
            table.column_index("start_date"),
            table.column_index("end_date"),
        ) else {
            return Err(InputError::MissingColumns(
                "start_date, end_date".to_string(),
            ));
        };

        let id = table.column_index("id");
        let lat = table.column_index("lat");
        let long = table.column_index("long");
        if id.is_none() && (lat.is_none() || long.is_none()) {
            return Err(InputError::MissingColumns("id, or lat and long".to_string()));
        }

        let kept: Vec<usize> = [id, lat.zip(long).map(|(la, _)| la), lat.zip(long).map(|(_, lo)| lo)]
            .into_iter()
            .flatten()
            .collect();

        let mut columns = vec!["date".to_string()];
        columns.extend(kept.iter().map(|&c| table.columns()[c].clone()));

        let earliest = registry::earliest_start(&self.product_ids);
        let mut rows = Vec::new();
        for (i, cells) in table.rows().iter().enumerate() {
            let start = range_bound(&cells[start_col], default_range_start());
            let end = range_bound(&cells[end_col], self.today);
            let (Some(start), Some(end)) = (start, end) else {
                warn!(
                    row = i + 1,
                    start = %cells[start_col],
                    end = %cells[end_col],
                    "Could not interpret the date range; row ignored"
                );
                continue;
            };

            let start = start.max(earliest);
            let end = end.min(self.today);
            if end < start {
                warn!(row = i + 1, %start, %end, "Date range is empty; row ignored");
                continue;
            }

            for day in start.iter_days().take_while(|d| *d <= end) {
                let mut row = vec![day.to_string()];
                row.extend(kept.iter().map(|&c| cells[c].clone()));
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return Err(InputError::NoValidRows);
        }
        InputTable::new(columns, rows)
    }
}

/// Dates from `date - window` to `date + window`, or `None` when either end
/// falls outside the representable calendar.
fn window_dates(date: NaiveDate, window: u32) -> Option<Vec<NaiveDate>> {
    let span = i64::from(window);
    (-span..=span)
        .map(|offset| date.checked_add_signed(Duration::days(offset)))
        .collect()
}

/// A range bound: blank or `auto` takes `default`.
fn range_bound(text: &str, default: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("auto") {
        Some(default)
    } else {
        parse_date(text)
    }
}

fn parse_row(columns: &Columns, index: usize, cells: &[String]) -> Option<ParsedRow> {
    let row = index + 1;
    let Some(date) = parse_date(&cells[columns.date]) else {
        warn!(row, value = %cells[columns.date], "Unparsable date; row ignored");
        return None;
    };

    let coords = match (columns.lat, columns.long) {
        (Some(lat), Some(long)) => {
            let (lat_text, long_text) = (cells[lat].trim(), cells[long].trim());
            if lat_text.is_empty() && long_text.is_empty() {
                None
            } else {
                match (lat_text.parse::<f64>(), long_text.parse::<f64>()) {
                    (Ok(la), Ok(lo)) if la.is_finite() && lo.is_finite() => Some((la, lo)),
                    _ => {
                        warn!(row, lat = lat_text, long = long_text, "Coordinates are not decimal degrees; row ignored");
                        return None;
                    }
                }
            }
        }
        _ => None,
    };

    let explicit_id = columns
        .id
        .map(|c| cells[c].trim())
        .filter(|id| !id.is_empty());
    let site = match (explicit_id, columns.lat.zip(columns.long), coords) {
        (Some(id), _, _) => id.to_string(),
        (None, Some((lat, long)), Some(_)) => {
            format!("{}{}", cells[lat].trim(), cells[long].trim())
        }
        _ => {
            warn!(row, "Row has neither a site id nor coordinates; row ignored");
            return None;
        }
    };

    Some(ParsedRow { date, site, coords })
}

fn build_template(
    table: &InputTable,
    columns: &Columns,
    parsed: &[Option<ParsedRow>],
    window: u32,
    mode: RunningMode,
) -> Template {
    let mut names = table.columns().to_vec();
    if window > 0 {
        names.insert(columns.date + 1, IMG_DATE_COLUMN.to_string());
    }

    let mut rows = Vec::new();
    for (cells, parsed) in table.rows().iter().zip(parsed) {
        let windowed = parsed
            .as_ref()
            .and_then(|p| window_dates(p.date, window).map(|dates| (p, dates)));
        match windowed {
            Some((p, dates)) => {
                for query in dates {
                    let mut cells = cells.clone();
                    if window > 0 {
                        cells.insert(columns.date + 1, query.to_string());
                    }
                    rows.push(TemplateRow {
                        cells,
                        site: Some(p.site.clone()),
                        query_date: Some(query),
                    });
                }
            }
            None => {
                let mut cells = cells.clone();
                if window > 0 {
                    cells.insert(columns.date + 1, String::new());
                }
                rows.push(TemplateRow {
                    cells,
                    site: None,
                    query_date: None,
                });
            }
        }
    }

    Template {
        columns: names,
        rows,
        mode,
    }
}

/// Groups template rows by site, in order of first appearance, and resolves
/// each site's region.
fn group_sites(
    template: &Template,
    parsed: &[Option<ParsedRow>],
    regions: &dyn RegionSource,
) -> (Vec<Site>, Vec<String>) {
    struct Pending {
        id: String,
        coords: Option<(f64, f64)>,
        dates: BTreeSet<NaiveDate>,
        rows: Vec<usize>,
    }

    let mut order: Vec<Pending> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut coords_by_site: HashMap<&str, Option<(f64, f64)>> = HashMap::new();
    for p in parsed.iter().flatten() {
        match coords_by_site.get(p.site.as_str()) {
            None => {
                coords_by_site.insert(&p.site, p.coords);
            }
            Some(first) if *first != p.coords => {
                warn!(site = %p.site, "Site has differing coordinates; using the first pair");
            }
            Some(_) => {}
        }
    }

    for (i, row) in template.rows.iter().enumerate() {
        let (Some(site), Some(date)) = (&row.site, row.query_date) else {
            continue;
        };
        let slot = *index.entry(site.clone()).or_insert_with(|| {
            order.push(Pending {
                id: site.clone(),
                coords: coords_by_site.get(site.as_str()).copied().flatten(),
                dates: BTreeSet::new(),
                rows: Vec::new(),
            });
            order.len() - 1
        });
        order[slot].dates.insert(date);
        order[slot].rows.push(i);
    }

    let mut sites = Vec::with_capacity(order.len());
    let mut unresolved = Vec::new();
    for pending in order {
        match regions.region_for(&pending.id, pending.coords) {
            Some(region) => sites.push(Site {
                id: pending.id,
                region,
                dates: pending.dates.into_iter().collect(),
                rows: pending.rows,
            }),
            None => {
                warn!(site = %pending.id, "No region of interest for site; site skipped");
                unresolved.push(pending.id);
            }
        }
    }
    (sites, unresolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{PointBuffer, RegionCatalog};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn buffer() -> PointBuffer {
        PointBuffer::new(1000.0)
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date("2021-01-02"), NaiveDate::from_ymd_opt(2021, 1, 2));
        assert_eq!(parse_date(" 2021/01/02 "), NaiveDate::from_ymd_opt(2021, 1, 2));
        assert_eq!(parse_date("2021-01-02T10:00:00"), NaiveDate::from_ymd_opt(2021, 1, 2));
        assert_eq!(parse_date("2021-01-02 10:00"), NaiveDate::from_ymd_opt(2021, 1, 2));
        assert_eq!(parse_date("02/01/2021"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_time_window_expands_rows_and_dedupes_dates() {
        let table = InputTable::from_strs(
            &["date", "id", "lat", "long"],
            &[
                &["2021-01-01", "s1", "-3.1", "-60.0"],
                &["2021-01-02", "s1", "-3.1", "-60.0"],
            ],
        )
        .unwrap();

        let expansion = SiteDateExpander::new(RunningMode::SpecificDates)
            .with_time_window(1)
            .expand(&table, &buffer())
            .unwrap();

        assert_eq!(expansion.template.rows.len(), 6);
        assert_eq!(
            expansion.template.columns,
            vec!["date", "img_date", "id", "lat", "long"]
        );
        assert_eq!(expansion.sites.len(), 1);
        let site = &expansion.sites[0];
        assert_eq!(
            site.dates,
            vec![
                date("2020-12-31"),
                date("2021-01-01"),
                date("2021-01-02"),
                date("2021-01-03")
            ]
        );
        assert_eq!(site.rows, (0..6).collect::<Vec<_>>());

        let first = &expansion.template.rows[0];
        assert_eq!(first.cells[0], "2021-01-01");
        assert_eq!(first.cells[1], "2020-12-31");
        assert_eq!(first.query_date, Some(date("2020-12-31")));
    }

    #[test]
    fn test_site_identity_from_coordinates() {
        let table = InputTable::from_strs(
            &["date", "lat", "long"],
            &[
                &["2021-01-01", "-3.10", "-60.0"],
                &["2021-01-05", "-3.10", "-60.0"],
                &["2021-01-01", "-3.2", "-60.0"],
            ],
        )
        .unwrap();

        let expansion = SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&table, &buffer())
            .unwrap();

        let ids: Vec<&str> = expansion.sites.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["-3.10-60.0", "-3.2-60.0"]);
        assert_eq!(expansion.sites[0].dates.len(), 2);
    }

    #[test]
    fn test_invalid_rows_kept_as_empty_template_rows() {
        let table = InputTable::from_strs(
            &["date", "id", "lat", "long"],
            &[
                &["2021-01-01", "s1", "-3.1", "-60.0"],
                &["not a date", "s1", "-3.1", "-60.0"],
                &["2021-01-03", "s2", "north", "-60.0"],
            ],
        )
        .unwrap();

        let expansion = SiteDateExpander::new(RunningMode::SpecificDates)
            .with_time_window(2)
            .expand(&table, &buffer())
            .unwrap();

        // 5 rows for the valid one, 1 each for the two invalid ones.
        assert_eq!(expansion.template.rows.len(), 7);
        let invalid = &expansion.template.rows[5];
        assert_eq!(invalid.site, None);
        assert_eq!(invalid.cells[1], "");
        assert_eq!(expansion.sites.len(), 1);
    }

    #[test]
    fn test_missing_columns_is_fatal() {
        let table = InputTable::from_strs(&["id", "lat"], &[&["s1", "1.0"]]).unwrap();
        let err = SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&table, &buffer())
            .unwrap_err();
        assert_eq!(err, InputError::MissingColumns("date".to_string()));

        let table = InputTable::from_strs(&["date", "lat"], &[&["2021-01-01", "1.0"]]).unwrap();
        let err = SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&table, &buffer())
            .unwrap_err();
        assert!(matches!(err, InputError::MissingColumns(_)));
    }

    #[test]
    fn test_no_valid_rows_is_fatal() {
        let table = InputTable::from_strs(&["date", "id"], &[&["bad", "s1"], &["", "s2"]]).unwrap();
        let err = SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&table, &buffer())
            .unwrap_err();
        assert_eq!(err, InputError::NoValidRows);

        let empty = InputTable::from_strs(&["date", "id"], &[]).unwrap();
        let err = SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&empty, &buffer())
            .unwrap_err();
        assert_eq!(err, InputError::NoRows);
    }

    #[test]
    fn test_date_ranges_explode_per_day() {
        let table = InputTable::from_strs(
            &["ID", "start_date", "end_date", "lat", "long", "note"],
            &[&["lake", "2021-01-30", "2021-02-02", "-3.1", "-60.0", "x"]],
        )
        .unwrap();

        let expansion = SiteDateExpander::new(RunningMode::DateRanges)
            .with_time_window(3)
            .expand(&table, &buffer())
            .unwrap();

        assert_eq!(expansion.template.columns, vec!["date", "ID", "lat", "long"]);
        assert_eq!(expansion.template.rows.len(), 4);
        assert_eq!(expansion.template.rows[3].cells[0], "2021-02-02");
        assert_eq!(expansion.sites[0].dates.len(), 4);
        assert_eq!(expansion.template.mode, RunningMode::DateRanges);
    }

    #[test]
    fn test_auto_range_is_clipped_to_product_start() {
        let table = InputTable::from_strs(
            &["id", "start_date", "end_date"],
            &[&["lake", "auto", "2015-06-25"], &["river", "2020-01-01", ""]],
        )
        .unwrap();

        let catalog = RegionCatalog::new()
            .with_region("lake", Region::buffered_point(0.0, 0.0, 10.0).unwrap())
            .with_region("river", Region::buffered_point(1.0, 1.0, 10.0).unwrap());
        let expansion = SiteDateExpander::new(RunningMode::DateRanges)
            .with_product_ids(vec![202])
            .with_today(date("2020-01-02"))
            .expand(&table, &catalog)
            .unwrap();

        // 2015-06-23 (product start) .. 2015-06-25, then 2020-01-01 .. today.
        assert_eq!(expansion.sites[0].dates.first(), Some(&date("2015-06-23")));
        assert_eq!(expansion.sites[0].dates.len(), 3);
        assert_eq!(expansion.sites[1].dates.len(), 2);
    }

    #[test]
    fn test_time_window_is_capped() {
        let table = InputTable::from_strs(&["date", "id"], &[&["2021-01-01", "lake"]]).unwrap();
        let expander = SiteDateExpander::new(RunningMode::SpecificDates).with_time_window(100_000_000);
        assert_eq!(expander.effective_time_window(), MAX_TIME_WINDOW);

        let expansion = expander.expand(&table, &buffer()).unwrap();
        assert_eq!(expansion.template.rows.len(), 2 * MAX_TIME_WINDOW as usize + 1);
    }

    #[test]
    fn test_window_past_calendar_end_is_rejected() {
        assert!(window_dates(NaiveDate::MAX, 1).is_none());
        assert!(window_dates(NaiveDate::MIN, 1).is_none());
        assert_eq!(window_dates(NaiveDate::MAX, 0), Some(vec![NaiveDate::MAX]));

        let near_end = NaiveDate::MAX - Duration::days(1);
        assert_eq!(window_dates(near_end, 1).map(|d| d.len()), Some(3));
    }

    #[test]
    fn test_future_range_end_is_clipped_to_today() {
        let table = InputTable::from_strs(
            &["id", "start_date", "end_date"],
            &[&["lake", "2021-01-01", "9999-12-31"]],
        )
        .unwrap();
        let catalog = RegionCatalog::new()
            .with_region("lake", Region::buffered_point(0.0, 0.0, 10.0).unwrap());

        let expansion = SiteDateExpander::new(RunningMode::DateRanges)
            .with_today(date("2021-01-03"))
            .expand(&table, &catalog)
            .unwrap();
        assert_eq!(expansion.sites[0].dates.len(), 3);
        assert_eq!(expansion.sites[0].dates.last(), Some(&date("2021-01-03")));
    }

    #[test]
    fn test_unreadable_range_row_skipped() {
        let table = InputTable::from_strs(
            &["id", "start_date", "end_date"],
            &[&["a", "garbage", "2021-01-01"], &["b", "2021-01-01", "2021-01-01"]],
        )
        .unwrap();
        let catalog = RegionCatalog::new()
            .with_region("b", Region::buffered_point(0.0, 0.0, 10.0).unwrap());

        let expansion = SiteDateExpander::new(RunningMode::DateRanges)
            .expand(&table, &catalog)
            .unwrap();
        assert_eq!(expansion.template.rows.len(), 1);
        assert_eq!(expansion.sites[0].id, "b");
    }

    #[test]
    fn test_unresolved_sites_reported() {
        let table = InputTable::from_strs(&["date", "id"], &[&["2021-01-01", "nowhere"]]).unwrap();
        let expansion = SiteDateExpander::new(RunningMode::SpecificDates)
            .expand(&table, &buffer())
            .unwrap();
        assert!(expansion.sites.is_empty());
        assert_eq!(expansion.unresolved_sites, vec!["nowhere"]);
        assert_eq!(expansion.template.rows[0].site.as_deref(), Some("nowhere"));
    }
}
