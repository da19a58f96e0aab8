//! Common file handling shared across CLI commands.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use geedar::geo::{PointBuffer, Region, RegionCatalog};
use geedar::input::InputTable;
use geedar::orchestrator::{FailureKind, FailureRecord};
use geedar::result::ResultTable;

use crate::error::CliError;

/// Suffix of the default output file name.
const RESULT_SUFFIX: &str = "_result.csv";

/// Reads a CSV file with a header row.
pub fn read_input_table(path: &Path) -> Result<InputTable, CliError> {
    let csv_error = |error| CliError::Csv {
        path: path.to_path_buf(),
        error,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(InputTable::new(columns, rows)?)
}

/// Writes a result table as CSV; missing cells are empty.
pub fn write_result_table(path: &Path, table: &ResultTable) -> Result<(), CliError> {
    let csv_error = |error| CliError::Csv {
        path: path.to_path_buf(),
        error,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(table.columns()).map_err(csv_error)?;
    for row in table.string_rows() {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.flush().map_err(|error| CliError::FileWrite {
        path: path.to_path_buf(),
        error,
    })
}

/// Where results go.
///
/// Without `output`, `<input stem>_result.csv` next to the input. A bare
/// file name is placed next to the input; any other directory must exist.
pub fn resolve_output_path(input: &Path, output: Option<&Path>) -> Result<PathBuf, CliError> {
    let input_dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let Some(output) = output else {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "geedar".to_string());
        return Ok(input_dir.join(format!("{}{}", stem, RESULT_SUFFIX)));
    };

    match output.parent().filter(|p| !p.as_os_str().is_empty()) {
        None => Ok(input_dir.join(output)),
        Some(dir) if dir.is_dir() => Ok(output.to_path_buf()),
        Some(dir) => Err(CliError::InvalidArgument(format!(
            "Directory not found: '{}'",
            dir.display()
        ))),
    }
}

/// Copies an existing file to `<path>.bkp`, returning the backup path.
pub fn backup_existing(path: &Path) -> Result<Option<PathBuf>, CliError> {
    if !path.is_file() {
        return Ok(None);
    }
    let mut backup = path.as_os_str().to_owned();
    backup.push(".bkp");
    let backup = PathBuf::from(backup);
    fs::copy(path, &backup).map_err(|error| CliError::FileWrite {
        path: backup.clone(),
        error,
    })?;
    Ok(Some(backup))
}

/// Loads a JSON object mapping site ids to regions.
///
/// Sites missing from the file are buffered by `fallback_radius_m`.
pub fn load_region_catalog(path: &Path, fallback_radius_m: f64) -> Result<RegionCatalog, CliError> {
    let text = fs::read_to_string(path).map_err(|error| CliError::FileRead {
        path: path.to_path_buf(),
        error,
    })?;
    let invalid = |reason: String| CliError::Regions {
        path: path.to_path_buf(),
        reason,
    };

    let regions: HashMap<String, Region> =
        serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
    let mut catalog = RegionCatalog::new().with_fallback(PointBuffer::new(fallback_radius_m));
    for (site, region) in regions {
        let region = region
            .validated()
            .map_err(|e| invalid(format!("site '{}': {}", site, e)))?;
        catalog.insert(site, region);
    }
    Ok(catalog)
}

/// One failure-log line: `timestamp,entry_type,identifier,message`.
pub fn failure_log_line(record: &FailureRecord, now: NaiveDateTime) -> String {
    let entry_type = match record.kind {
        FailureKind::NotApplicable | FailureKind::DateMissing => "Warning",
        _ => "Error",
    };
    format!(
        "{},{},{},{}: {}",
        now.format("%Y-%m-%d %H:%M"),
        entry_type,
        record.identifier(),
        record.kind,
        record.message.replace('\n', " ")
    )
}

/// Appends failure records to the failure log.
pub fn append_failure_log(
    path: &Path,
    records: &[FailureRecord],
    now: NaiveDateTime,
) -> Result<(), CliError> {
    if records.is_empty() {
        return Ok(());
    }
    let write_error = |error| CliError::FileWrite {
        path: path.to_path_buf(),
        error,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_error)?;
    for record in records {
        writeln!(file, "{}", failure_log_line(record, now)).map_err(write_error)?;
    }
    Ok(())
}
