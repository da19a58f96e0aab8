//! Retrieve command - run a retrieval from a CSV of sites and dates.

use std::path::PathBuf;

use chrono::Local;
use clap::{Args, ValueEnum};
use tracing::{info, warn};

use geedar::code::{decode_all, parse_codes, CodecMode, ProcessingPlan};
use geedar::compute::ComputeService;
use geedar::config::{ConfigFile, RetrievalConfig, MAX_TIME_WINDOW};
use geedar::geo::{PointBuffer, RegionSource};
use geedar::input::{RunningMode, SiteDateExpander};
use geedar::orchestrator::{RetrievalReport, Retriever};

use super::common::{
    append_failure_log, backup_existing, load_region_catalog, read_input_table,
    resolve_output_path, write_result_table,
};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Input interpretation for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// One row per site and date (`date` column)
    Dates,
    /// One row per site with `start_date` and `end_date`
    Ranges,
}

impl From<ModeArg> for RunningMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Dates => RunningMode::SpecificDates,
            ModeArg::Ranges => RunningMode::DateRanges,
        }
    }
}

/// Arguments for the retrieve command.
#[derive(Debug, Args)]
pub struct RetrieveArgs {
    /// CSV file with the sites and dates
    pub input: PathBuf,

    /// Output CSV (default: <input>_result.csv next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Processing code(s), e.g. "20109021" or "20109021,30109001"
    #[arg(short, long)]
    pub codes: String,

    /// How to read the input (detected from its columns if not specified)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Days before and after each date to also retrieve
    #[arg(long)]
    pub time_window: Option<u32>,

    /// Buffer radius around site coordinates, in metres
    #[arg(long)]
    pub aoi_radius: Option<f64>,

    /// Stack all processing codes under canonical band names
    #[arg(long)]
    pub append: bool,

    /// JSON file mapping site ids to regions
    #[arg(long)]
    pub regions: Option<PathBuf>,

    /// Batches in flight per site and processing code
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// Skip invalid processing codes instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Compute gateway URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Bearer token for the compute gateway
    #[arg(long)]
    pub token: Option<String>,

    /// Also print log records to stdout
    #[arg(short, long)]
    pub verbose: bool,
}

/// One resolved retrieval job.
#[derive(Debug, Clone)]
pub struct RetrieveJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub plans: Vec<ProcessingPlan>,
    pub mode: Option<RunningMode>,
    pub regions: Option<PathBuf>,
    pub failure_log: PathBuf,
}

/// What a job produced.
#[derive(Debug)]
pub struct RetrieveSummary {
    /// Where results were written; `None` when nothing was retrieved.
    pub written: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub report: RetrievalReport,
}

/// Run the retrieve command.
pub async fn run(args: RetrieveArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("retrieve");

    let config = build_config(&args, runner.config())?;
    if !args.input.is_file() {
        return Err(CliError::InvalidArgument(format!(
            "File not found: '{}'",
            args.input.display()
        )));
    }

    let codes = parse_codes(&args.codes)?;
    let plans = decode_all(&codes, config.codec_mode())?;
    let job = RetrieveJob {
        output: resolve_output_path(&args.input, args.output.as_deref())?,
        input: args.input,
        plans,
        mode: args.mode.map(RunningMode::from),
        regions: args.regions,
        failure_log: runner.config().logging.failure_log.clone(),
    };

    let service = runner.create_service(args.endpoint, args.token)?;
    let summary = execute(service, &job, &config).await?;

    if let Some(backup) = &summary.backup {
        println!(
            "(!) Output file already existed, so a backup was created: '{}'.",
            backup.display()
        );
    }
    match &summary.written {
        Some(path) => println!("Results saved to file '{}'.", path.display()),
        None => println!("No results to be saved."),
    }
    println!("{}", summary.report.stats);
    if !summary.report.failures.is_empty() {
        println!(
            "{} problem(s) recorded in '{}'.",
            summary.report.failures.len(),
            job.failure_log.display()
        );
    }
    Ok(())
}

/// Merges command-line overrides into the configured settings.
pub fn build_config(args: &RetrieveArgs, file: &ConfigFile) -> Result<RetrievalConfig, CliError> {
    let mut config = RetrievalConfig::from(file);

    if let Some(days) = args.time_window {
        if days > MAX_TIME_WINDOW {
            return Err(CliError::InvalidArgument(format!(
                "The 'time_window' must be between 0 and {} days.",
                MAX_TIME_WINDOW
            )));
        }
        config = config.with_time_window(days);
    }
    if let Some(radius) = args.aoi_radius {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(CliError::InvalidArgument(
                "The 'aoi_radius' must be a number greater than zero.".to_string(),
            ));
        }
        config = config.with_aoi_radius_m(radius);
    }
    if args.append {
        config = config.with_append_mode(true);
    }
    if let Some(batches) = args.max_in_flight {
        config = config.with_max_in_flight_batches(batches);
    }
    if args.lenient {
        config = config.with_codec_mode(CodecMode::Lenient);
    }
    Ok(config)
}

/// Reads the input, retrieves, and writes results plus the failure log.
pub async fn execute<S: ComputeService>(
    service: S,
    job: &RetrieveJob,
    config: &RetrievalConfig,
) -> Result<RetrieveSummary, CliError> {
    let backup = backup_existing(&job.output)?;

    let table = read_input_table(&job.input)?;
    let mode = job.mode.unwrap_or_else(|| RunningMode::detect(&table));
    info!(input = %job.input.display(), rows = table.len(), %mode, "Input loaded");

    let regions: Box<dyn RegionSource> = match &job.regions {
        Some(path) => Box::new(load_region_catalog(path, config.aoi_radius_m())?),
        None => Box::new(PointBuffer::new(config.aoi_radius_m())),
    };

    let expansion = SiteDateExpander::new(mode)
        .with_time_window(config.time_window())
        .with_product_ids(job.plans.iter().map(ProcessingPlan::product_id).collect())
        .expand(&table, regions.as_ref())?;

    let report = Retriever::new(service, config)
        .run(&expansion, &job.plans)
        .await;

    let now = Local::now().naive_local();
    if let Err(e) = append_failure_log(&job.failure_log, &report.failures, now) {
        warn!(error = %e, "Could not write the failure log");
        for record in &report.failures {
            eprintln!("{}", record);
        }
    }

    let written = match &report.table {
        Some(table) => {
            write_result_table(&job.output, table)?;
            info!(output = %job.output.display(), rows = table.len(), "Results saved");
            Some(job.output.clone())
        }
        None => None,
    };

    Ok(RetrieveSummary {
        written,
        backup,
        report,
    })
}
