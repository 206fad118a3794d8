use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets, Table};
use rinexcheck_core::config::{JobConfig, OUTPUT_DIR_ENV};
use rinexcheck_core::ingestion::load_navigation;
use rinexcheck_core::outputs::{merged_csv_path, write_merged_csv};
use rinexcheck_core::pipeline::{compare_files, run_verification, RunOptions};
use rinexcheck_core::report::statistics_table;
use rinexcheck_parser::NavSystemKind;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Cross-check navigation system positions against post-processed RINEX positions",
    long_about = None
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a verification job and write the report
    Verify(VerifyArgs),
    /// Merge one reference file with one system of a navigation log
    Merge(MergeArgs),
    /// Show what was detected in a navigation log
    Inspect(InspectArgs),
    /// Write a job file pre-filled for a navigation system
    InitJob(InitJobArgs),
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Job file (TOML)
    #[arg(long)]
    job: PathBuf,

    /// Report directory; overrides RINEXCHECK_OUTPUT_DIR and the job file
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Do not render SVG plots
    #[arg(long)]
    no_plot: bool,
}

#[derive(Args, Debug)]
struct MergeArgs {
    /// Post-processed reference positions (CSV)
    #[arg(long)]
    reference: PathBuf,

    /// Navigation log
    #[arg(long)]
    navigation: PathBuf,

    /// System label as it appears in the navigation log columns
    #[arg(long)]
    system: String,

    /// Navigation log format (trinav or spn); detected when omitted
    #[arg(long)]
    format: Option<NavSystemKind>,

    /// Output CSV; defaults to `{system}_combined.csv`
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Navigation log
    #[arg(long)]
    navigation: PathBuf,

    /// Navigation log format (trinav or spn); detected when omitted
    #[arg(long)]
    format: Option<NavSystemKind>,
}

#[derive(Args, Debug)]
struct InitJobArgs {
    /// Navigation system the job is for
    #[arg(long, default_value = "trinav")]
    format: NavSystemKind,

    #[arg(long, default_value = "job.toml")]
    output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Command::Verify(args) => verify(args),
        Command::Merge(args) => merge(args),
        Command::Inspect(args) => inspect(args),
        Command::InitJob(args) => init_job(args),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn verify(args: VerifyArgs) -> Result<()> {
    let job = JobConfig::from_path(&args.job)
        .with_context(|| format!("failed to load job {}", args.job.display()))?;

    let output_dir = args
        .output_dir
        .or_else(|| env::var_os(OUTPUT_DIR_ENV).map(PathBuf::from));
    let options = RunOptions {
        output_dir,
        plots: !args.no_plot,
        ..RunOptions::default()
    };

    let outcome = run_verification(&job, &options).context("verification failed")?;
    println!("{}", outcome.report.summary_table());
    info!(
        report = %outcome.paths.markdown.display(),
        verified = outcome.report.systems.len(),
        skipped = outcome.report.skipped.len(),
        "verification complete"
    );
    Ok(())
}

fn merge(args: MergeArgs) -> Result<()> {
    let comparison = compare_files(&args.reference, &args.navigation, &args.system, args.format)
        .with_context(|| format!("failed to merge system {}", args.system))?;

    let output = args
        .output
        .unwrap_or_else(|| merged_csv_path(Path::new("."), &args.system));
    write_merged_csv(&comparison.merged, &output)?;

    println!(
        "{} : {} epochs, {} to {}",
        comparison.system,
        comparison.merged.height(),
        comparison.period.start.format("%d-%m-%Y %H:%M:%S"),
        comparison.period.stop.format("%d-%m-%Y %H:%M:%S"),
    );
    println!("{}", statistics_table(&comparison.statistics));
    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let (log, record) = load_navigation(&args.navigation, args.format)
        .with_context(|| format!("failed to parse {}", args.navigation.display()))?;

    let mut overview = Table::new();
    overview.load_preset(presets::UTF8_FULL);
    overview.add_row(vec!["Format".to_string(), log.kind.to_string()]);
    overview.add_row(vec!["Rows".to_string(), log.df.height().to_string()]);
    overview.add_row(vec!["Time column".to_string(), log.time_column.clone()]);
    overview.add_row(vec![
        "Heading columns".to_string(),
        log.heading_columns.join(", "),
    ]);
    overview.add_row(vec!["blake3".to_string(), record.blake3]);
    println!("{overview}");

    let mut systems = Table::new();
    systems
        .load_preset(presets::UTF8_FULL)
        .set_header(vec!["System", "Latitude column", "Longitude column"]);
    let mut labels = log.detected_systems();
    for default in log.kind.default_systems() {
        if !labels.iter().any(|label| label == default) {
            labels.push(default.to_string());
        }
    }
    for label in labels {
        let (lat, lon) = match log.system_columns(&label) {
            Some(columns) => (columns.latitude, columns.longitude),
            None => ("-".to_string(), "-".to_string()),
        };
        systems.add_row(vec![label, lat, lon]);
    }
    println!("{systems}");
    Ok(())
}

fn init_job(args: InitJobArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            args.output.display()
        );
    }

    let template = JobConfig::template(args.format).to_toml_string()?;
    fs::write(&args.output, template)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(path = %args.output.display(), format = %args.format, "wrote job template");
    Ok(())
}
