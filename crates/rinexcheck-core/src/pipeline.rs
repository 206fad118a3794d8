use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use polars::prelude::DataFrame;
use rinexcheck_parser::{NavSystemKind, NavigationLog, ReferenceData, SystemColumns};
use tracing::{debug, info, warn};

use crate::alignment::{align, chronological, LoggingPeriod};
use crate::config::{JobConfig, SystemSettings};
use crate::differences::{apply_differences, lat_diff_column, lon_diff_column, resolve_system_columns};
use crate::error::Result;
use crate::geodesy::ScaleFactors;
use crate::ingestion::{load_navigation, load_reference, FileRecord};
use crate::outputs::{merged_csv_path, write_merged_csv};
use crate::plot::{
    difference_plot_path, heading_plot_path, render_difference_plot, render_heading_plot,
};
use crate::report::{ReportPaths, SkippedSystem, SystemReport, VerificationReport};
use crate::statistics::SystemStatistics;

/// One reference file checked against one system of the navigation log.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub system: String,
    pub columns: SystemColumns,
    pub scale: ScaleFactors,
    pub period: LoggingPeriod,
    pub statistics: SystemStatistics,
    /// Joined rows in chronological order, with difference columns.
    pub merged: DataFrame,
}

/// Aligns, differences and summarises one system.
pub fn compare(
    reference: &ReferenceData,
    navigation: &NavigationLog,
    system: &str,
) -> Result<Comparison> {
    let columns = resolve_system_columns(&navigation.column_names(), system)?;

    let merged = align(reference, navigation)?;
    let (merged, period) = chronological(merged)?;
    let scale = ScaleFactors::from_mean_latitude(&merged)?;
    let merged = apply_differences(&merged, system, &columns, &scale)?;
    let statistics =
        SystemStatistics::from_frame(&merged, &lat_diff_column(system), &lon_diff_column(system))?;

    debug!(
        system,
        epochs = merged.height(),
        mean_latitude = scale.mean_latitude_deg,
        reversed = period.reversed,
        "compared system"
    );

    Ok(Comparison {
        system: system.to_string(),
        columns,
        scale,
        period,
        statistics,
        merged,
    })
}

/// Reads both files from disk and compares them.
pub fn compare_files(
    reference_path: &Path,
    navigation_path: &Path,
    system: &str,
    kind: Option<NavSystemKind>,
) -> Result<Comparison> {
    let (navigation, _) = load_navigation(navigation_path, kind)?;
    let (reference, _) = load_reference(reference_path)?;
    compare(&reference, &navigation, system)
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Takes precedence over the job's `[report].output_dir`.
    pub output_dir: Option<PathBuf>,
    /// `false` disables plots regardless of the job file.
    pub plots: bool,
    /// Report timestamp; defaults to the local time of the run.
    pub generated_at: Option<NaiveDateTime>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            plots: true,
            generated_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub report: VerificationReport,
    pub paths: ReportPaths,
    pub output_dir: PathBuf,
}

/// Runs every system of a job and writes the report.
///
/// A system that cannot be compared is listed as skipped; the report is
/// written even when no system could be aligned.
pub fn run_verification(job: &JobConfig, options: &RunOptions) -> Result<VerificationOutcome> {
    let output_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| job.output_dir());
    fs::create_dir_all(&output_dir)?;

    let (navigation, navigation_record) =
        load_navigation(&job.navigation.path, job.navigation.format)?;
    info!(
        format = %navigation.kind,
        rows = navigation.df.height(),
        headings = navigation.heading_columns.len(),
        "parsed navigation log"
    );

    let generated_at = options
        .generated_at
        .unwrap_or_else(|| Local::now().naive_local());
    let mut report =
        VerificationReport::new(&job.report, generated_at, navigation.kind, navigation_record);
    let plots_enabled = job.plot.enabled && options.plots;
    let mut last_merged: Option<DataFrame> = None;

    for system in &job.systems {
        let (comparison, reference_record) = match verify_system(system, &navigation) {
            Ok(result) => result,
            Err(err) => {
                warn!(system = %system.label, error = %err, "cannot produce merged table; skipping system");
                report.skipped.push(SkippedSystem {
                    label: system.label.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let mut entry = SystemReport::new(
            &system.label,
            &system.description,
            reference_record,
            &comparison.columns,
            comparison.merged.height(),
            comparison.period,
            comparison.scale,
            comparison.statistics,
        );

        if job.export_merged {
            let path = merged_csv_path(&output_dir, &system.label);
            if let Err(err) = write_merged_csv(&comparison.merged, &path) {
                warn!(system = %system.label, error = %err, "cannot export merged table; skipping system");
                report.skipped.push(SkippedSystem {
                    label: system.label.clone(),
                    reason: err.to_string(),
                });
                continue;
            }
            entry.merged_csv = file_name(&path);
        }

        if plots_enabled {
            let path = difference_plot_path(&output_dir, &system.label);
            match render_difference_plot(&comparison.merged, &system.label, &path, &job.plot) {
                Ok(()) => entry.plot = file_name(&path),
                Err(err) => warn!("Skipping SVG render ({}): {}", path.display(), err),
            }
        }

        info!(
            system = %system.label,
            epochs = entry.matched_epochs,
            lat_mean_m = ?entry.statistics.lat.mean,
            lon_mean_m = ?entry.statistics.lon.mean,
            "system verified"
        );
        report.systems.push(entry);
        last_merged = Some(comparison.merged);
    }

    // the gyro chart uses the rows of the last system that aligned
    if plots_enabled {
        match (&last_merged, navigation.heading_columns.is_empty()) {
            (Some(merged), false) => {
                let path = heading_plot_path(&output_dir);
                match render_heading_plot(merged, &navigation.heading_columns, &path, &job.plot) {
                    Ok(()) => report.heading_plot = file_name(&path),
                    Err(err) => warn!("Skipping SVG render ({}): {}", path.display(), err),
                }
            }
            (None, _) => debug!("no aligned system; heading plot skipped"),
            (_, true) => debug!("navigation log has no heading columns"),
        }
    }

    if report.systems.is_empty() {
        warn!(
            skipped = report.skipped.len(),
            "no system could be aligned with its reference file"
        );
    }

    let paths = report.write(&output_dir)?;
    Ok(VerificationOutcome {
        report,
        paths,
        output_dir,
    })
}

fn verify_system(
    system: &SystemSettings,
    navigation: &NavigationLog,
) -> Result<(Comparison, FileRecord)> {
    let (reference, record) = load_reference(&system.reference)?;
    debug!(system = %system.label, rows = reference.height(), "parsed reference file");
    let comparison = compare(&reference, navigation, &system.label)?;
    Ok((comparison, record))
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
