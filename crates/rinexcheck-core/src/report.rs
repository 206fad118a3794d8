use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use rinexcheck_parser::{NavSystemKind, SystemColumns};
use serde::Serialize;
use tracing::info;

use crate::alignment::LoggingPeriod;
use crate::config::ReportSettings;
use crate::error::Result;
use crate::geodesy::ScaleFactors;
use crate::gps_time::timetag;
use crate::ingestion::FileRecord;
use crate::statistics::{Stat, SystemStatistics};

pub const REPORT_TITLE: &str = "DGNSS Verification - RINEX";
const REPORT_PREFIX: &str = "RINEX_verification_report";
const LOGGING_TIME_FORMAT: &str = "%d-%m-%Y at %H:%M:%S";

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub title: String,
    pub generated_at: NaiveDateTime,
    pub vessel: String,
    pub location: String,
    pub client: String,
    pub job_number: String,
    pub scope_of_work: String,
    pub navigation_kind: NavSystemKind,
    pub navigation: FileRecord,
    pub systems: Vec<SystemReport>,
    /// File name of the gyro chart, relative to the report.
    pub heading_plot: Option<String>,
    pub skipped: Vec<SkippedSystem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemReport {
    pub label: String,
    pub description: String,
    pub reference: FileRecord,
    pub latitude_column: String,
    pub longitude_column: String,
    pub matched_epochs: usize,
    pub period: LoggingPeriod,
    pub scale: ScaleFactors,
    pub statistics: SystemStatistics,
    pub plot: Option<String>,
    pub merged_csv: Option<String>,
}

impl SystemReport {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        label: &str,
        description: &str,
        reference: FileRecord,
        columns: &SystemColumns,
        matched_epochs: usize,
        period: LoggingPeriod,
        scale: ScaleFactors,
        statistics: SystemStatistics,
    ) -> Self {
        Self {
            label: label.to_string(),
            description: description.to_string(),
            reference,
            latitude_column: columns.latitude.clone(),
            longitude_column: columns.longitude.clone(),
            matched_epochs,
            period,
            scale,
            statistics,
            plot: None,
            merged_csv: None,
        }
    }
}

/// A configured system that produced no comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSystem {
    pub label: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub markdown: PathBuf,
    pub json: PathBuf,
}

impl VerificationReport {
    pub fn new(
        settings: &ReportSettings,
        generated_at: NaiveDateTime,
        navigation_kind: NavSystemKind,
        navigation: FileRecord,
    ) -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            generated_at,
            vessel: settings.vessel.clone(),
            location: settings.location.clone(),
            client: settings.client.clone(),
            job_number: settings.job_number.clone(),
            scope_of_work: settings.scope_of_work.trim_end().to_string(),
            navigation_kind,
            navigation,
            systems: Vec::new(),
            heading_plot: None,
            skipped: Vec::new(),
        }
    }

    /// `RINEX_verification_report{YYYYMMDD_HHMMSS}`
    pub fn file_stem(&self) -> String {
        format!("{REPORT_PREFIX}{}", timetag(self.generated_at))
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "# {}\n", self.title);
        for (label, value) in [
            ("Vessel", &self.vessel),
            ("Location", &self.location),
            ("Client", &self.client),
            ("Job number", &self.job_number),
        ] {
            if !value.is_empty() {
                let _ = writeln!(out, "**{label}:** {value}  ");
            }
        }
        let _ = writeln!(
            out,
            "\nGenerated {} from {} log `{}`\n",
            self.generated_at.format(LOGGING_TIME_FORMAT),
            self.navigation_kind,
            self.navigation.path
        );

        let _ = writeln!(out, "## Scope of Work\n\n{}\n", self.scope_of_work);

        for system in &self.systems {
            let _ = writeln!(out, "## System : {} - {}\n", system.label, system.description);
            let _ = writeln!(
                out,
                "Start logging : {}  \nStop logging : {}  \nMatched epochs : {}\n",
                system.period.start.format(LOGGING_TIME_FORMAT),
                system.period.stop.format(LOGGING_TIME_FORMAT),
                system.matched_epochs
            );
            if let Some(plot) = &system.plot {
                let _ = writeln!(out, "![{}]({plot})\n", system.label);
            }
            let _ = writeln!(out, "### Statistics\n\n{}\n", statistics_table(&system.statistics));
        }

        if let Some(plot) = &self.heading_plot {
            let _ = writeln!(out, "## System : Gyros\n\n![Gyro heading]({plot})\n");
        }

        if !self.skipped.is_empty() {
            let _ = writeln!(out, "## Skipped systems\n");
            for skipped in &self.skipped {
                let _ = writeln!(out, "- `{}`: {}", skipped.label, skipped.reason);
            }
            out.push('\n');
        }

        out
    }

    /// Writes the Markdown report and its JSON sidecar into `dir`.
    pub fn write(&self, dir: &Path) -> Result<ReportPaths> {
        fs::create_dir_all(dir)?;
        let stem = self.file_stem();
        let paths = ReportPaths {
            markdown: dir.join(format!("{stem}.md")),
            json: dir.join(format!("{stem}.json")),
        };

        fs::write(&paths.markdown, self.to_markdown())?;
        fs::write(&paths.json, serde_json::to_string_pretty(self)?)?;

        info!(
            markdown = %paths.markdown.display(),
            json = %paths.json.display(),
            "wrote verification report"
        );
        Ok(paths)
    }

    /// One line per system for terminal output.
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "System",
                "Epochs",
                "Start",
                "Stop",
                "Lat mean [m]",
                "Lat std [m]",
                "Lon mean [m]",
                "Lon std [m]",
            ]);

        for system in &self.systems {
            let stats = &system.statistics;
            table.add_row(vec![
                Cell::new(&system.label),
                Cell::new(system.matched_epochs).set_alignment(CellAlignment::Right),
                Cell::new(system.period.start.format("%H:%M:%S")),
                Cell::new(system.period.stop.format("%H:%M:%S")),
                number_cell(Stat::Mean.format(stats.lat.mean)),
                number_cell(Stat::StdDev.format(stats.lat.std)),
                number_cell(Stat::Mean.format(stats.lon.mean)),
                number_cell(Stat::StdDev.format(stats.lon.std)),
            ]);
        }
        for skipped in &self.skipped {
            table.add_row(vec![
                Cell::new(&skipped.label),
                Cell::new(format!("skipped: {}", skipped.reason)),
            ]);
        }
        table
    }
}

fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// `Stat | Lat diff [m] | Lon diff [m]` as a Markdown table.
pub fn statistics_table(statistics: &SystemStatistics) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::ASCII_MARKDOWN)
        .set_header(vec!["Stat", "Lat diff [m]", "Lon diff [m]"]);
    for row in statistics.table_rows() {
        table.add_row(row.to_vec());
    }
    table
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::statistics::DiffStatistics;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 2, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn record(path: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            blake3: "00".repeat(32),
        }
    }

    fn report() -> VerificationReport {
        let settings = ReportSettings {
            vessel: "Survey Vessel".to_string(),
            job_number: "J-1042".to_string(),
            ..ReportSettings::default()
        };
        let mut report =
            VerificationReport::new(&settings, at(12, 30, 5), NavSystemKind::Trinav, record("nav.csv"));

        let mut system = SystemReport::new(
            "FU1G4_XX",
            "Starpack computations XP",
            record("ref.csv"),
            &SystemColumns {
                latitude: "FU1G4_XX Lat".to_string(),
                longitude: "FU1G4_XX Lon".to_string(),
            },
            3,
            LoggingPeriod {
                start: at(10, 0, 0),
                stop: at(10, 0, 2),
                reversed: false,
            },
            ScaleFactors::at_latitude(58.5),
            SystemStatistics {
                lat: DiffStatistics::from_values(&[0.1, 0.2, 0.3]),
                lon: DiffStatistics::from_values(&[-0.1, -0.2, -0.3]),
            },
        );
        system.plot = Some("FU1G4_XX.svg".to_string());
        report.systems.push(system);
        report.heading_plot = Some("gyros.svg".to_string());
        report.skipped.push(SkippedSystem {
            label: "FU2G4_XX".to_string(),
            reason: "no latitude column".to_string(),
        });
        report
    }

    #[test]
    fn markdown_layout() {
        let md = report().to_markdown();
        assert!(md.starts_with("# DGNSS Verification - RINEX\n"));
        assert!(md.contains("**Vessel:** Survey Vessel"));
        assert!(!md.contains("**Client:**"));
        assert!(md.contains("## Scope of Work"));
        assert!(md.contains("## System : FU1G4_XX - Starpack computations XP"));
        assert!(md.contains("Start logging : 14-02-2023 at 10:00:00"));
        assert!(md.contains("Stop logging : 14-02-2023 at 10:00:02"));
        assert!(md.contains("![FU1G4_XX](FU1G4_XX.svg)"));
        assert!(md.contains("![Gyro heading](gyros.svg)"));
        assert!(md.contains("- `FU2G4_XX`: no latitude column"));
    }

    #[test]
    fn statistics_table_is_markdown() {
        let md = report().to_markdown();
        let header = md
            .lines()
            .find(|line| line.contains("Lat diff [m]"))
            .unwrap();
        assert!(header.starts_with('|'));
        assert!(header.contains("Stat"));
        let max_row = md.lines().find(|line| line.contains("Max")).unwrap();
        assert!(max_row.contains("0.3000"));
        assert!(max_row.contains("-0.1000"));
        assert!(md.lines().any(|line| line.contains("# of obs") && line.contains('3')));
    }

    #[test]
    fn writes_markdown_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        let paths = report.write(dir.path()).unwrap();

        assert_eq!(
            paths.markdown.file_name().unwrap(),
            "RINEX_verification_report20230214_123005.md"
        );
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&paths.json).unwrap()).unwrap();
        assert_eq!(json["navigation_kind"], "trinav");
        assert_eq!(json["systems"][0]["statistics"]["lat"]["count"], 3);
        assert_eq!(json["skipped"][0]["label"], "FU2G4_XX");
    }

    #[test]
    fn summary_lists_skipped_systems() {
        let rendered = report().summary_table().to_string();
        assert!(rendered.contains("FU1G4_XX"));
        assert!(rendered.contains("skipped: no latitude column"));
    }
}
