//! Verification job files.
//!
//! A job names the navigation log, the post-processed reference file of every
//! positioning system to check, and the metadata printed on the report.
//!
//! ```toml
//! export_merged = false
//!
//! [report]
//! vessel = "Survey Vessel"
//! job_number = "J-1042"
//!
//! [navigation]
//! path = "logs/trinav_qcpr.csv"
//! format = "trinav"
//!
//! [[systems]]
//! label = "FU1G4_XX"
//! description = "Starpack computations XP"
//! reference = "ppp/FU1G4.csv"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rinexcheck_parser::NavSystemKind;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Overrides `[report].output_dir` when set.
pub const OUTPUT_DIR_ENV: &str = "RINEXCHECK_OUTPUT_DIR";

pub const DEFAULT_SCOPE_OF_WORK: &str = "\
This verification is performed by logging raw GNSS data in RINEX format, and having the data post processed by a recognised 3rd party.
The standard practice is to use the Natural Resources Canada (NRCAN) online service for post processing RINEX data.

Logged raw RINEX data from the GNSS receivers is uploaded directly from the vessel, and the processed result is received back from NRCAN almost instantly.
The post processed positions from each of the GNSS receivers are then compared with the DGNSS positions logged in the NAVIGATION system.
The comparison graphs are provided in this document and provide proof of the validity of the corrections and hence that the onboard installation is valid.
Gyro plots are also provided to show movements of the vessel during logging.";

/// Descriptions pre-filled for the four default systems of a navigation kind.
pub const DEFAULT_DESCRIPTIONS: [&str; 4] = [
    "Starpack computations XP",
    "Starpack computations G4",
    "Starfix NG computations XP",
    "Starfix NG computations G4",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Write `{system}_combined.csv` next to the report.
    #[serde(default)]
    pub export_merged: bool,
    #[serde(default)]
    pub report: ReportSettings,
    pub navigation: NavigationSettings,
    #[serde(default)]
    pub plot: PlotSettings,
    #[serde(default)]
    pub systems: Vec<SystemSettings>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub vessel: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub job_number: String,
    #[serde(default = "default_scope_of_work")]
    pub scope_of_work: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            vessel: String::new(),
            location: String::new(),
            client: String::new(),
            job_number: String::new(),
            scope_of_work: default_scope_of_work(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationSettings {
    pub path: PathBuf,
    /// Detected from the header when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<NavSystemKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Half range of the difference plot y axis, in metres.
    #[serde(default = "default_diff_limit")]
    pub diff_limit_m: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            diff_limit_m: default_diff_limit(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub reference: PathBuf,
}

fn default_scope_of_work() -> String {
    DEFAULT_SCOPE_OF_WORK.to_string()
}

fn default_true() -> bool {
    true
}

fn default_diff_limit() -> f64 {
    1.0
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    600
}

impl JobConfig {
    /// Reads, resolves against the job file's directory, and validates.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_toml_str(&content, base)
    }

    pub fn from_toml_str(content: &str, base_dir: &Path) -> Result<Self> {
        let mut job: JobConfig = toml::from_str(content)?;
        job.resolve(base_dir);
        job.validate()?;
        Ok(job)
    }

    /// Makes relative input and output paths relative to `base_dir`.
    pub fn resolve(&mut self, base_dir: &Path) {
        let join = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        };
        join(&mut self.navigation.path);
        for system in &mut self.systems {
            join(&mut system.reference);
        }
        if let Some(dir) = self.report.output_dir.as_mut() {
            join(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.systems.is_empty() {
            return Err(PipelineError::Validation(
                "job must list at least one [[systems]] entry".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for system in &self.systems {
            let label = system.label.trim();
            if label.is_empty() {
                return Err(PipelineError::Validation(
                    "system labels must not be empty".to_string(),
                ));
            }
            if !seen.insert(label) {
                return Err(PipelineError::Validation(format!(
                    "system '{label}' is listed more than once"
                )));
            }
        }

        if !(self.plot.diff_limit_m.is_finite() && self.plot.diff_limit_m > 0.0) {
            return Err(PipelineError::Validation(format!(
                "plot.diff_limit_m must be a positive number, got {}",
                self.plot.diff_limit_m
            )));
        }
        if self.plot.width == 0 || self.plot.height == 0 {
            return Err(PipelineError::Validation(
                "plot width and height must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.report
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// A job pre-filled with the usual systems of a navigation kind.
    pub fn template(kind: NavSystemKind) -> Self {
        let systems = kind
            .default_systems()
            .iter()
            .zip(DEFAULT_DESCRIPTIONS)
            .map(|(label, description)| SystemSettings {
                label: (*label).to_string(),
                description: description.to_string(),
                reference: PathBuf::from(format!("reference_{label}.csv")),
            })
            .collect();

        Self {
            export_merged: false,
            report: ReportSettings::default(),
            navigation: NavigationSettings {
                path: PathBuf::from("navigation_log.csv"),
                format: Some(kind),
            },
            plot: PlotSettings::default(),
            systems,
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"
[report]
vessel = "Survey Vessel"
output_dir = "out"

[navigation]
path = "logs/nav.csv"
format = "spn"

[[systems]]
label = "COR_NG_XP_B"
reference = "ppp/ng.csv"

[[systems]]
label = "COR_SP1_G4_A"
description = "Starpack computations G4"
reference = "/data/sp1.csv"
"#;

    #[test]
    fn parses_with_defaults_and_resolves_paths() {
        let job = JobConfig::from_toml_str(JOB, Path::new("/jobs/a")).unwrap();
        assert!(!job.export_merged);
        assert_eq!(job.navigation.format, Some(NavSystemKind::Spn));
        assert_eq!(job.navigation.path, PathBuf::from("/jobs/a/logs/nav.csv"));
        assert_eq!(job.systems[0].reference, PathBuf::from("/jobs/a/ppp/ng.csv"));
        assert_eq!(job.systems[1].reference, PathBuf::from("/data/sp1.csv"));
        assert_eq!(job.output_dir(), PathBuf::from("/jobs/a/out"));
        assert_eq!(job.report.scope_of_work, DEFAULT_SCOPE_OF_WORK);
        assert_eq!(job.plot, PlotSettings::default());
        assert!(job.systems[0].description.is_empty());
    }

    #[test]
    fn rejects_duplicate_and_missing_systems() {
        let duplicate = r#"
[navigation]
path = "nav.csv"

[[systems]]
label = "A"
reference = "a.csv"

[[systems]]
label = " A "
reference = "b.csv"
"#;
        assert!(matches!(
            JobConfig::from_toml_str(duplicate, Path::new("")),
            Err(PipelineError::Validation(_))
        ));

        let empty = "[navigation]\npath = \"nav.csv\"\n";
        assert!(matches!(
            JobConfig::from_toml_str(empty, Path::new("")),
            Err(PipelineError::Validation(_))
        ));
    }

    #[test]
    fn rejects_bad_plot_limits() {
        let mut job = JobConfig::template(NavSystemKind::Trinav);
        job.plot.diff_limit_m = 0.0;
        assert!(job.validate().is_err());
    }

    #[test]
    fn invalid_toml_is_reported() {
        assert!(matches!(
            JobConfig::from_toml_str("[navigation", Path::new("")),
            Err(PipelineError::TomlDe(_))
        ));
    }

    #[test]
    fn template_round_trips() {
        let template = JobConfig::template(NavSystemKind::Spn);
        assert_eq!(template.systems.len(), 4);
        assert_eq!(template.systems[2].label, "COR_NG_XP_B");
        assert_eq!(template.systems[2].description, "Starfix NG computations XP");

        let text = template.to_toml_string().unwrap();
        assert!(text.contains("[[systems]]"));
        let parsed = JobConfig::from_toml_str(&text, Path::new("")).unwrap();
        assert_eq!(parsed, template);
    }
}
