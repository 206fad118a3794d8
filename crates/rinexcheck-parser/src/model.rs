use std::fmt;
use std::str::FromStr;

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::formats::find_system_column;
use crate::formats::schema::{LATITUDE_MARKERS, LONGITUDE_MARKERS};

/// Navigation system that produced a position log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavSystemKind {
    Trinav,
    Spn,
}

impl NavSystemKind {
    pub const ALL: [NavSystemKind; 2] = [NavSystemKind::Trinav, NavSystemKind::Spn];

    pub fn as_str(&self) -> &'static str {
        match self {
            NavSystemKind::Trinav => "TRINAV",
            NavSystemKind::Spn => "SPN",
        }
    }

    /// System labels a vessel running this navigation system usually logs.
    pub fn default_systems(&self) -> [&'static str; 4] {
        match self {
            NavSystemKind::Trinav => ["FU1G4_XX", "FU1XP_XX", "FU2G4_XX", "FU2XP_XX"],
            NavSystemKind::Spn => ["COR_SP1_XP_A", "COR_SP1_G4_A", "COR_NG_XP_B", "COR_NG_G4_B"],
        }
    }

    /// Substrings identifying heading (gyro) columns.
    pub fn heading_markers(&self) -> &'static [&'static str] {
        match self {
            NavSystemKind::Trinav => &["Gyro", "gyro"],
            NavSystemKind::Spn => &["THDG"],
        }
    }
}

impl fmt::Display for NavSystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for NavSystemKind {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trinav" => Ok(NavSystemKind::Trinav),
            "spn" => Ok(NavSystemKind::Spn),
            other => Err(format!("unknown navigation system '{other}'")),
        }
    }
}

impl FromStr for NavSystemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NavSystemKind::try_from(s)
    }
}

/// Post-processed reference positions (one row per epoch).
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub df: DataFrame,
}

impl ReferenceData {
    pub fn height(&self) -> usize {
        self.df.height()
    }
}

/// Latitude/longitude column pair belonging to one positioning system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemColumns {
    pub latitude: String,
    pub longitude: String,
}

/// A navigation log with decimal-degree positions and a derived time key.
#[derive(Debug, Clone)]
pub struct NavigationLog {
    pub kind: NavSystemKind,
    pub df: DataFrame,
    pub time_column: String,
    pub heading_columns: Vec<String>,
    pub position_columns: Vec<String>,
}

impl NavigationLog {
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn system_columns(&self, system: &str) -> Option<SystemColumns> {
        let names = self.column_names();
        let latitude = find_system_column(&names, system, &LATITUDE_MARKERS)?;
        let longitude = find_system_column(&names, system, &LONGITUDE_MARKERS)?;
        Some(SystemColumns {
            latitude,
            longitude,
        })
    }

    /// Best-effort list of system labels, taken from the latitude column names.
    pub fn detected_systems(&self) -> Vec<String> {
        let mut systems: Vec<String> = Vec::new();
        for column in &self.position_columns {
            let Some((start, marker)) = LATITUDE_MARKERS
                .iter()
                .filter_map(|marker| column.find(marker).map(|idx| (idx, *marker)))
                .min_by_key(|(idx, _)| *idx)
            else {
                continue;
            };

            let trim = |s: &str| {
                s.trim_matches(|c: char| c.is_whitespace() || matches!(c, '_' | '-' | ':' | '.'))
                    .to_string()
            };
            let prefix = trim(&column[..start]);
            let label = if prefix.is_empty() {
                // "Latitude FU1" style: skip the rest of the word first
                trim(column[start + marker.len()..].trim_start_matches(|c: char| c.is_ascii_lowercase()))
            } else {
                prefix
            };

            if !label.is_empty() && !systems.contains(&label) {
                systems.push(label);
            }
        }
        systems
    }
}
