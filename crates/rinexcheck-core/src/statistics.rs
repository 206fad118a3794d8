use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;

/// Descriptive statistics of one difference column, nulls and NaNs skipped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffStatistics {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl DiffStatistics {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std: None,
                min: None,
                p25: None,
                median: None,
                p75: None,
                max: None,
            };
        }

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let sum_sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        });

        Self {
            count,
            mean: Some(mean),
            std,
            min: sorted.first().copied(),
            p25: Some(percentile(&sorted, 0.25)),
            median: Some(percentile(&sorted, 0.5)),
            p75: Some(percentile(&sorted, 0.75)),
            max: sorted.last().copied(),
        }
    }

    pub fn from_column(df: &DataFrame, column: &str) -> Result<Self> {
        let values: Vec<f64> = df.column(column)?.f64()?.into_iter().flatten().collect();
        Ok(Self::from_values(&values))
    }

    pub fn get(&self, stat: Stat) -> Option<f64> {
        match stat {
            Stat::Max => self.max,
            Stat::Min => self.min,
            Stat::Mean => self.mean,
            Stat::StdDev => self.std,
            Stat::Count => Some(self.count as f64),
        }
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SystemStatistics {
    pub lat: DiffStatistics,
    pub lon: DiffStatistics,
}

impl SystemStatistics {
    pub fn from_frame(df: &DataFrame, lat_column: &str, lon_column: &str) -> Result<Self> {
        Ok(Self {
            lat: DiffStatistics::from_column(df, lat_column)?,
            lon: DiffStatistics::from_column(df, lon_column)?,
        })
    }

    /// Rows of the report statistics table: label, lat cell, lon cell.
    pub fn table_rows(&self) -> Vec<[String; 3]> {
        Stat::ALL
            .iter()
            .map(|stat| {
                [
                    stat.label().to_string(),
                    stat.format(self.lat.get(*stat)),
                    stat.format(self.lon.get(*stat)),
                ]
            })
            .collect()
    }
}

/// Statistics shown in the report, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Max,
    Min,
    Mean,
    StdDev,
    Count,
}

impl Stat {
    pub const ALL: [Stat; 5] = [Stat::Max, Stat::Min, Stat::Mean, Stat::StdDev, Stat::Count];

    pub fn label(&self) -> &'static str {
        match self {
            Stat::Max => "Max",
            Stat::Min => "Min",
            Stat::Mean => "Mean",
            Stat::StdDev => "Std Dev",
            Stat::Count => "# of obs",
        }
    }

    pub fn format(&self, value: Option<f64>) -> String {
        match (self, value) {
            (_, None) => "-".to_string(),
            (Stat::Count, Some(value)) => format!("{value:.0}"),
            (_, Some(value)) => format!("{value:.4}"),
        }
    }
}
