use chrono::NaiveDateTime;
use polars::prelude::*;
use rinexcheck_parser::schema::{
    DAY_SECONDS, REFERENCE_DAY_OF_YEAR, REFERENCE_DECIMAL_HOUR, REFERENCE_YEAR,
};
use rinexcheck_parser::{NavigationLog, ReferenceData};
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::gps_time::{datetime_from_year_day, day_seconds_from_decimal_hour};

const REFERENCE_ROW: &str = "__reference_row";
const NAVIGATION_ROW: &str = "__navigation_row";

/// Inner join of reference and navigation rows sharing a GPS second of day.
///
/// Rows keep the reference file order; several navigation rows for the same
/// second are kept in log order.
pub fn align(reference: &ReferenceData, navigation: &NavigationLog) -> Result<DataFrame> {
    let reference_lf = reference
        .df
        .clone()
        .lazy()
        .with_row_index(REFERENCE_ROW, None);
    let navigation_lf = navigation
        .df
        .clone()
        .lazy()
        .with_row_index(NAVIGATION_ROW, None);

    let merged = reference_lf
        .join(
            navigation_lf,
            [col(DAY_SECONDS)],
            [col(DAY_SECONDS)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([REFERENCE_ROW, NAVIGATION_ROW], SortMultipleOptions::default())
        .collect()?;

    if merged.height() == 0 {
        return Err(PipelineError::NoMatchingEpochs);
    }

    Ok(merged.drop(REFERENCE_ROW)?.drop(NAVIGATION_ROW)?)
}

/// First and last epoch of a merged table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoggingPeriod {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    /// The merged rows ran from the latest to the earliest epoch.
    pub reversed: bool,
}

impl LoggingPeriod {
    /// Uses the year and day of year of the first row for both ends.
    pub fn from_merged(df: &DataFrame) -> Result<Self> {
        let height = df.height();
        if height == 0 {
            return Err(PipelineError::NoMatchingEpochs);
        }

        let year = df.column(REFERENCE_YEAR)?.i64()?.get(0);
        let day_of_year = df.column(REFERENCE_DAY_OF_YEAR)?.i64()?.get(0);
        let decimal_hour = df.column(REFERENCE_DECIMAL_HOUR)?.f64()?;
        let (Some(year), Some(day_of_year), Some(first), Some(last)) = (
            year,
            day_of_year,
            decimal_hour.get(0),
            decimal_hour.get(height - 1),
        ) else {
            return Err(PipelineError::Validation(
                "merged table is missing the epoch of its first or last row".to_string(),
            ));
        };

        let timestamp = |decimal_hour: f64| {
            datetime_from_year_day(year, day_of_year, day_seconds_from_decimal_hour(decimal_hour))
                .ok_or_else(|| {
                    PipelineError::Validation(format!(
                        "invalid epoch: year {year}, day {day_of_year}, hour {decimal_hour}"
                    ))
                })
        };
        let first = timestamp(first)?;
        let last = timestamp(last)?;

        Ok(if first > last {
            Self {
                start: last,
                stop: first,
                reversed: true,
            }
        } else {
            Self {
                start: first,
                stop: last,
                reversed: false,
            }
        })
    }
}

/// Puts a merged table in chronological order, returning its logging period.
pub fn chronological(df: DataFrame) -> Result<(DataFrame, LoggingPeriod)> {
    let period = LoggingPeriod::from_merged(&df)?;
    let df = if period.reversed { df.reverse() } else { df };
    Ok((df, period))
}
