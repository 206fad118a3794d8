use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::{NavSystemKind, NavigationLog};

use super::common::{
    build_frame, dms_to_decimal, infer_column, parse_optional_f64, parse_required_f64,
    DelimitedTable,
};
use super::schema::{is_position_column, DAY_SECONDS, GPS_TIME, SECONDS_PER_DAY};

/// Turns a delimited navigation log into a [`NavigationLog`]: positions become
/// decimal degrees, heading columns become floats and every row receives a
/// `gps_time_s` / `day_seconds` key taken from `time_idx`.
pub(crate) fn build_navigation_log(
    format: &'static str,
    kind: NavSystemKind,
    table: &DelimitedTable,
    time_idx: usize,
) -> Result<NavigationLog, ParserError> {
    if table.is_empty() {
        return Err(ParserError::EmptyData { format });
    }

    if let Some(clash) = table
        .headers
        .iter()
        .find(|header| *header == GPS_TIME || *header == DAY_SECONDS)
    {
        return Err(ParserError::InvalidHeader {
            format,
            message: format!("column '{clash}' is reserved for the derived time key"),
        });
    }

    let time_column = table.headers[time_idx].clone();
    let gps_time = table
        .rows
        .iter()
        .map(|row| parse_required_f64(format, &row.fields[time_idx], row.line_index, &time_column))
        .collect::<Result<Vec<f64>, _>>()?;
    let day_seconds: Vec<i64> = gps_time
        .iter()
        .map(|seconds| (seconds.trunc() as i64).rem_euclid(SECONDS_PER_DAY))
        .collect();

    let markers = kind.heading_markers();
    let mut heading_columns = Vec::new();
    let mut position_columns = Vec::new();
    let mut columns: Vec<Column> = Vec::with_capacity(table.headers.len() + 2);

    for (idx, header) in table.headers.iter().enumerate() {
        if idx == time_idx {
            columns.push(Series::new(header.into(), gps_time.clone()).into());
        } else if markers.iter().any(|marker| header.contains(marker)) {
            // status or text columns can carry a heading marker too
            let values = table
                .rows
                .iter()
                .map(|row| parse_optional_f64(format, &row.fields[idx], row.line_index, header))
                .collect::<Result<Vec<Option<f64>>, _>>();
            match values {
                Ok(values) => {
                    columns.push(Series::new(header.into(), values).into());
                    heading_columns.push(header.clone());
                }
                Err(_) => columns.push(infer_column(header, &table.values(idx))),
            }
        } else if is_position_column(header) {
            match angle_values(&table.values(idx)) {
                Some(values) => {
                    columns.push(Series::new(header.into(), values).into());
                    position_columns.push(header.clone());
                }
                None => columns.push(infer_column(header, &table.values(idx))),
            }
        } else {
            columns.push(infer_column(header, &table.values(idx)));
        }
    }

    columns.push(Series::new(GPS_TIME.into(), gps_time).into());
    columns.push(Series::new(DAY_SECONDS.into(), day_seconds).into());

    let df = build_frame(format, columns)?;

    Ok(NavigationLog {
        kind,
        df,
        time_column,
        heading_columns,
        position_columns,
    })
}

/// `None` as soon as one non-empty value is not an angle.
fn angle_values(values: &[&str]) -> Option<Vec<Option<f64>>> {
    values
        .iter()
        .map(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                Some(None)
            } else {
                dms_to_decimal(value).map(Some)
            }
        })
        .collect()
}
