use std::collections::HashSet;
use std::num::ParseFloatError;

use csv::{ReaderBuilder, Trim};
use polars::prelude::*;

use crate::errors::ParserError;
use crate::formats::schema::SECONDS_PER_HOUR;

/// Rows of a comma separated log with whitespace-tolerant fields.
#[derive(Debug, Clone)]
pub(crate) struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<DelimitedRow>,
}

#[derive(Debug, Clone)]
pub(crate) struct DelimitedRow {
    pub line_index: usize,
    pub fields: Vec<String>,
}

impl DelimitedTable {
    pub fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn values(&self, column: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.fields[column].as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads the header and data rows of a log. Separators are commas with any
/// amount of surrounding whitespace; trailing commas (as written by some
/// navigation front ends) are dropped and short rows are padded with empty
/// fields.
pub(crate) fn read_delimited(
    format: &'static str,
    content: &str,
) -> Result<DelimitedTable, ParserError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for (record_index, record) in reader.records().enumerate() {
        let record = record.map_err(|source| ParserError::Csv { format, source })?;
        let line_index = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(record_index + 1);
        let mut fields: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();

        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }

        match headers.as_ref() {
            None => {
                while fields.last().is_some_and(|f| f.is_empty()) {
                    fields.pop();
                }
                validate_headers(format, &fields)?;
                headers = Some(fields);
            }
            Some(header) => {
                while fields.len() > header.len() && fields.last().is_some_and(|f| f.is_empty()) {
                    fields.pop();
                }
                if fields.len() > header.len() {
                    return Err(ParserError::DataRow {
                        format,
                        line_index,
                        message: format!(
                            "expected {} fields but found {}",
                            header.len(),
                            fields.len()
                        ),
                    });
                }
                fields.resize(header.len(), String::new());
                rows.push(DelimitedRow { line_index, fields });
            }
        }
    }

    let headers = headers.ok_or_else(|| ParserError::FormatMismatch {
        format,
        reason: "file has no header row".to_string(),
    })?;

    Ok(DelimitedTable { headers, rows })
}

fn validate_headers(format: &'static str, headers: &[String]) -> Result<(), ParserError> {
    let mut seen = HashSet::new();
    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(ParserError::InvalidHeader {
                format,
                message: format!("column {} has an empty name", idx + 1),
            });
        }
        if !seen.insert(header.as_str()) {
            return Err(ParserError::InvalidHeader {
                format,
                message: format!("column '{header}' appears more than once"),
            });
        }
    }
    Ok(())
}

pub(crate) fn parse_float(value: &str) -> Result<Option<f64>, ParseFloatError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    trimmed.parse::<f64>().map(Some)
}

pub(crate) fn parse_optional_f64(
    format: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    parse_float(value).map_err(|err| ParserError::DataRow {
        format,
        line_index,
        message: format!("failed to parse column '{column}' as float: {err}"),
    })
}

pub(crate) fn parse_required_f64(
    format: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<f64, ParserError> {
    parse_optional_f64(format, value, line_index, column)?.ok_or_else(|| ParserError::DataRow {
        format,
        line_index,
        message: format!("column '{column}' is empty"),
    })
}

/// Integer columns are sometimes written as `2023.0`; accept those too.
pub(crate) fn parse_required_i64(
    format: &'static str,
    value: &str,
    line_index: usize,
    column: &str,
) -> Result<i64, ParserError> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(parsed);
    }
    let parsed = parse_required_f64(format, trimmed, line_index, column)?;
    if parsed.fract() != 0.0 || !parsed.is_finite() {
        return Err(ParserError::DataRow {
            format,
            line_index,
            message: format!("column '{column}' value '{trimmed}' is not an integer"),
        });
    }
    Ok(parsed as i64)
}

/// Builds an `f64` column when every non-empty value is numeric, a string
/// column otherwise.
pub(crate) fn infer_column(name: &str, values: &[&str]) -> Column {
    let floats: Result<Vec<Option<f64>>, _> = values.iter().map(|v| parse_float(v)).collect();
    match floats {
        Ok(floats) => Series::new(name.into(), floats).into(),
        Err(_) => {
            let strings: Vec<Option<&str>> = values
                .iter()
                .map(|v| if v.is_empty() { None } else { Some(*v) })
                .collect();
            Series::new(name.into(), strings).into()
        }
    }
}

pub(crate) fn build_frame(
    format: &'static str,
    columns: Vec<Column>,
) -> Result<DataFrame, ParserError> {
    DataFrame::new(columns).map_err(|err| ParserError::Validation {
        format,
        message: format!("failed to build dataframe: {err}"),
    })
}

/// Converts a degrees-minutes(-seconds) angle to signed decimal degrees.
///
/// Accepts `58 12 34.5N`, `58:12:34.5N` (SPN), `58 12.575 N`, a plain decimal
/// (`58.2096`) or a decimal with a hemisphere (`3.5W`). Southern and western
/// hemispheres, or a negative degree field, give a negative result.
pub fn dms_to_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(decimal) = trimmed.parse::<f64>() {
        return decimal.is_finite().then_some(decimal);
    }

    let mut negative = false;
    let mut spaced = String::with_capacity(trimmed.len() + 4);
    for ch in trimmed.chars() {
        match ch {
            ':' => spaced.push(' '),
            'N' | 'E' => spaced.push(' '),
            'S' | 'W' => {
                negative = true;
                spaced.push(' ');
            }
            _ => spaced.push(ch),
        }
    }

    let numbers: Vec<f64> = spaced
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .ok()?;

    let (degrees, minutes, seconds) = match numbers.as_slice() {
        [degrees] => (*degrees, 0.0, 0.0),
        [degrees, minutes] => (*degrees, *minutes, 0.0),
        [degrees, minutes, seconds] => (*degrees, *minutes, *seconds),
        _ => return None,
    };

    if degrees.is_sign_negative() {
        negative = true;
    }

    let magnitude = degrees.abs() + minutes / 60.0 + seconds / 3600.0;
    Some(if negative { -magnitude } else { magnitude })
}

/// Last column whose name contains `system` and any of `markers`.
pub fn find_system_column<S: AsRef<str>>(
    names: &[S],
    system: &str,
    markers: &[&str],
) -> Option<String> {
    names
        .iter()
        .map(|name| AsRef::<str>::as_ref(name))
        .filter(|name| name.contains(system))
        .filter(|name| markers.iter().any(|marker| name.contains(marker)))
        .last()
        .map(str::to_string)
}

/// Last column whose name contains any of `markers`.
pub fn find_column<S: AsRef<str>>(names: &[S], markers: &[&str]) -> Option<String> {
    names
        .iter()
        .map(|name| AsRef::<str>::as_ref(name))
        .filter(|name| markers.iter().any(|marker| name.contains(marker)))
        .last()
        .map(str::to_string)
}

/// Seconds into the GPS day for a decimal hour, rounded to a tenth of a
/// second and then truncated.
///
/// The tenth is taken from the decimal formatter, which rounds the exact
/// binary value once. Scaling by ten first would round twice and push values
/// such as `32404.949999999997` up to the next second.
pub fn day_seconds_from_decimal_hour(decimal_hour: f64) -> i64 {
    let seconds = decimal_hour * SECONDS_PER_HOUR;
    let tenths = format!("{seconds:.1}").parse::<f64>().unwrap_or(seconds);
    tenths.trunc() as i64
}
