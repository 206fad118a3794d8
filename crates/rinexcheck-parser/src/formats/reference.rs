use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::ReferenceData;

use super::common::{
    build_frame, day_seconds_from_decimal_hour, infer_column, parse_required_f64,
    parse_required_i64, read_delimited, DelimitedTable,
};
use super::schema::{
    DAY_SECONDS, REFERENCE_DECIMAL_HOUR, REFERENCE_FLOAT_COLUMNS, REFERENCE_INTEGER_COLUMNS,
};

/// Post-processed position export (CSRS-PPP style CSV, one epoch per row).
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceCsvParser;

impl ReferenceCsvParser {
    pub const NAME: &'static str = "PPP_REFERENCE_CSV";

    pub fn parse(&self, content: &str) -> Result<ReferenceData, ParserError> {
        let table = read_delimited(Self::NAME, content)?;

        for required in REFERENCE_FLOAT_COLUMNS
            .iter()
            .chain(REFERENCE_INTEGER_COLUMNS.iter())
        {
            if table.position(required).is_none() {
                return Err(ParserError::MissingColumn {
                    format: Self::NAME,
                    column: (*required).to_string(),
                });
            }
        }

        if table.is_empty() {
            return Err(ParserError::EmptyData { format: Self::NAME });
        }

        let mut columns: Vec<Column> = Vec::with_capacity(table.headers.len() + 1);
        for (idx, header) in table.headers.iter().enumerate() {
            let column = if REFERENCE_FLOAT_COLUMNS.contains(&header.as_str()) {
                Self::float_column(&table, idx, header)?
            } else if REFERENCE_INTEGER_COLUMNS.contains(&header.as_str()) {
                Self::integer_column(&table, idx, header)?
            } else {
                infer_column(header, &table.values(idx))
            };
            columns.push(column);
        }

        let decimal_hour_idx = table
            .position(REFERENCE_DECIMAL_HOUR)
            .ok_or_else(|| ParserError::MissingColumn {
                format: Self::NAME,
                column: REFERENCE_DECIMAL_HOUR.to_string(),
            })?;
        let day_seconds = table
            .rows
            .iter()
            .map(|row| {
                parse_required_f64(
                    Self::NAME,
                    &row.fields[decimal_hour_idx],
                    row.line_index,
                    REFERENCE_DECIMAL_HOUR,
                )
                .map(day_seconds_from_decimal_hour)
            })
            .collect::<Result<Vec<i64>, _>>()?;
        columns.push(Series::new(DAY_SECONDS.into(), day_seconds).into());

        let df = build_frame(Self::NAME, columns)?;
        Ok(ReferenceData { df })
    }

    fn float_column(
        table: &DelimitedTable,
        idx: usize,
        header: &str,
    ) -> Result<Column, ParserError> {
        let values = table
            .rows
            .iter()
            .map(|row| parse_required_f64(Self::NAME, &row.fields[idx], row.line_index, header))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(Series::new(header.into(), values).into())
    }

    fn integer_column(
        table: &DelimitedTable,
        idx: usize,
        header: &str,
    ) -> Result<Column, ParserError> {
        let values = table
            .rows
            .iter()
            .map(|row| parse_required_i64(Self::NAME, &row.fields[idx], row.line_index, header))
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(Series::new(header.into(), values).into())
    }
}

pub fn parse_reference_file(content: &str) -> Result<ReferenceData, ParserError> {
    ReferenceCsvParser.parse(content)
}
