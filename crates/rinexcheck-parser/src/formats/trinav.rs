use crate::errors::ParserError;
use crate::model::{NavSystemKind, NavigationLog};
use crate::registry::NavLogParser;

use super::common::read_delimited;
use super::navigation::build_navigation_log;
use super::schema::TRINAV_TIME_COLUMN;

/// TRINAV/QCPR export. `Time` holds GPS seconds since the GPS epoch.
pub struct TrinavParser;

impl Default for TrinavParser {
    fn default() -> Self {
        Self
    }
}

impl TrinavParser {
    const NAME: &'static str = "TRINAV";
}

impl NavLogParser for TrinavParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> NavSystemKind {
        NavSystemKind::Trinav
    }

    fn parse(&self, content: &str) -> Result<NavigationLog, ParserError> {
        let table = read_delimited(Self::NAME, content)?;
        let time_idx =
            table
                .position(TRINAV_TIME_COLUMN)
                .ok_or_else(|| ParserError::FormatMismatch {
                    format: Self::NAME,
                    reason: format!("no '{TRINAV_TIME_COLUMN}' column in header"),
                })?;
        build_navigation_log(Self::NAME, self.kind(), &table, time_idx)
    }
}
