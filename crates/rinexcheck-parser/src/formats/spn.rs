use crate::errors::ParserError;
use crate::model::{NavSystemKind, NavigationLog};
use crate::registry::NavLogParser;

use super::common::read_delimited;
use super::navigation::build_navigation_log;
use super::schema::SPN_TIME_MARKER;

/// SPN log. The column containing `GPSTIME` holds GPS seconds into the week
/// and positions are written as `dd:mm:ss.sssN`.
pub struct SpnParser;

impl Default for SpnParser {
    fn default() -> Self {
        Self
    }
}

impl SpnParser {
    const NAME: &'static str = "SPN";
}

impl NavLogParser for SpnParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn kind(&self) -> NavSystemKind {
        NavSystemKind::Spn
    }

    fn parse(&self, content: &str) -> Result<NavigationLog, ParserError> {
        let table = read_delimited(Self::NAME, content)?;
        let time_idx = table
            .headers
            .iter()
            .rposition(|header| header.contains(SPN_TIME_MARKER))
            .ok_or_else(|| ParserError::FormatMismatch {
                format: Self::NAME,
                reason: format!("no column containing '{SPN_TIME_MARKER}' in header"),
            })?;
        build_navigation_log(Self::NAME, self.kind(), &table, time_idx)
    }
}
