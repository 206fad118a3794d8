pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::{ParserAttempt, ParserError};
pub use formats::schema;
pub use formats::{
    day_seconds_from_decimal_hour, dms_to_decimal, find_column, find_system_column,
    parse_reference_file, ReferenceCsvParser, SpnParser, TrinavParser,
};
pub use model::{NavSystemKind, NavigationLog, ReferenceData, SystemColumns};
pub use registry::{parse_navigation_log, parse_with_parsers, NavLogParser};

#[cfg(test)]
mod tests;
