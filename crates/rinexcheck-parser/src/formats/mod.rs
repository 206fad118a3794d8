mod common;
mod navigation;
mod reference;
pub mod schema;
mod spn;
mod trinav;

pub use common::{day_seconds_from_decimal_hour, dms_to_decimal, find_column, find_system_column};
pub use reference::{parse_reference_file, ReferenceCsvParser};
pub use spn::SpnParser;
pub use trinav::TrinavParser;

