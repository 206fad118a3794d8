//! Column names shared between the parsers and the downstream pipeline.

pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Join key appended to both reference and navigation frames.
pub const DAY_SECONDS: &str = "day_seconds";
/// Raw GPS time of a navigation row, in seconds.
pub const GPS_TIME: &str = "gps_time_s";

pub const REFERENCE_LATITUDE: &str = "latitude_decimal_degree";
pub const REFERENCE_LONGITUDE: &str = "longitude_decimal_degree";
pub const REFERENCE_DECIMAL_HOUR: &str = "decimal_hour";
pub const REFERENCE_DAY_OF_YEAR: &str = "day_of_year";
pub const REFERENCE_YEAR: &str = "year";

pub const REFERENCE_FLOAT_COLUMNS: [&str; 3] = [
    REFERENCE_LATITUDE,
    REFERENCE_LONGITUDE,
    REFERENCE_DECIMAL_HOUR,
];
pub const REFERENCE_INTEGER_COLUMNS: [&str; 2] = [REFERENCE_DAY_OF_YEAR, REFERENCE_YEAR];

pub const LATITUDE_MARKERS: [&str; 3] = ["LAT", "lat", "Lat"];
pub const LONGITUDE_MARKERS: [&str; 3] = ["LON", "lon", "Lon"];

pub const TRINAV_TIME_COLUMN: &str = "Time";
pub const SPN_TIME_MARKER: &str = "GPSTIME";

pub fn is_position_column(name: &str) -> bool {
    LATITUDE_MARKERS
        .iter()
        .chain(LONGITUDE_MARKERS.iter())
        .any(|marker| name.contains(marker))
}
