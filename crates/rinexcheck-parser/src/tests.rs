use std::fs;
use std::path::PathBuf;

use crate::errors::ParserError;
use crate::formats::schema::{DAY_SECONDS, GPS_TIME, REFERENCE_LATITUDE, REFERENCE_YEAR};
use crate::formats::{
    day_seconds_from_decimal_hour, dms_to_decimal, find_column, find_system_column,
    parse_reference_file, SpnParser, TrinavParser,
};
use crate::model::{NavSystemKind, SystemColumns};
use crate::{parse_navigation_log, parse_with_parsers};
use crate::registry::NavLogParser;

fn fixture(path: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read_to_string(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn dms_with_spaces_and_hemisphere() {
    assert_close(dms_to_decimal("58 30 00.000N").unwrap(), 58.5);
    assert_close(dms_to_decimal("001 15 36.000E").unwrap(), 1.26);
}

#[test]
fn dms_spn_colon_notation() {
    assert_close(dms_to_decimal("58:30:00.000N").unwrap(), 58.5);
    assert_close(dms_to_decimal("001:15:00.000W").unwrap(), -1.25);
}

#[test]
fn dms_southern_and_western_are_negative() {
    assert_close(dms_to_decimal("33 52 30S").unwrap(), -33.875);
    assert_close(dms_to_decimal("70 30 W").unwrap(), -70.5);
    assert_close(dms_to_decimal("-12 30 00").unwrap(), -12.5);
}

#[test]
fn dms_degrees_and_decimal_minutes() {
    assert_close(dms_to_decimal("58 30.6 N").unwrap(), 58.51);
}

#[test]
fn dms_passes_decimal_degrees_through() {
    assert_close(dms_to_decimal("58.123456").unwrap(), 58.123456);
    assert_close(dms_to_decimal("3.5W").unwrap(), -3.5);
    assert_close(dms_to_decimal("-1.5e-3").unwrap(), -0.0015);
}

#[test]
fn dms_rejects_text() {
    assert!(dms_to_decimal("").is_none());
    assert!(dms_to_decimal("Platform A").is_none());
    assert!(dms_to_decimal("1 2 3 4 5").is_none());
}

#[test]
fn decimal_hour_rounds_to_tenth_then_truncates() {
    assert_eq!(day_seconds_from_decimal_hour(10.0), 36_000);
    assert_eq!(day_seconds_from_decimal_hour(9.9994444), 35_998);
    assert_eq!(day_seconds_from_decimal_hour(10.0002778), 36_001);
    // 0.2222 h = 799.92 s -> 799.9 -> 799
    assert_eq!(day_seconds_from_decimal_hour(0.2222), 799);
    // 9.001375 h is 32404.949999999997 s, which rounds to 32404.9
    assert_eq!(day_seconds_from_decimal_hour(9.001375), 32_404);
}

#[test]
fn system_column_lookup_takes_last_match() {
    let names = [
        "Time",
        "FU1G4_XX Lat",
        "FU1G4_XX Lon",
        "FU1G4_XX Latitude",
        "FU2G4_XX Lat",
    ];
    assert_eq!(
        find_system_column(&names, "FU1G4_XX", &["LAT", "lat", "Lat"]),
        Some("FU1G4_XX Latitude".to_string())
    );
    assert_eq!(
        find_system_column(&names, "FU1G4_XX", &["LON", "lon", "Lon"]),
        Some("FU1G4_XX Lon".to_string())
    );
    assert_eq!(find_system_column(&names, "FU9", &["Lat"]), None);
    assert_eq!(find_column(&names, &["Time"]), Some("Time".to_string()));
}

#[test]
fn parses_reference_file() {
    let reference = parse_reference_file(&fixture("reference_fu1g4.csv")).expect("reference parse");

    assert_eq!(reference.height(), 8);
    let latitude = reference.df.column(REFERENCE_LATITUDE).unwrap().f64().unwrap();
    assert_close(latitude.get(0).unwrap(), 58.500001);

    let year = reference.df.column(REFERENCE_YEAR).unwrap().i64().unwrap();
    assert_eq!(year.get(0), Some(2023));

    let keys: Vec<i64> = reference
        .df
        .column(DAY_SECONDS)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(keys, (35_998..=36_005).collect::<Vec<_>>());

    // untyped extra columns are inferred
    assert!(reference.df.column("rcvr_clk_ns").unwrap().f64().is_ok());
}

#[test]
fn reference_requires_position_columns() {
    let content = "decimal_hour, day_of_year, year\n10.0, 45, 2023\n";
    match parse_reference_file(content) {
        Err(ParserError::MissingColumn { column, .. }) => {
            assert_eq!(column, "latitude_decimal_degree")
        }
        other => panic!("expected missing column error, got {other:?}"),
    }
}

#[test]
fn reference_header_only_is_empty() {
    let content = fixture("reference_fu1g4.csv");
    let header_only = content.lines().take(1).collect::<Vec<_>>().join("\n") + "\n";
    assert!(matches!(
        parse_reference_file(&header_only),
        Err(ParserError::EmptyData { .. })
    ));
}

#[test]
fn reference_rejects_non_numeric_latitude() {
    let content = "latitude_decimal_degree,longitude_decimal_degree,decimal_hour,day_of_year,year\n\
                   abc,1.0,10.0,45,2023\n";
    assert!(matches!(
        parse_reference_file(content),
        Err(ParserError::DataRow { .. })
    ));
}

#[test]
fn parses_trinav_log_with_trailing_commas() {
    let log = TrinavParser
        .parse(&fixture("trinav_qcpr.csv"))
        .expect("TRINAV parse failed");

    assert_eq!(log.kind, NavSystemKind::Trinav);
    assert_eq!(log.time_column, "Time");
    assert_eq!(log.df.height(), 10);
    assert_eq!(
        log.heading_columns,
        vec!["Gyro1 Heading".to_string(), "Gyro2 Heading".to_string()]
    );

    let names = log.column_names();
    assert!(names.iter().all(|name| !name.is_empty() && !name.contains(',')));
    assert!(names.contains(&GPS_TIME.to_string()));

    let lat = log.df.column("FU1G4_XX Lat").unwrap().f64().unwrap();
    assert_close(lat.get(0).unwrap(), 58.5);
    let lon = log.df.column("FU1XP_XX Lon").unwrap().f64().unwrap();
    assert_close(lon.get(0).unwrap(), 1.0 + 14.0 / 60.0 + 59.964 / 3600.0);

    let gyro = log.df.column("Gyro2 Heading").unwrap().f64().unwrap();
    assert_close(gyro.get(9).unwrap(), 124.5);

    let keys: Vec<i64> = log
        .df
        .column(DAY_SECONDS)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(keys, (36_000..36_010).collect::<Vec<_>>());
}

#[test]
fn trinav_system_columns_and_detected_systems() {
    let log = TrinavParser.parse(&fixture("trinav_qcpr.csv")).unwrap();

    assert_eq!(
        log.system_columns("FU1XP_XX"),
        Some(SystemColumns {
            latitude: "FU1XP_XX Lat".to_string(),
            longitude: "FU1XP_XX Lon".to_string(),
        })
    );
    assert!(log.system_columns("FU2G4_XX").is_none());
    assert_eq!(
        log.detected_systems(),
        vec!["FU1G4_XX".to_string(), "FU1XP_XX".to_string()]
    );
}

#[test]
fn parses_spn_log() {
    let log = SpnParser.parse(&fixture("spn_log.csv")).expect("SPN parse failed");

    assert_eq!(log.kind, NavSystemKind::Spn);
    assert_eq!(log.time_column, "GPSTIME");
    assert_eq!(log.heading_columns, vec!["THDG".to_string()]);

    let lon = log.df.column("COR_NG_XP_B LON").unwrap().f64().unwrap();
    assert_close(lon.get(0).unwrap(), -1.25);

    // seconds into the GPS week fold onto the same day key
    let keys = log.df.column(DAY_SECONDS).unwrap().i64().unwrap();
    assert_eq!(keys.get(0), Some(36_000));
    assert_eq!(keys.get(5), Some(36_005));
}

#[test]
fn trinav_rejects_spn_header() {
    match TrinavParser.parse(&fixture("spn_log.csv")) {
        Err(ParserError::FormatMismatch { format, .. }) => assert_eq!(format, "TRINAV"),
        other => panic!("expected format mismatch, got {other:?}"),
    }
}

#[test]
fn registry_detects_format() {
    let trinav = parse_navigation_log(&fixture("trinav_qcpr.csv"), None).unwrap();
    assert_eq!(trinav.kind, NavSystemKind::Trinav);

    let spn = parse_navigation_log(&fixture("spn_log.csv"), None).unwrap();
    assert_eq!(spn.kind, NavSystemKind::Spn);
}

#[test]
fn registry_honours_requested_kind() {
    let err = parse_navigation_log(&fixture("trinav_qcpr.csv"), Some(NavSystemKind::Spn))
        .expect_err("SPN parser must not accept a TRINAV file");
    match err {
        ParserError::NoMatchingParser { attempts } => {
            assert_eq!(attempts.len(), 1);
            assert_eq!(attempts[0].format, "SPN");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn custom_parser_list_stops_at_broken_data() {
    // the SPN header matches, so a bad time is an error rather than a mismatch
    let content = "GPSTIME,COR_NG_XP_B LAT,COR_NG_XP_B LON\nsoon,58:30:00.000N,001:15:00.000W\n";
    let parsers: [&dyn NavLogParser; 2] = [&TrinavParser, &SpnParser];
    match parse_with_parsers(content, &parsers) {
        Err(ParserError::DataRow { format, .. }) => assert_eq!(format, "SPN"),
        other => panic!("expected a data row error, got {other:?}"),
    }
}

#[test]
fn registry_reports_all_attempts() {
    let err = parse_navigation_log("Easting, Northing\n1.0, 2.0\n", None).unwrap_err();
    match err {
        ParserError::NoMatchingParser { ref attempts } => {
            let names: Vec<_> = attempts.iter().map(|a| a.format).collect();
            assert_eq!(names, vec!["TRINAV", "SPN"]);
            assert!(err.to_string().starts_with("navigation log format not recognised: TRINAV ("));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn navigation_rows_with_too_many_fields_fail() {
    let content = "Time, FU1G4_XX Lat, FU1G4_XX Lon\n1360404000, 58 30 00N, 001 15 00E, 7, 8\n";
    assert!(matches!(
        TrinavParser.parse(content),
        Err(ParserError::DataRow { .. })
    ));
}

#[test]
fn navigation_skips_blank_lines_and_pads_short_rows() {
    let content = "Time, FU1G4_XX Lat, FU1G4_XX Lon, Gyro\n\n1360404000, 58 30 00N\n1360404001, 58 30 00N, 001 15 00E, 12.0\n";
    let log = TrinavParser.parse(content).unwrap();
    assert_eq!(log.df.height(), 2);
    let lon = log.df.column("FU1G4_XX Lon").unwrap().f64().unwrap();
    assert!(lon.get(0).is_none());
    let gyro = log.df.column("Gyro").unwrap().f64().unwrap();
    assert!(gyro.get(0).is_none());
    assert_close(gyro.get(1).unwrap(), 12.0);
}

#[test]
fn non_angle_position_column_is_kept_as_text() {
    let content = "Time, Platform, FU1G4_XX Lat\n1360404000, alpha, 58 30 00N\n";
    let log = TrinavParser.parse(content).unwrap();
    assert!(log.df.column("Platform").unwrap().str().is_ok());
    assert_eq!(log.position_columns, vec!["FU1G4_XX Lat".to_string()]);
}

#[test]
fn text_gyro_column_is_not_a_heading() {
    let content = "Time, FU1G4_XX Lat, FU1G4_XX Lon, Gyro Status, Gyro1\n1360404000, 58 30 00N, 001 15 00E, OK, 12.0\n";
    let log = TrinavParser.parse(content).unwrap();
    assert_eq!(log.heading_columns, vec!["Gyro1".to_string()]);
    assert_eq!(
        log.df.column("Gyro Status").unwrap().str().unwrap().get(0),
        Some("OK")
    );
}

#[test]
fn derived_column_names_are_reserved() {
    for reserved in [GPS_TIME, DAY_SECONDS] {
        let content = format!("Time, FU1G4_XX Lat, {reserved}\n1360404000, 58 30 00N, 5\n");
        match TrinavParser.parse(&content) {
            Err(ParserError::InvalidHeader { message, .. }) => assert!(message.contains(reserved)),
            other => panic!("expected invalid header, got {other:?}"),
        }
    }
}

#[test]
fn duplicate_headers_are_rejected() {
    let content = "Time, Gyro, Gyro\n1, 2, 3\n";
    assert!(matches!(
        TrinavParser.parse(content),
        Err(ParserError::InvalidHeader { .. })
    ));
}

#[test]
fn kind_round_trips_through_str() {
    for kind in NavSystemKind::ALL {
        assert_eq!(NavSystemKind::try_from(kind.as_str()).unwrap(), kind);
    }
    assert_eq!("spn".parse::<NavSystemKind>().unwrap(), NavSystemKind::Spn);
    assert!(NavSystemKind::try_from("gnss").is_err());
    assert_eq!(NavSystemKind::Spn.default_systems()[2], "COR_NG_XP_B");
}
