use polars::prelude::*;
use rinexcheck_parser::schema::{
    GPS_TIME, LATITUDE_MARKERS, LONGITUDE_MARKERS, REFERENCE_LATITUDE, REFERENCE_LONGITUDE,
};
use rinexcheck_parser::{find_system_column, SystemColumns};

use crate::error::{PipelineError, Result};
use crate::geodesy::ScaleFactors;
use crate::gps_time::format_hhmm;

pub const TIME_LABEL: &str = "time_hhmm";

pub fn lat_diff_column(system: &str) -> String {
    format!("{system}_lat_diff")
}

pub fn lon_diff_column(system: &str) -> String {
    format!("{system}_lon_diff")
}

/// Navigation columns holding a system's position, by name matching.
pub fn resolve_system_columns<S: AsRef<str>>(
    navigation_columns: &[S],
    system: &str,
) -> Result<SystemColumns> {
    let latitude = find_system_column(navigation_columns, system, &LATITUDE_MARKERS).ok_or_else(
        || PipelineError::ColumnNotFound {
            system: system.to_string(),
            axis: "latitude",
        },
    )?;
    let longitude = find_system_column(navigation_columns, system, &LONGITUDE_MARKERS)
        .ok_or_else(|| PipelineError::ColumnNotFound {
            system: system.to_string(),
            axis: "longitude",
        })?;
    Ok(SystemColumns {
        latitude,
        longitude,
    })
}

/// Appends `{system}_lat_diff` / `{system}_lon_diff` in metres (reference
/// minus navigation) and an `HH:MM` label of each row's GPS time.
pub fn apply_differences(
    df: &DataFrame,
    system: &str,
    columns: &SystemColumns,
    scale: &ScaleFactors,
) -> Result<DataFrame> {
    let len = df.height();

    let ref_lat = df.column(REFERENCE_LATITUDE)?.f64()?;
    let ref_lon = df.column(REFERENCE_LONGITUDE)?.f64()?;
    let nav_lat = float_column(df, &columns.latitude, system, "latitude")?;
    let nav_lon = float_column(df, &columns.longitude, system, "longitude")?;
    let gps_time = df.column(GPS_TIME)?.f64()?;

    let mut lat_diff = Vec::with_capacity(len);
    let mut lon_diff = Vec::with_capacity(len);
    let mut labels: Vec<Option<String>> = Vec::with_capacity(len);

    for idx in 0..len {
        lat_diff.push(difference(ref_lat.get(idx), nav_lat.get(idx)).map(|d| scale.lat_metres(d)));
        lon_diff.push(difference(ref_lon.get(idx), nav_lon.get(idx)).map(|d| scale.lon_metres(d)));
        labels.push(gps_time.get(idx).and_then(format_hhmm));
    }

    let mut output = df.clone();
    output.hstack_mut(&mut [
        Series::new(lat_diff_column(system).into(), lat_diff).into(),
        Series::new(lon_diff_column(system).into(), lon_diff).into(),
        Series::new(TIME_LABEL.into(), labels).into(),
    ])?;

    Ok(output)
}

fn difference(reference: Option<f64>, navigation: Option<f64>) -> Option<f64> {
    Some(reference? - navigation?)
}

fn float_column<'a>(
    df: &'a DataFrame,
    name: &str,
    system: &str,
    axis: &'static str,
) -> Result<&'a Float64Chunked> {
    let column = df.column(name).map_err(|_| PipelineError::ColumnNotFound {
        system: system.to_string(),
        axis,
    })?;
    column.f64().map_err(|_| {
        PipelineError::Validation(format!(
            "column '{name}' of system '{system}' does not hold angles"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged() -> DataFrame {
        df!(
            REFERENCE_LATITUDE => &[58.500001f64, 58.5],
            REFERENCE_LONGITUDE => &[1.25f64, 1.25],
            "SYS1 Lat" => &[Some(58.5f64), None],
            "SYS1 Lon" => &[Some(1.250002f64), Some(1.25)],
            GPS_TIME => &[1_360_404_000.0f64, 1_360_404_060.0],
        )
        .unwrap()
    }

    #[test]
    fn resolves_columns_or_reports_axis() {
        let names = ["Time", "SYS1 Lat", "SYS1 Lon", "SYS2 Lat"];
        let columns = resolve_system_columns(&names, "SYS1").unwrap();
        assert_eq!(columns.latitude, "SYS1 Lat");

        match resolve_system_columns(&names, "SYS2") {
            Err(PipelineError::ColumnNotFound { system, axis }) => {
                assert_eq!(system, "SYS2");
                assert_eq!(axis, "longitude");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn differences_in_metres() {
        let df = merged();
        let scale = ScaleFactors::at_latitude(58.5);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let columns = resolve_system_columns(&names, "SYS1").unwrap();
        let out = apply_differences(&df, "SYS1", &columns, &scale).unwrap();

        let lat = out.column("SYS1_lat_diff").unwrap().f64().unwrap();
        let expected = (58.500001 - 58.5) * scale.lat_m_per_deg;
        assert!((lat.get(0).unwrap() - expected).abs() < 1e-9);
        assert!(lat.get(1).is_none());

        let lon = out.column("SYS1_lon_diff").unwrap().f64().unwrap();
        assert!(lon.get(0).unwrap() < 0.0);
        assert_eq!(lon.get(1), Some(0.0));

        let labels = out.column(TIME_LABEL).unwrap().str().unwrap();
        assert_eq!(labels.get(0), Some("10:00"));
        assert_eq!(labels.get(1), Some("10:01"));
    }
}
