//! SVG time-series charts for the report.

use std::ops::Range;
use std::panic;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::{ChunkAgg, DataFrame};
use rinexcheck_parser::schema::GPS_TIME;

use crate::config::PlotSettings;
use crate::differences::{lat_diff_column, lon_diff_column};
use crate::error::{PipelineError, Result};
use crate::gps_time::format_hhmm;

const LAT_COLOR: RGBColor = RGBColor(220, 20, 20);
const LON_COLOR: RGBColor = RGBColor(20, 60, 220);
const HEADING_COLORS: [RGBColor; 6] = [
    RGBColor(20, 60, 220),
    RGBColor(230, 120, 0),
    RGBColor(30, 150, 50),
    RGBColor(200, 0, 100),
    RGBColor(110, 70, 170),
    RGBColor(60, 60, 60),
];

/// Margin added above and below the heading values, in degrees.
const HEADING_MARGIN_DEG: f64 = 10.0;

struct ChartLine {
    label: String,
    color: RGBColor,
    points: Vec<(f64, f64)>,
}

struct TimeChart<'a> {
    title: String,
    y_desc: &'a str,
    y_range: Range<f64>,
    /// GPS time of x = 0.
    origin_gps: f64,
    x_max: f64,
    lines: Vec<ChartLine>,
}

pub fn difference_plot_path(dir: &Path, system: &str) -> PathBuf {
    dir.join(format!("{system}.svg"))
}

pub fn heading_plot_path(dir: &Path) -> PathBuf {
    dir.join("gyros.svg")
}

/// Latitude and longitude differences of one system against time.
pub fn render_difference_plot(
    df: &DataFrame,
    system: &str,
    path: &Path,
    settings: &PlotSettings,
) -> Result<()> {
    let origin_gps = time_origin(df)?;
    let lines = vec![
        ChartLine {
            label: "Lat diff [m]".to_string(),
            color: LAT_COLOR,
            points: time_points(df, &lat_diff_column(system), origin_gps)?,
        },
        ChartLine {
            label: "Lon diff [m]".to_string(),
            color: LON_COLOR,
            points: time_points(df, &lon_diff_column(system), origin_gps)?,
        },
    ];

    let limit = settings.diff_limit_m;
    let chart = TimeChart {
        title: format!("{system} - Difference between RINEX processed and NAVIGATION logged"),
        y_desc: "Difference [m]",
        y_range: -limit..limit,
        origin_gps,
        x_max: x_extent(&lines),
        lines,
    };
    render_svg(path, (settings.width, settings.height), &chart)
}

/// Every heading column of the navigation log against time.
pub fn render_heading_plot(
    df: &DataFrame,
    heading_columns: &[String],
    path: &Path,
    settings: &PlotSettings,
) -> Result<()> {
    let origin_gps = time_origin(df)?;
    let mut lines = Vec::with_capacity(heading_columns.len());
    for (idx, column) in heading_columns.iter().enumerate() {
        lines.push(ChartLine {
            label: column.clone(),
            color: HEADING_COLORS[idx % HEADING_COLORS.len()],
            points: time_points(df, column, origin_gps)?,
        });
    }

    let y_range = heading_range(lines.iter().flat_map(|line| line.points.iter().map(|p| p.1)))
        .ok_or_else(|| PipelineError::Plot("no heading values to plot".to_string()))?;

    let chart = TimeChart {
        title: "Gyro heading".to_string(),
        y_desc: "Bearing [°]",
        y_range,
        origin_gps,
        x_max: x_extent(&lines),
        lines,
    };
    render_svg(path, (settings.width, settings.height), &chart)
}

/// `[min - 10, max + 10]` over all finite values.
pub fn heading_range(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })?;
    Some((min - HEADING_MARGIN_DEG)..(max + HEADING_MARGIN_DEG))
}

fn time_origin(df: &DataFrame) -> Result<f64> {
    df.column(GPS_TIME)?
        .f64()?
        .min()
        .ok_or_else(|| PipelineError::Plot("no epochs to plot".to_string()))
}

/// `(seconds since origin, value)` for rows where both are present.
fn time_points(df: &DataFrame, column: &str, origin_gps: f64) -> Result<Vec<(f64, f64)>> {
    let times = df.column(GPS_TIME)?.f64()?;
    let values = df.column(column)?.f64()?;
    Ok(times
        .into_iter()
        .zip(values)
        .filter_map(|(time, value)| Some((time? - origin_gps, value?)))
        .filter(|(_, value)| value.is_finite())
        .collect())
}

/// Splits a line wherever it leaves `y_range`. plotters pins points outside
/// the axis to the frame edge, so out-of-range values are left undrawn.
fn in_range_runs(points: &[(f64, f64)], y_range: &Range<f64>) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        if y >= y_range.start && y <= y_range.end {
            current.push((x, y));
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn x_extent(lines: &[ChartLine]) -> f64 {
    lines
        .iter()
        .flat_map(|line| line.points.iter().map(|p| p.0))
        .fold(0.0, f64::max)
        .max(1.0)
}

fn render_svg(path: &Path, size: (u32, u32), chart: &TimeChart<'_>) -> Result<()> {
    let render = || -> anyhow::Result<()> {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_time_chart(root, chart)
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| PipelineError::Plot("plotting backend panicked".to_string()))?
        .map_err(|err| PipelineError::Plot(format!("{}: {err}", path.display())))
}

fn draw_time_chart<DB>(area: DrawingArea<DB, Shift>, layout: &TimeChart<'_>) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&area)
        .caption(&layout.title, ("sans-serif", 20))
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..layout.x_max, layout.y_range.clone())?;

    let origin = layout.origin_gps;
    let time_label = |seconds: &f64| format_hhmm(origin + seconds).unwrap_or_default();
    chart
        .configure_mesh()
        .x_desc("Time [hh:mm]")
        .y_desc(layout.y_desc)
        .x_label_formatter(&time_label)
        .y_label_formatter(&|v| format!("{v:.2}"))
        .draw()?;

    for line in &layout.lines {
        let color = line.color;
        let mut runs = in_range_runs(&line.points, &layout.y_range).into_iter();
        let first = runs.next().unwrap_or_default();
        chart
            .draw_series(LineSeries::new(first, color))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        for run in runs {
            chart.draw_series(LineSeries::new(run, color))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    area.present()?;
    Ok(())
}
