use polars::prelude::*;
use rinexcheck_parser::schema::REFERENCE_LATITUDE;
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// WGS84 ellipsoid semi-major axis (m)
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Metres per degree of latitude and longitude around a mean latitude.
///
/// This is a flat local approximation: it is only meant for the sub-metre
/// differences between two position streams of the same antenna.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleFactors {
    pub mean_latitude_deg: f64,
    pub lat_m_per_deg: f64,
    pub lon_m_per_deg: f64,
}

impl ScaleFactors {
    pub fn at_latitude(mean_latitude_deg: f64) -> Self {
        let f = WGS84_FLATTENING;
        let phi = mean_latitude_deg.to_radians();

        // second eccentricity squared
        let second_ecc_sq = f * (2.0 + f) / (1.0 - f).powi(2);
        let v2 = 1.0 + second_ecc_sq.powi(2) * phi.cos();
        // polar radius of curvature
        let c = WGS84_SEMI_MAJOR_AXIS_M / (1.0 - f);

        let lat_m_per_deg = c * std::f64::consts::PI / v2.powf(1.5) / 180.0;
        let lon_m_per_deg = lat_m_per_deg * phi.cos();

        Self {
            mean_latitude_deg,
            lat_m_per_deg,
            lon_m_per_deg,
        }
    }

    /// Scale factors at the mean reference latitude of a merged table.
    pub fn from_mean_latitude(df: &DataFrame) -> Result<Self> {
        let mean = df
            .column(REFERENCE_LATITUDE)?
            .f64()?
            .mean()
            .filter(|mean| mean.is_finite())
            .ok_or_else(|| {
                PipelineError::Validation(format!(
                    "cannot compute a mean of '{REFERENCE_LATITUDE}' without values"
                ))
            })?;
        Ok(Self::at_latitude(mean))
    }

    pub fn lat_metres(&self, degrees: f64) -> f64 {
        degrees * self.lat_m_per_deg
    }

    pub fn lon_metres(&self, degrees: f64) -> f64 {
        degrees * self.lon_m_per_deg
    }
}
