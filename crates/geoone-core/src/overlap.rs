//! Photo spacing from camera geometry and requested overlap.
//!
//! Uses the pinhole ground-footprint model: a sensor dimension `s` behind a
//! lens of focal length `f` at altitude `H` images a ground strip of
//! `D = s * H / f`.

use crate::error::{Error, Result};
use crate::models::{CameraSpec, FlightSpec, FootprintGeometry, SpacingResult};

pub const MIN_OVERLAP: f64 = 0.60;
pub const MAX_OVERLAP: f64 = 1.0;

/// Compute lateral (between flight lines) and frontal (between photos) spacing.
///
/// The lateral spacing is always returned negative so that offsetting the
/// first flight line moves southwards.
pub fn compute_spacing(camera: &CameraSpec, flight: &FlightSpec) -> Result<SpacingResult> {
    require_positive("focal_length_m", camera.focal_length_m)?;
    require_positive("sensor_width_m", camera.sensor_width_m)?;
    require_positive("sensor_height_m", camera.sensor_height_m)?;
    require_positive("altitude_m", flight.altitude_m)?;
    require_overlap("lateral_overlap", flight.lateral_overlap)?;
    require_overlap("frontal_overlap", flight.frontal_overlap)?;

    let lateral = footprint(
        camera.sensor_width_m,
        camera.focal_length_m,
        flight.altitude_m,
        flight.lateral_overlap,
    );
    let frontal = footprint(
        camera.sensor_height_m,
        camera.focal_length_m,
        flight.altitude_m,
        flight.frontal_overlap,
    );

    let lateral_spacing_m = if lateral.spacing_m > 0.0 {
        -lateral.spacing_m
    } else {
        lateral.spacing_m
    };

    tracing::debug!(
        lateral_footprint_m = lateral.footprint_m,
        frontal_footprint_m = frontal.footprint_m,
        lateral_spacing_m,
        frontal_spacing_m = frontal.spacing_m,
        "computed photo spacing"
    );

    Ok(SpacingResult {
        lateral_spacing_m,
        frontal_spacing_m: frontal.spacing_m,
        lateral,
        frontal,
    })
}

/// Footprint terms for one sensor dimension. No validation is performed.
pub fn footprint(
    sensor_dim_m: f64,
    focal_length_m: f64,
    altitude_m: f64,
    overlap: f64,
) -> FootprintGeometry {
    let tan_half_fov = sensor_dim_m / (2.0 * focal_length_m);
    let footprint_m = sensor_dim_m * altitude_m / focal_length_m;
    let overlap_m = overlap * footprint_m;
    let overlap_height_m = overlap_m / (2.0 * tan_half_fov);
    let spacing_m = overlap_m * (altitude_m / overlap_height_m - 1.0);

    FootprintGeometry {
        footprint_m,
        overlap_m,
        overlap_height_m,
        spacing_m,
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be a finite value greater than zero",
        })
    }
}

fn require_overlap(name: &'static str, value: f64) -> Result<()> {
    if (MIN_OVERLAP..MAX_OVERLAP).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "overlap must be in [0.60, 1.0)",
        })
    }
}
