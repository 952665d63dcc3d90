//! Subcommand bodies, kept free of argument parsing so they can be tested.

use anyhow::{Context, Result};
use geoone_core::{
    interior_angles, plan_flight_with_config, split_parcels_by_river, AngleMarker, CancelFlag,
    FlightPlan, PlanarEngine, PlannerConfig, SplitPiece,
};

use crate::io::{check_same_crs, ParcelsInput, Report, ShapeInput};

/// Camera and flight values given on the command line; `None` keeps the
/// configured value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOverrides {
    pub altitude_m: Option<f64>,
    pub focal_length_m: Option<f64>,
    pub sensor_width_m: Option<f64>,
    pub sensor_height_m: Option<f64>,
    pub lateral_overlap: Option<f64>,
    pub frontal_overlap: Option<f64>,
}

impl PlanOverrides {
    pub fn apply(&self, config: &mut PlannerConfig) {
        let camera = &mut config.camera;
        let flight = &mut config.flight;
        if let Some(v) = self.altitude_m {
            flight.altitude_m = v;
        }
        if let Some(v) = self.focal_length_m {
            camera.focal_length_m = v;
        }
        if let Some(v) = self.sensor_width_m {
            camera.sensor_width_m = v;
        }
        if let Some(v) = self.sensor_height_m {
            camera.sensor_height_m = v;
        }
        if let Some(v) = self.lateral_overlap {
            flight.lateral_overlap = v;
        }
        if let Some(v) = self.frontal_overlap {
            flight.frontal_overlap = v;
        }
    }
}

pub fn plan(
    terrain: &ShapeInput,
    config: &PlannerConfig,
    overrides: &PlanOverrides,
    cancel: &CancelFlag,
) -> Result<Report<FlightPlan>> {
    let mut config = config.clone();
    overrides.apply(&mut config);

    let boundary = terrain.boundary();
    let plan = plan_flight_with_config(&config, &boundary, &PlanarEngine, cancel)
        .context("planning flight")?;
    Ok(Report::new(terrain.crs.clone(), plan))
}

pub fn angles(
    polygon: &ShapeInput,
    config: &PlannerConfig,
    distance: Option<f64>,
    cancel: &CancelFlag,
) -> Result<Report<Vec<AngleMarker>>> {
    let rules = &config.angle_markers;
    let distance = distance.unwrap_or(rules.distance_m);
    let markers = interior_angles(
        &polygon.polygon(),
        distance,
        &PlanarEngine,
        &rules.style,
        cancel,
    )
    .context("computing angle markers")?;
    Ok(Report::new(polygon.crs.clone(), markers))
}

pub fn split(
    parcels: &ParcelsInput,
    river: &ShapeInput,
    config: &PlannerConfig,
    distance: Option<f64>,
    cancel: &CancelFlag,
) -> Result<Report<Vec<SplitPiece>>> {
    check_same_crs(&parcels.crs, &river.crs)?;
    let rules = &config.river_buffer;
    let distance = distance.unwrap_or(rules.distance_m);
    let pieces = split_parcels_by_river(
        &parcels.polygons(),
        &river.line_string(),
        distance,
        &PlanarEngine,
        &rules.style,
        cancel,
    )
    .context("splitting parcels")?;
    Ok(Report::new(parcels.crs.clone(), pieces))
}
