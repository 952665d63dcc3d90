//! End-to-end flight planning: spacing, flight path, waypoints.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine::{LineEngine, OffsetStyle};
use crate::error::{Error, Result};
use crate::models::{CameraSpec, FlightPlan, FlightSpec, TerrainBoundary};
use crate::overlap::compute_spacing;
use crate::rules::PlannerConfig;
use crate::survey_lines::build_flight_path;
use crate::waypoints::sample_waypoints;

const PLAN_STEPS: usize = 3;

/// Progress reporting and advisory cancellation, polled between stages of
/// the planning, angle-marker and parcel-splitting routines.
pub trait Feedback {
    fn set_step(&self, _step: usize, _total: usize) {}

    fn is_canceled(&self) -> bool {
        false
    }
}

/// Feedback that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl Feedback for NoFeedback {}

/// Cancellation flag that can be shared with another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Feedback for CancelFlag {
    fn set_step(&self, step: usize, total: usize) {
        tracing::debug!(step, total, "planning step");
    }

    fn is_canceled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Run all three planning stages.
///
/// Cancellation is checked before each stage and once at the end; a
/// cancelled run returns [`Error::Cancelled`] and no partial output.
pub fn plan_flight<E, F>(
    camera: &CameraSpec,
    flight: &FlightSpec,
    boundary: &TerrainBoundary,
    engine: &E,
    style: &OffsetStyle,
    feedback: &F,
) -> Result<FlightPlan>
where
    E: LineEngine + ?Sized,
    F: Feedback + ?Sized,
{
    checkpoint(feedback, 0, PLAN_STEPS)?;
    let spacing = compute_spacing(camera, flight)?;

    checkpoint(feedback, 1, PLAN_STEPS)?;
    let path = build_flight_path(boundary, spacing.lateral_spacing_m, engine, style)?;

    checkpoint(feedback, 2, PLAN_STEPS)?;
    let waypoints = sample_waypoints(&path, spacing.frontal_spacing_m)?;

    checkpoint(feedback, PLAN_STEPS, PLAN_STEPS)?;
    tracing::info!(
        crs = boundary.crs.as_str(),
        passes = path.pass_count(),
        waypoints = waypoints.len(),
        length_m = path.length(),
        "flight plan ready"
    );

    Ok(FlightPlan {
        spacing,
        path,
        waypoints,
    })
}

/// [`plan_flight`] with camera, flight and offset style taken from `config`.
pub fn plan_flight_with_config<E, F>(
    config: &PlannerConfig,
    boundary: &TerrainBoundary,
    engine: &E,
    feedback: &F,
) -> Result<FlightPlan>
where
    E: LineEngine + ?Sized,
    F: Feedback + ?Sized,
{
    plan_flight(
        &config.camera,
        &config.flight,
        boundary,
        engine,
        &config.offset_style,
        feedback,
    )
}

/// Report `step` of `total` and stop with [`Error::Cancelled`] if requested.
pub(crate) fn checkpoint<F>(feedback: &F, step: usize, total: usize) -> Result<()>
where
    F: Feedback + ?Sized,
{
    feedback.set_step(step, total);
    if feedback.is_canceled() {
        tracing::info!(step, total, "cancelled");
        return Err(Error::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Crs;
    use crate::planar::PlanarEngine;
    use geo::Coord;
    use std::cell::Cell;

    fn field() -> TerrainBoundary {
        TerrainBoundary::new(
            Crs::new("EPSG:31983"),
            vec![
                Coord { x: 500_000.0, y: 7_400_000.0 },
                Coord { x: 500_400.0, y: 7_400_000.0 },
                Coord { x: 500_400.0, y: 7_400_300.0 },
                Coord { x: 500_000.0, y: 7_400_300.0 },
            ],
        )
    }

    /// Cancels once the given step is reached.
    struct CancelAt {
        step: usize,
        current: Cell<usize>,
    }

    impl Feedback for CancelAt {
        fn set_step(&self, step: usize, _total: usize) {
            self.current.set(step);
        }

        fn is_canceled(&self) -> bool {
            self.current.get() >= self.step
        }
    }

    #[test]
    fn test_plan_flight_with_defaults() {
        let config = PlannerConfig::default();
        let plan = plan_flight_with_config(&config, &field(), &PlanarEngine, &NoFeedback).unwrap();

        let expected_passes = (300.0 / plan.spacing.lateral_spacing_m.abs()).floor() as usize;
        assert_eq!(plan.path.pass_count(), expected_passes);
        assert!(!plan.waypoints.is_empty());
        assert_eq!(plan.path.crs, Crs::new("EPSG:31983"));
        assert_eq!(plan.waypoints[0].index, 0);
        assert_eq!(plan.waypoints[0].latitude, 7_400_300.0);
    }

    #[test]
    fn test_cancel_before_each_stage() {
        let config = PlannerConfig::default();
        for step in 0..=PLAN_STEPS {
            let feedback = CancelAt {
                step,
                current: Cell::new(0),
            };
            let result = plan_flight_with_config(&config, &field(), &PlanarEngine, &feedback);
            assert!(
                matches!(result, Err(Error::Cancelled)),
                "expected cancellation at step {step}"
            );
        }
    }

    #[test]
    fn test_cancel_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_canceled());
        handle.cancel();
        assert!(flag.is_canceled());

        let result = plan_flight_with_config(&PlannerConfig::default(), &field(), &PlanarEngine, &flag);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_invalid_camera_fails_before_geometry() {
        let mut config = PlannerConfig::default();
        config.camera.sensor_width_m = -1.0;
        let result = plan_flight_with_config(&config, &field(), &PlanarEngine, &NoFeedback);
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }
}
