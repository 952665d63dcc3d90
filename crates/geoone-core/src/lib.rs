//! Geoone core: drone survey planning and parcel geometry routines.
//!
//! The flight planner turns camera parameters and a terrain polygon into a
//! back-and-forth flight path with photo waypoints. The geometry heavy
//! lifting (offsets, buffers, overlays) goes through the [`engine`] traits;
//! [`PlanarEngine`] is the bundled implementation.

pub mod angles;
pub mod engine;
pub mod error;
pub mod models;
pub mod overlap;
pub mod parcels;
pub mod planar;
pub mod planner;
pub mod rules;
pub mod spatial;
pub mod survey_lines;
pub mod waypoints;

pub use angles::{interior_angles, vertex_angles, AngleMarker};
pub use engine::{
    BufferStyle, CapStyle, JoinStyle, LineEngine, LineFeature, OffsetStyle, OverlayEngine,
    SplitPiece,
};
pub use error::{Error, Result};
pub use models::{
    CameraSpec, Crs, EdgeSegment, FlightPath, FlightPlan, FlightSpec, FootprintGeometry,
    OffsetLineSet, SpacingResult, TerrainBoundary, TerrainExtremes, Waypoint,
};
pub use overlap::{compute_spacing, footprint};
pub use parcels::split_parcels_by_river;
pub use planar::PlanarEngine;
pub use planner::{plan_flight, plan_flight_with_config, CancelFlag, Feedback, NoFeedback};
pub use rules::{AngleMarkerRules, PlannerConfig, RiverBufferRules};
pub use survey_lines::{build_flight_path, northernmost_edge, stitch_offset_lines, terrain_extremes};
pub use waypoints::{interpolate_along, sample_waypoints};
