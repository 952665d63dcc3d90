//! Default parameters for the planning and overlay routines.

use serde::{Deserialize, Serialize};

use crate::engine::{BufferStyle, CapStyle, JoinStyle, OffsetStyle};
use crate::error::Result;
use crate::models::{CameraSpec, FlightSpec};

/// Configuration for all routines.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub camera: CameraSpec,
    pub flight: FlightSpec,
    /// Style used when offsetting the anchor line into flight lines
    pub offset_style: OffsetStyle,
    pub angle_markers: AngleMarkerRules,
    pub river_buffer: RiverBufferRules,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            // 1" sensor, 5472 x 3648
            camera: CameraSpec {
                focal_length_m: 8.38e-3,
                sensor_width_m: 13.2e-3,
                sensor_height_m: 8.8e-3,
            },
            flight: FlightSpec {
                altitude_m: 100.0,
                lateral_overlap: 0.75,
                frontal_overlap: 0.85,
            },
            offset_style: OffsetStyle {
                segments: 8,
                join: JoinStyle::Round,
                miter_limit: 2.0,
            },
            angle_markers: AngleMarkerRules::default(),
            river_buffer: RiverBufferRules::default(),
        }
    }
}

impl PlannerConfig {
    /// Parse a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleMarkerRules {
    /// Radius of the arc drawn around each vertex
    pub distance_m: f64,
    pub style: BufferStyle,
}

impl Default for AngleMarkerRules {
    fn default() -> Self {
        Self {
            distance_m: 3.0,
            style: BufferStyle {
                cap: CapStyle::Round,
                join: JoinStyle::Round,
                segments: 9,
                miter_limit: 2.0,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverBufferRules {
    /// Half width of the strip cut out of the parcels
    pub distance_m: f64,
    pub style: BufferStyle,
}

impl Default for RiverBufferRules {
    fn default() -> Self {
        Self {
            distance_m: 1.5,
            style: BufferStyle {
                cap: CapStyle::Round,
                join: JoinStyle::Round,
                segments: 5,
                miter_limit: 2.0,
            },
        }
    }
}
