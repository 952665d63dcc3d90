//! Core data models for survey planning.

use geo::{Coord, Line, LineString, MultiLineString, Polygon};
use serde::{Deserialize, Serialize};

use crate::spatial::{distance, line_string_length, open_ring};

/// Opaque coordinate reference identifier, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Crs(pub String);

impl Crs {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Camera optics, all lengths in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    pub focal_length_m: f64,
    /// Sensor dimension across the flight line
    pub sensor_width_m: f64,
    /// Sensor dimension along the flight line
    pub sensor_height_m: f64,
}

/// Flight altitude and the requested photo overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightSpec {
    pub altitude_m: f64,
    /// Overlap between adjacent flight lines, in [0.60, 1.0)
    pub lateral_overlap: f64,
    /// Overlap between consecutive photos on one line, in [0.60, 1.0)
    pub frontal_overlap: f64,
}

/// Intermediate terms of the pinhole ground-footprint model for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintGeometry {
    /// Ground footprint dimension (D)
    pub footprint_m: f64,
    /// Overlap distance (SD)
    pub overlap_m: f64,
    /// Height at which the overlap distance fills the field of view (h1)
    pub overlap_height_m: f64,
    /// Raw spacing, before any sign convention is applied
    pub spacing_m: f64,
}

/// Spacing between flight lines (lateral) and between photos (frontal).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacingResult {
    /// Always negative: flight lines are laid out north to south
    pub lateral_spacing_m: f64,
    pub frontal_spacing_m: f64,
    pub lateral: FootprintGeometry,
    pub frontal: FootprintGeometry,
}

/// The polygon to be surveyed.
///
/// The closing vertex may or may not repeat the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainBoundary {
    pub crs: Crs,
    pub vertices: Vec<Coord<f64>>,
}

impl TerrainBoundary {
    pub fn new(crs: Crs, vertices: Vec<Coord<f64>>) -> Self {
        Self { crs, vertices }
    }

    /// Build a boundary from the exterior ring of a polygon.
    pub fn from_polygon(crs: Crs, polygon: &Polygon<f64>) -> Self {
        Self {
            crs,
            vertices: polygon.exterior().0.clone(),
        }
    }

    /// Vertices without the repeated closing vertex.
    pub fn distinct_vertices(&self) -> &[Coord<f64>] {
        open_ring(&self.vertices)
    }

    /// Boundary edges in ring order, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = EdgeSegment> + '_ {
        let vertices = self.distinct_vertices();
        let count = if vertices.len() < 2 { 0 } else { vertices.len() };
        (0..count).map(move |i| EdgeSegment {
            start: vertices[i],
            end: vertices[(i + 1) % vertices.len()],
        })
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::from(self.distinct_vertices().to_vec()), vec![])
    }
}

/// One boundary edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSegment {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
}

impl EdgeSegment {
    pub fn midpoint(&self) -> Coord<f64> {
        Coord {
            x: (self.start.x + self.end.x) / 2.0,
            y: (self.start.y + self.end.y) / 2.0,
        }
    }

    pub fn length(&self) -> f64 {
        distance(self.start, self.end)
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::from(vec![self.start, self.end])
    }
}

/// Extreme vertices of a terrain boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainExtremes {
    pub north: Coord<f64>,
    pub south: Coord<f64>,
    pub west: Coord<f64>,
    pub east: Coord<f64>,
}

impl TerrainExtremes {
    /// North-south distance (dNS).
    pub fn north_south(&self) -> f64 {
        (self.north.y - self.south.y).abs()
    }

    /// West-east distance (dWE).
    pub fn west_east(&self) -> f64 {
        (self.west.x - self.east.x).abs()
    }
}

/// Parallel lines returned by the offset operation, in no particular order.
pub type OffsetLineSet = Vec<LineString<f64>>;

/// A boustrophedon flight path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPath {
    pub crs: Crs,
    /// Parallel passes, north to south, each in its traversal direction
    pub passes: Vec<LineString<f64>>,
    /// Turn segments joining pass `i` to pass `i + 1`
    pub connectors: Vec<Line<f64>>,
    /// Passes and connectors merged into contiguous parts
    pub route: MultiLineString<f64>,
}

impl FlightPath {
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn connector_count(&self) -> usize {
        self.connectors.len()
    }

    /// Total route length.
    pub fn length(&self) -> f64 {
        self.route.0.iter().map(line_string_length).sum()
    }

    /// (min x, max x) over every route coordinate.
    pub fn x_extent(&self) -> Option<(f64, f64)> {
        self.route
            .0
            .iter()
            .flat_map(|part| part.0.iter())
            .fold(None, |acc, c| match acc {
                None => Some((c.x, c.x)),
                Some((lo, hi)) => Some((lo.min(c.x), hi.max(c.x))),
            })
    }
}

/// A photo position on the flight path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub index: usize,
    /// y coordinate in the boundary's CRS
    pub latitude: f64,
    /// x coordinate in the boundary's CRS
    pub longitude: f64,
}

/// Output of a complete planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub spacing: SpacingResult,
    pub path: FlightPath,
    pub waypoints: Vec<Waypoint>,
}
