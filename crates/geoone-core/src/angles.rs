//! Interior-angle markers for polygon vertices.
//!
//! Each marker is the part of a small circle around a vertex that lies
//! inside the polygon, i.e. the arc that visually spans the interior angle.

use geo::{Coord, Geometry, MultiLineString, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::engine::{BufferStyle, LineFeature, OverlayEngine};
use crate::error::{Error, Result};
use crate::planner::{checkpoint, Feedback};
use crate::spatial::{cross, dot, open_ring, ring_signed_area};

/// Smallest accepted marker radius, in meters.
pub const MIN_MARKER_DISTANCE: f64 = 0.1;

const ANGLE_STEPS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleMarker {
    pub vertex_index: usize,
    pub vertex: Coord<f64>,
    /// Interior angle in decimal degrees
    pub interior_angle_deg: f64,
    pub arc: MultiLineString<f64>,
}

impl AngleMarker {
    pub fn label(&self) -> String {
        format!("{:.2}", self.interior_angle_deg)
    }
}

/// Interior angle at each ring vertex, in degrees.
///
/// Works for either ring orientation; reflex vertices come out above 180.
pub fn vertex_angles(ring: &[Coord<f64>]) -> Vec<f64> {
    let ring = open_ring(ring);
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }
    let counter_clockwise = ring_signed_area(ring) >= 0.0;

    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let curr = ring[i];
            let next = ring[(i + 1) % n];
            let to_prev = prev - curr;
            let to_next = next - curr;
            // Counter-clockwise sweep from the outgoing to the incoming edge.
            let sweep = cross(to_next, to_prev)
                .atan2(dot(to_next, to_prev))
                .rem_euclid(std::f64::consts::TAU);
            let interior = if counter_clockwise {
                sweep
            } else {
                std::f64::consts::TAU - sweep
            };
            interior.to_degrees()
        })
        .collect()
}

/// Build an angle marker for every exterior vertex of `polygon`.
///
/// Vertices whose circle falls entirely outside the polygon produce no marker.
/// `feedback` is polled before each engine stage and once at the end.
pub fn interior_angles<E, F>(
    polygon: &Polygon<f64>,
    distance: f64,
    engine: &E,
    style: &BufferStyle,
    feedback: &F,
) -> Result<Vec<AngleMarker>>
where
    E: OverlayEngine + ?Sized,
    F: Feedback + ?Sized,
{
    if !(distance.is_finite() && distance >= MIN_MARKER_DISTANCE) {
        return Err(Error::InvalidParameter {
            name: "distance",
            value: distance,
            reason: "marker radius must be at least 0.1",
        });
    }
    let vertices = open_ring(&polygon.exterior().0);
    if vertices.len() < 3 {
        return Err(Error::DegenerateBoundary(format!(
            "polygon has {} distinct vertices, at least 3 are required",
            vertices.len()
        )));
    }
    let angles = vertex_angles(vertices);

    checkpoint(feedback, 0, ANGLE_STEPS)?;
    let discs = vertices
        .iter()
        .map(|&vertex| engine.buffer(&Geometry::Point(Point(vertex)), distance, style))
        .collect::<Result<Vec<_>>>()?;

    checkpoint(feedback, 1, ANGLE_STEPS)?;
    let mut circles = Vec::with_capacity(discs.len());
    for (id, disc) in discs.iter().enumerate() {
        let rings = engine.polygon_to_lines(disc)?;
        if rings.is_empty() {
            return Err(Error::collaborator(format!(
                "buffer around vertex {id} produced no outline"
            )));
        }
        circles.push(LineFeature {
            id,
            geometry: MultiLineString::new(rings),
        });
    }

    checkpoint(feedback, 2, ANGLE_STEPS)?;
    let overlay = MultiPolygon::new(vec![polygon.clone()]);
    let arcs = engine.intersection(&circles, &overlay)?;
    checkpoint(feedback, ANGLE_STEPS, ANGLE_STEPS)?;
    if arcs.len() < vertices.len() {
        tracing::warn!(
            vertices = vertices.len(),
            markers = arcs.len(),
            distance,
            "some vertex circles do not overlap the polygon"
        );
    }

    arcs.into_iter()
        .map(|feature| {
            let vertex = *vertices.get(feature.id).ok_or_else(|| {
                Error::collaborator(format!("intersection returned unknown id {}", feature.id))
            })?;
            Ok(AngleMarker {
                vertex_index: feature.id,
                vertex,
                interior_angle_deg: angles[feature.id],
                arc: feature.geometry,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planar::PlanarEngine;
    use crate::planner::{CancelFlag, NoFeedback};
    use crate::spatial::{distance as coord_distance, line_string_length};
    use geo::LineString;
    use std::cell::RefCell;

    /// Records every reported step.
    #[derive(Default)]
    struct StepLog(RefCell<Vec<(usize, usize)>>);

    impl Feedback for StepLog {
        fn set_step(&self, step: usize, total: usize) {
            self.0.borrow_mut().push((step, total));
        }
    }

    fn polygon(coords: &[(f64, f64)]) -> Polygon<f64> {
        Polygon::new(LineString::from(coords.to_vec()), vec![])
    }

    fn marker_style() -> BufferStyle {
        BufferStyle {
            segments: 9,
            ..BufferStyle::default()
        }
    }

    #[test]
    fn test_vertex_angles_square_either_orientation() {
        let ccw: Vec<Coord<f64>> = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 4.0, y: 0.0 },
            Coord { x: 4.0, y: 4.0 },
            Coord { x: 0.0, y: 4.0 },
        ];
        let cw: Vec<Coord<f64>> = ccw.iter().rev().copied().collect();
        for angles in [vertex_angles(&ccw), vertex_angles(&cw)] {
            assert_eq!(angles.len(), 4);
            assert!(angles.iter().all(|a| (a - 90.0).abs() < 1e-9), "{angles:?}");
        }
    }

    #[test]
    fn test_vertex_angles_reflex_and_sum() {
        // L shape; the vertex at (10, 10) is reflex.
        let l_shape = polygon(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 20.0),
            (0.0, 20.0),
            (0.0, 0.0),
        ]);
        let angles = vertex_angles(&l_shape.exterior().0);
        assert_eq!(angles.len(), 6);
        assert!((angles[3] - 270.0).abs() < 1e-9);
        let sum: f64 = angles.iter().sum();
        assert!((sum - 4.0 * 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_vertex_angles_triangle_sum() {
        let angles = vertex_angles(&[
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 7.0, y: 1.0 },
            Coord { x: 2.0, y: 5.0 },
        ]);
        let sum: f64 = angles.iter().sum();
        assert!((sum - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_square_markers_are_quarter_arcs() {
        let square = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let markers =
            interior_angles(&square, 3.0, &PlanarEngine, &marker_style(), &NoFeedback).unwrap();
        assert_eq!(markers.len(), 4);

        let quarter = std::f64::consts::TAU * 3.0 / 4.0;
        for marker in &markers {
            assert_eq!(marker.label(), "90.00");
            let length: f64 = marker.arc.0.iter().map(line_string_length).sum();
            assert!((length - quarter).abs() < 0.02, "arc length {length}");
            for c in marker.arc.0.iter().flat_map(|part| part.0.iter()) {
                assert!(coord_distance(*c, marker.vertex) <= 3.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_reflex_marker_spans_three_quarters() {
        let l_shape = polygon(&[
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, 10.0),
            (10.0, 10.0),
            (10.0, 20.0),
            (0.0, 20.0),
        ]);
        let markers =
            interior_angles(&l_shape, 2.0, &PlanarEngine, &marker_style(), &NoFeedback).unwrap();
        let reflex = markers.iter().find(|m| m.vertex_index == 3).unwrap();
        assert_eq!(reflex.label(), "270.00");
        let length: f64 = reflex.arc.0.iter().map(line_string_length).sum();
        let three_quarters = std::f64::consts::TAU * 2.0 * 0.75;
        assert!((length - three_quarters).abs() < 0.05, "arc length {length}");
    }

    #[test]
    fn test_reports_each_stage_and_honours_cancel() {
        let square = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let log = StepLog::default();
        interior_angles(&square, 3.0, &PlanarEngine, &marker_style(), &log).unwrap();
        assert_eq!(*log.0.borrow(), vec![(0, 3), (1, 3), (2, 3), (3, 3)]);

        let cancel = CancelFlag::new();
        cancel.cancel();
        let result = interior_angles(&square, 3.0, &PlanarEngine, &marker_style(), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_marker_distance_below_minimum_is_rejected() {
        let square = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let result = interior_angles(&square, 0.05, &PlanarEngine, &marker_style(), &NoFeedback);
        assert!(matches!(
            result,
            Err(Error::InvalidParameter { name: "distance", .. })
        ));
    }
}
