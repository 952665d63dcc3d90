//! Boustrophedon flight-line generation over a terrain polygon.
//!
//! The first flight line is anchored on the northernmost boundary edge, then
//! offset southwards once per lateral spacing. The parallel lines are joined
//! end to end, alternating sides, into a single back-and-forth route.

use geo::{Coord, Line, LineString, MultiLineString};

use crate::engine::{LineEngine, OffsetStyle};
use crate::error::{Error, Result};
use crate::models::{EdgeSegment, FlightPath, OffsetLineSet, TerrainBoundary, TerrainExtremes};
use crate::spatial::{coords_close, EPS_M};

/// Maximum gap between two segments that are merged into one route part.
const JOIN_TOLERANCE_M: f64 = 1e-6;

/// Northernmost, southernmost, westernmost and easternmost vertices.
///
/// Ties keep the first vertex seen.
pub fn terrain_extremes(vertices: &[Coord<f64>]) -> Option<TerrainExtremes> {
    let (first, rest) = vertices.split_first()?;
    let mut extremes = TerrainExtremes {
        north: *first,
        south: *first,
        west: *first,
        east: *first,
    };
    for &v in rest {
        if v.y > extremes.north.y {
            extremes.north = v;
        }
        if v.y < extremes.south.y {
            extremes.south = v;
        }
        if v.x < extremes.west.x {
            extremes.west = v;
        }
        if v.x > extremes.east.x {
            extremes.east = v;
        }
    }
    Some(extremes)
}

/// The boundary edge whose midpoint lies furthest north.
pub fn northernmost_edge(boundary: &TerrainBoundary) -> Option<EdgeSegment> {
    boundary.edges().fold(None, |best: Option<EdgeSegment>, edge| match best {
        Some(b) if b.midpoint().y >= edge.midpoint().y => Some(b),
        _ => Some(edge),
    })
}

/// Build the flight path covering `boundary`.
///
/// Only the magnitude of `lateral_spacing` is used: lines always proceed
/// from the northern edge southwards.
pub fn build_flight_path<E>(
    boundary: &TerrainBoundary,
    lateral_spacing: f64,
    engine: &E,
    style: &OffsetStyle,
) -> Result<FlightPath>
where
    E: LineEngine + ?Sized,
{
    let vertices = boundary.distinct_vertices();
    if vertices.len() < 3 {
        return Err(Error::DegenerateBoundary(format!(
            "boundary has {} distinct vertices, at least 3 are required",
            vertices.len()
        )));
    }
    if let Some((i, v)) = vertices
        .iter()
        .enumerate()
        .find(|(_, v)| !(v.x.is_finite() && v.y.is_finite()))
    {
        return Err(Error::DegenerateBoundary(format!(
            "vertex {i} has a non-finite coordinate ({}, {})",
            v.x, v.y
        )));
    }
    let extremes = terrain_extremes(vertices)
        .ok_or_else(|| Error::DegenerateBoundary("boundary has no vertices".into()))?;
    let d_ns = extremes.north_south();
    let d_we = extremes.west_east();
    if d_ns <= EPS_M || d_we <= EPS_M {
        return Err(Error::DegenerateBoundary(format!(
            "boundary has no area (north-south {d_ns}, west-east {d_we})"
        )));
    }
    tracing::debug!(d_ns, d_we, ?extremes, "terrain extremes");

    if !lateral_spacing.is_finite() || lateral_spacing == 0.0 {
        return Err(Error::InvalidSpacing {
            name: "lateral_spacing",
            value: lateral_spacing,
        });
    }
    let line_count = (d_ns / lateral_spacing.abs()).floor();
    if !line_count.is_finite() || line_count < 1.0 {
        return Err(Error::InvalidSpacing {
            name: "lateral_spacing",
            value: lateral_spacing,
        });
    }
    let line_count = line_count as usize;

    let edge = northernmost_edge(boundary)
        .ok_or_else(|| Error::DegenerateBoundary("boundary has no edges".into()))?;
    // West to east, so a negative (right-hand) offset moves south for any
    // ring orientation. A vertical edge has no west-east direction: its
    // offsets step east instead.
    if (edge.start.x - edge.end.x).abs() <= EPS_M {
        tracing::warn!(
            x = edge.start.x,
            "northernmost edge is vertical, flight lines will run north-south"
        );
    }
    let edge = if edge.start.x > edge.end.x {
        EdgeSegment {
            start: edge.end,
            end: edge.start,
        }
    } else {
        edge
    };

    let edge_length = edge.length();
    let anchor = if d_we > edge_length {
        let extension = (d_we - edge_length) / 2.0;
        tracing::debug!(edge_length, extension, "extending anchor edge");
        engine.extend_line(&edge.to_line_string(), extension, extension)?
    } else {
        edge.to_line_string()
    };
    if !spans_west_east(&anchor, &extremes) {
        tracing::warn!(
            west = extremes.west.x,
            east = extremes.east.x,
            "anchor line does not span the full west-east extent of the terrain"
        );
    }

    let offset = -lateral_spacing.abs();
    let lines = engine.offset_lines(&anchor, line_count, offset, style)?;
    if lines.len() != line_count {
        return Err(Error::collaborator(format!(
            "expected {line_count} offset lines, engine returned {}",
            lines.len()
        )));
    }

    let (passes, connectors) = stitch_offset_lines(lines)?;
    let route = merge_route(&passes, &connectors);
    tracing::info!(
        passes = passes.len(),
        connectors = connectors.len(),
        parts = route.0.len(),
        "built flight path"
    );

    Ok(FlightPath {
        crs: boundary.crs.clone(),
        passes,
        connectors,
        route,
    })
}

/// Order parallel lines north to south and join them into a zig-zag.
///
/// Even lines are flown start to end, odd lines end to start; the connector
/// after line `i` leaves from the endpoint where line `i` is finished.
pub fn stitch_offset_lines(
    mut lines: OffsetLineSet,
) -> Result<(Vec<LineString<f64>>, Vec<Line<f64>>)> {
    if lines.iter().any(|line| line.0.len() < 2) {
        return Err(Error::collaborator(
            "offset operation returned a line with fewer than two points",
        ));
    }
    lines.sort_by(|a, b| b.0[0].y.total_cmp(&a.0[0].y));

    let endpoints: Vec<(Coord<f64>, Coord<f64>)> = lines
        .iter()
        .map(|line| (line.0[0], line.0[line.0.len() - 1]))
        .collect();

    let mut connectors = Vec::with_capacity(lines.len().saturating_sub(1));
    for (i, pair) in endpoints.windows(2).enumerate() {
        let (current, next) = (pair[0], pair[1]);
        let connector = if i % 2 == 0 {
            Line::new(current.1, next.1)
        } else {
            Line::new(current.0, next.0)
        };
        connectors.push(connector);
    }

    let passes = lines
        .into_iter()
        .enumerate()
        .map(|(i, mut line)| {
            if i % 2 == 1 {
                line.0.reverse();
            }
            line
        })
        .collect();

    Ok((passes, connectors))
}

/// Merge passes and connectors, in traversal order, into contiguous parts.
fn merge_route(passes: &[LineString<f64>], connectors: &[Line<f64>]) -> MultiLineString<f64> {
    let mut parts: Vec<LineString<f64>> = Vec::new();
    let mut current: Vec<Coord<f64>> = Vec::new();

    let segments = passes.iter().enumerate().flat_map(|(i, pass)| {
        let connector = connectors
            .get(i)
            .map(|c| vec![c.start, c.end])
            .into_iter();
        std::iter::once(pass.0.clone()).chain(connector)
    });

    for coords in segments {
        let Some(&first) = coords.first() else {
            continue;
        };
        match current.last() {
            Some(&last) if coords_close(last, first, JOIN_TOLERANCE_M) => {
                current.extend_from_slice(&coords[1..]);
            }
            Some(_) => {
                parts.push(LineString::from(std::mem::take(&mut current)));
                current = coords;
            }
            None => current = coords,
        }
    }
    if current.len() >= 2 {
        parts.push(LineString::from(current));
    }
    MultiLineString::new(parts)
}

fn spans_west_east(anchor: &LineString<f64>, extremes: &TerrainExtremes) -> bool {
    let (min_x, max_x) = anchor
        .0
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c.x), hi.max(c.x))
        });
    min_x <= extremes.west.x + JOIN_TOLERANCE_M && max_x >= extremes.east.x - JOIN_TOLERANCE_M
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Crs;
    use crate::planar::PlanarEngine;

    fn square(size: f64) -> TerrainBoundary {
        TerrainBoundary::new(
            Crs::new("EPSG:31983"),
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: size, y: 0.0 },
                Coord { x: size, y: size },
                Coord { x: 0.0, y: size },
                Coord { x: 0.0, y: 0.0 },
            ],
        )
    }

    /// Returns the planar engine's lines in reverse order.
    struct ReversingEngine;

    impl LineEngine for ReversingEngine {
        fn extend_line(
            &self,
            line: &LineString<f64>,
            start: f64,
            end: f64,
        ) -> Result<LineString<f64>> {
            PlanarEngine.extend_line(line, start, end)
        }

        fn offset_lines(
            &self,
            line: &LineString<f64>,
            count: usize,
            offset: f64,
            style: &OffsetStyle,
        ) -> Result<Vec<LineString<f64>>> {
            let mut lines = PlanarEngine.offset_lines(line, count, offset, style)?;
            lines.reverse();
            Ok(lines)
        }
    }

    /// Always drops the last requested line.
    struct ShortEngine;

    impl LineEngine for ShortEngine {
        fn extend_line(
            &self,
            line: &LineString<f64>,
            _start: f64,
            _end: f64,
        ) -> Result<LineString<f64>> {
            Ok(line.clone())
        }

        fn offset_lines(
            &self,
            line: &LineString<f64>,
            count: usize,
            offset: f64,
            style: &OffsetStyle,
        ) -> Result<Vec<LineString<f64>>> {
            let mut lines = PlanarEngine.offset_lines(line, count, offset, style)?;
            lines.pop();
            Ok(lines)
        }
    }

    #[test]
    fn test_extremes_keep_first_seen_on_ties() {
        let vertices = [
            Coord { x: 0.0, y: 10.0 },
            Coord { x: 5.0, y: 10.0 },
            Coord { x: 5.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        let extremes = terrain_extremes(&vertices).unwrap();
        assert_eq!(extremes.north, vertices[0]);
        assert_eq!(extremes.south, vertices[2]);
        assert_eq!(extremes.west, vertices[0]);
        assert_eq!(extremes.east, vertices[1]);
        assert_eq!(extremes.north_south(), 10.0);
        assert_eq!(extremes.west_east(), 5.0);
    }

    #[test]
    fn test_northernmost_edge_includes_closing_edge() {
        // Open ring whose top edge is the closing edge (last -> first).
        let boundary = TerrainBoundary::new(
            Crs::default(),
            vec![
                Coord { x: 0.0, y: 10.0 },
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
                Coord { x: 10.0, y: 10.0 },
            ],
        );
        let edge = northernmost_edge(&boundary).unwrap();
        assert_eq!(edge.midpoint().y, 10.0);
    }

    #[test]
    fn test_square_produces_expected_passes_and_length() {
        let path =
            build_flight_path(&square(1000.0), -50.0, &PlanarEngine, &OffsetStyle::default())
                .unwrap();
        assert_eq!(path.pass_count(), 20);
        assert_eq!(path.connector_count(), 19);
        assert_eq!(path.route.0.len(), 1, "stitched route should be one part");
        let expected = 1000.0 * 20.0 + 19.0 * 50.0;
        assert!((path.length() - expected).abs() < 1e-6, "length {}", path.length());

        let (min_x, max_x) = path.x_extent().unwrap();
        assert!(max_x - min_x >= 1000.0 - 1e-9);
    }

    #[test]
    fn test_passes_run_north_to_south_and_alternate() {
        let path =
            build_flight_path(&square(100.0), -25.0, &PlanarEngine, &OffsetStyle::default())
                .unwrap();
        let ys: Vec<f64> = path.passes.iter().map(|p| p.0[0].y).collect();
        assert_eq!(ys, vec![100.0, 75.0, 50.0, 25.0]);
        assert!(path.passes[0].0[0].x < path.passes[0].0[1].x);
        assert!(path.passes[1].0[0].x > path.passes[1].0[1].x);
        for (i, connector) in path.connectors.iter().enumerate() {
            assert_eq!(connector.start, *path.passes[i].0.last().unwrap());
            assert_eq!(connector.end, path.passes[i + 1].0[0]);
        }
    }

    #[test]
    fn test_positive_lateral_spacing_still_goes_south() {
        let path = build_flight_path(&square(100.0), 25.0, &PlanarEngine, &OffsetStyle::default())
            .unwrap();
        assert!(path.passes.iter().all(|p| p.0[0].y <= 100.0 && p.0[0].y > 0.0));
    }

    #[test]
    fn test_clockwise_ring_gives_same_passes() {
        let mut clockwise = square(100.0);
        clockwise.vertices.reverse();
        let a = build_flight_path(&square(100.0), -25.0, &PlanarEngine, &OffsetStyle::default())
            .unwrap();
        let b = build_flight_path(&clockwise, -25.0, &PlanarEngine, &OffsetStyle::default())
            .unwrap();
        assert_eq!(a.passes, b.passes);
    }

    #[test]
    fn test_unordered_engine_output_is_resorted() {
        let path =
            build_flight_path(&square(100.0), -25.0, &ReversingEngine, &OffsetStyle::default())
                .unwrap();
        let ys: Vec<f64> = path.passes.iter().map(|p| p.0[0].y).collect();
        assert_eq!(ys, vec![100.0, 75.0, 50.0, 25.0]);
        assert_eq!(path.route.0.len(), 1);
    }

    #[test]
    fn test_short_north_edge_is_extended() {
        // Trapezoid: the north edge spans x = 25..75, the terrain 0..100.
        let boundary = TerrainBoundary::new(
            Crs::default(),
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 100.0, y: 0.0 },
                Coord { x: 75.0, y: 100.0 },
                Coord { x: 25.0, y: 100.0 },
            ],
        );
        let path = build_flight_path(&boundary, -20.0, &PlanarEngine, &OffsetStyle::default())
            .unwrap();
        let first = &path.passes[0];
        assert!((first.0[0].x - 0.0).abs() < 1e-9);
        assert!((first.0[1].x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_vertex_boundary_is_degenerate() {
        let boundary = TerrainBoundary::new(
            Crs::default(),
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 }],
        );
        let result = build_flight_path(&boundary, -5.0, &PlanarEngine, &OffsetStyle::default());
        assert!(matches!(result, Err(Error::DegenerateBoundary(_))));
    }

    #[test]
    fn test_flat_boundary_is_degenerate() {
        let boundary = TerrainBoundary::new(
            Crs::default(),
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 5.0, y: 0.0 },
                Coord { x: 10.0, y: 0.0 },
            ],
        );
        let result = build_flight_path(&boundary, -5.0, &PlanarEngine, &OffsetStyle::default());
        assert!(matches!(result, Err(Error::DegenerateBoundary(_))));
    }

    #[test]
    fn test_spacing_wider_than_terrain_is_invalid() {
        let result =
            build_flight_path(&square(100.0), -150.0, &PlanarEngine, &OffsetStyle::default());
        assert!(matches!(result, Err(Error::InvalidSpacing { .. })));

        let zero = build_flight_path(&square(100.0), 0.0, &PlanarEngine, &OffsetStyle::default());
        assert!(matches!(zero, Err(Error::InvalidSpacing { .. })));
    }

    #[test]
    fn test_non_finite_vertex_is_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let boundary = TerrainBoundary::new(
                Crs::default(),
                vec![
                    Coord { x: 0.0, y: 0.0 },
                    Coord { x: 100.0, y: 0.0 },
                    Coord { x: 100.0, y: bad },
                    Coord { x: 0.0, y: 100.0 },
                ],
            );
            let result =
                build_flight_path(&boundary, -10.0, &PlanarEngine, &OffsetStyle::default());
            assert!(
                matches!(result, Err(Error::DegenerateBoundary(_))),
                "y = {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_tiny_spacing_with_huge_extent_is_invalid() {
        let boundary = TerrainBoundary::new(
            Crs::default(),
            vec![
                Coord { x: 0.0, y: -f64::MAX },
                Coord { x: 100.0, y: -f64::MAX },
                Coord { x: 100.0, y: f64::MAX },
                Coord { x: 0.0, y: f64::MAX },
            ],
        );
        let result = build_flight_path(&boundary, -1e-300, &PlanarEngine, &OffsetStyle::default());
        assert!(matches!(result, Err(Error::InvalidSpacing { .. })));
    }

    #[test]
    fn test_vertical_north_edge_steps_east() {
        // Known limitation: the highest edge midpoint is on the vertical leg.
        let boundary = TerrainBoundary::new(
            Crs::default(),
            vec![
                Coord { x: 0.0, y: 0.0 },
                Coord { x: 0.0, y: 100.0 },
                Coord { x: 100.0, y: 0.0 },
            ],
        );
        let path = build_flight_path(&boundary, -10.0, &PlanarEngine, &OffsetStyle::default())
            .unwrap();
        assert_eq!(path.pass_count(), 10);
        assert!(path.passes.iter().all(|p| p.0[0].x == p.0[1].x));
    }

    #[test]
    fn test_engine_returning_wrong_count_is_collaborator_failure() {
        let result =
            build_flight_path(&square(100.0), -25.0, &ShortEngine, &OffsetStyle::default());
        assert!(matches!(result, Err(Error::Collaborator(_))));
    }

    #[test]
    fn test_stitch_single_line_has_no_connector() {
        let line = LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]);
        let (passes, connectors) = stitch_offset_lines(vec![line.clone()]).unwrap();
        assert_eq!(passes, vec![line]);
        assert!(connectors.is_empty());
    }
}
