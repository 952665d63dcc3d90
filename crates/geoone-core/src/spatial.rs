//! Planar math shared by the survey and overlay routines.
//!
//! All coordinates are assumed to be in a projected CRS with meter units.

use geo::{Coord, LineString, Polygon};
use std::f64::consts::FRAC_PI_2;

/// Tolerance for coordinate equality, in meters.
pub const EPS_M: f64 = 1e-9;

/// Euclidean distance between two coordinates.
pub fn distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub fn line_string_length(line: &LineString<f64>) -> f64 {
    line.0.windows(2).map(|w| distance(w[0], w[1])).sum()
}

pub fn coords_close(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
    (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
}

/// Ring coordinates without the repeated closing coordinate.
pub fn open_ring(coords: &[Coord<f64>]) -> &[Coord<f64>] {
    match (coords.first(), coords.last()) {
        (Some(first), Some(last)) if coords.len() > 1 && first == last => {
            &coords[..coords.len() - 1]
        }
        _ => coords,
    }
}

/// Unit vector from `a` towards `b`, or `None` when the points coincide.
pub fn unit_direction(a: Coord<f64>, b: Coord<f64>) -> Option<Coord<f64>> {
    let len = distance(a, b);
    if len <= EPS_M {
        return None;
    }
    Some(Coord {
        x: (b.x - a.x) / len,
        y: (b.y - a.y) / len,
    })
}

/// Left-hand normal of a unit direction.
pub fn left_normal(dir: Coord<f64>) -> Coord<f64> {
    Coord {
        x: -dir.y,
        y: dir.x,
    }
}

pub fn offset_coord(c: Coord<f64>, dir: Coord<f64>, distance_m: f64) -> Coord<f64> {
    Coord {
        x: c.x + dir.x * distance_m,
        y: c.y + dir.y * distance_m,
    }
}

/// z component of the cross product of two 2D vectors.
pub fn cross(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

pub fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Shoelace area of an open or closed ring; positive for counter-clockwise rings.
pub fn ring_signed_area(coords: &[Coord<f64>]) -> f64 {
    let ring = open_ring(coords);
    if ring.len() < 3 {
        return 0.0;
    }
    let twice: f64 = (0..ring.len())
        .map(|i| cross(ring[i], ring[(i + 1) % ring.len()]))
        .sum();
    twice / 2.0
}

/// Points on the arc of radius `radius` around `center`, from angle `from` to
/// `to` (radians, counter-clockwise), `segments` per quarter circle.
///
/// Both end points are included.
pub fn arc_coords(
    center: Coord<f64>,
    radius: f64,
    from: f64,
    to: f64,
    segments: usize,
) -> Vec<Coord<f64>> {
    let sweep = to - from;
    let steps = ((sweep.abs() / FRAC_PI_2) * segments.max(1) as f64).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| {
            let angle = from + sweep * i as f64 / steps as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect()
}

/// Closed circle approximation with `4 * segments` vertices.
pub fn circle_polygon(center: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let count = 4 * segments.max(1);
    let ring: Vec<Coord<f64>> = (0..count)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / count as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), vec![])
}
