//! Photo waypoints sampled at fixed arc-length steps along a flight path.

use geo::{Coord, LineString};

use crate::error::{Error, Result};
use crate::models::{FlightPath, Waypoint};
use crate::spatial::{distance, line_string_length};

/// Sample waypoints every `frontal_spacing` meters along each route part.
///
/// Each part is sampled from its start at `0, s, 2s, ...` while the position
/// is shorter than the part. Indices run across parts without gaps.
pub fn sample_waypoints(path: &FlightPath, frontal_spacing: f64) -> Result<Vec<Waypoint>> {
    if !(frontal_spacing.is_finite() && frontal_spacing > 0.0) {
        return Err(Error::InvalidSpacing {
            name: "frontal_spacing",
            value: frontal_spacing,
        });
    }

    let mut waypoints = Vec::new();
    for part in &path.route.0 {
        for c in sample_part(part, frontal_spacing) {
            waypoints.push(Waypoint {
                index: waypoints.len(),
                latitude: c.y,
                longitude: c.x,
            });
        }
    }

    tracing::info!(
        waypoints = waypoints.len(),
        parts = path.route.0.len(),
        frontal_spacing,
        "sampled waypoints"
    );
    Ok(waypoints)
}

/// Point at arc length `along` from the start of `line`.
///
/// Returns `None` when `along` is negative or beyond the line length.
pub fn interpolate_along(line: &LineString<f64>, along: f64) -> Option<Coord<f64>> {
    if along.is_nan() || along < 0.0 {
        return None;
    }
    let mut walked = 0.0;
    for w in line.0.windows(2) {
        let seg = distance(w[0], w[1]);
        if along <= walked + seg {
            return Some(lerp(w[0], w[1], along - walked, seg));
        }
        walked += seg;
    }
    match line.0.as_slice() {
        [only] if along == 0.0 => Some(*only),
        _ => None,
    }
}

/// Walks the segments once; positions are `k * spacing`, never accumulated.
fn sample_part(line: &LineString<f64>, spacing: f64) -> Vec<Coord<f64>> {
    let length = line_string_length(line);
    let mut samples = Vec::new();
    let mut k = 0usize;
    let mut walked = 0.0;

    for w in line.0.windows(2) {
        let seg = distance(w[0], w[1]);
        loop {
            let position = k as f64 * spacing;
            if position >= length || position > walked + seg {
                break;
            }
            samples.push(lerp(w[0], w[1], position - walked, seg));
            k += 1;
        }
        walked += seg;
    }
    samples
}

fn lerp(a: Coord<f64>, b: Coord<f64>, along: f64, seg: f64) -> Coord<f64> {
    if seg <= 0.0 {
        return a;
    }
    let t = (along / seg).clamp(0.0, 1.0);
    Coord {
        x: a.x + (b.x - a.x) * t,
        y: a.y + (b.y - a.y) * t,
    }
}
