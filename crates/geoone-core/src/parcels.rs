//! Split land parcels along a buffered river line.

use geo::{Geometry, LineString, Polygon};

use crate::engine::{BufferStyle, OverlayEngine, SplitPiece};
use crate::error::{Error, Result};
use crate::planner::{checkpoint, Feedback};
use crate::spatial::{distance as coord_distance, EPS_M};

const SPLIT_STEPS: usize = 3;

/// Cut `parcels` with the outline of a strip of half width `distance`
/// around `river`.
///
/// Parcels the strip does not touch come back whole. Pieces keep the index
/// of the parcel they were cut from. `feedback` is polled before each engine
/// stage and once at the end.
pub fn split_parcels_by_river<E, F>(
    parcels: &[Polygon<f64>],
    river: &LineString<f64>,
    distance: f64,
    engine: &E,
    style: &BufferStyle,
    feedback: &F,
) -> Result<Vec<SplitPiece>>
where
    E: OverlayEngine + ?Sized,
    F: Feedback + ?Sized,
{
    if !(distance.is_finite() && distance > 0.0) {
        return Err(Error::InvalidParameter {
            name: "distance",
            value: distance,
            reason: "river buffer distance must be greater than zero",
        });
    }
    let has_extent = river
        .0
        .windows(2)
        .any(|w| coord_distance(w[0], w[1]) > EPS_M);
    if !has_extent {
        return Err(Error::DegenerateBoundary(
            "river line needs at least two distinct points".into(),
        ));
    }

    checkpoint(feedback, 0, SPLIT_STEPS)?;
    let strip = engine.buffer(&Geometry::LineString(river.clone()), distance, style)?;
    if strip.0.is_empty() {
        return Err(Error::collaborator("river buffer is empty"));
    }
    checkpoint(feedback, 1, SPLIT_STEPS)?;
    let splitters = engine.polygon_to_lines(&strip)?;
    if splitters.is_empty() {
        return Err(Error::collaborator("river buffer has no outline"));
    }
    tracing::debug!(
        strip_polygons = strip.0.len(),
        splitters = splitters.len(),
        "river buffer ready"
    );

    checkpoint(feedback, 2, SPLIT_STEPS)?;
    let pieces = engine.split_with_lines(parcels, &splitters)?;
    checkpoint(feedback, SPLIT_STEPS, SPLIT_STEPS)?;
    if pieces.is_empty() && !parcels.is_empty() {
        return Err(Error::collaborator("split returned no pieces"));
    }
    tracing::info!(
        parcels = parcels.len(),
        pieces = pieces.len(),
        distance,
        "split parcels along river"
    );
    Ok(pieces)
}
