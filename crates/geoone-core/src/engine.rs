//! Geometry engine interfaces consumed by the survey and overlay routines.
//!
//! The routines never compute buffers, offsets or overlays themselves; they
//! are handed an engine implementing these traits. [`crate::PlanarEngine`] is
//! the bundled implementation.

use geo::{Geometry, LineString, MultiLineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapStyle {
    #[default]
    Round,
    Flat,
    Square,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStyle {
    #[default]
    Round,
    Miter,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferStyle {
    pub cap: CapStyle,
    pub join: JoinStyle,
    /// Segments per quarter circle for round caps and joins
    pub segments: usize,
    pub miter_limit: f64,
}

impl Default for BufferStyle {
    fn default() -> Self {
        Self {
            cap: CapStyle::Round,
            join: JoinStyle::Round,
            segments: 8,
            miter_limit: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetStyle {
    /// Segments per quarter circle for round joins
    pub segments: usize,
    pub join: JoinStyle,
    pub miter_limit: f64,
}

impl Default for OffsetStyle {
    fn default() -> Self {
        Self {
            segments: 8,
            join: JoinStyle::Round,
            miter_limit: 2.0,
        }
    }
}

/// A line geometry tagged with the id of the caller-owned record it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFeature {
    pub id: usize,
    pub geometry: MultiLineString<f64>,
}

/// One polygon produced by a split, with the index of the input it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPiece {
    pub source_index: usize,
    pub polygon: Polygon<f64>,
}

/// Line editing operations.
pub trait LineEngine {
    /// Lengthen a line by `start` before its first point and `end` past its
    /// last point, along the direction of the end segments.
    fn extend_line(&self, line: &LineString<f64>, start: f64, end: f64)
        -> Result<LineString<f64>>;

    /// Return `count` parallel copies of `line` at offsets `0, offset, 2 * offset, ...`.
    ///
    /// Positive offsets lie to the left of the line direction. The order of
    /// the returned lines is not part of the contract.
    fn offset_lines(
        &self,
        line: &LineString<f64>,
        count: usize,
        offset: f64,
        style: &OffsetStyle,
    ) -> Result<Vec<LineString<f64>>>;
}

/// Polygon overlay operations.
pub trait OverlayEngine {
    fn buffer(
        &self,
        geometry: &Geometry<f64>,
        distance: f64,
        style: &BufferStyle,
    ) -> Result<MultiPolygon<f64>>;

    /// Exterior and interior rings of every polygon, as lines.
    fn polygon_to_lines(&self, polygons: &MultiPolygon<f64>) -> Result<Vec<LineString<f64>>>;

    /// The parts of each line feature that fall inside `overlay`.
    ///
    /// Features with no part inside are dropped; ids are preserved.
    fn intersection(
        &self,
        lines: &[LineFeature],
        overlay: &MultiPolygon<f64>,
    ) -> Result<Vec<LineFeature>>;

    fn split_with_lines(
        &self,
        polygons: &[Polygon<f64>],
        splitters: &[LineString<f64>],
    ) -> Result<Vec<SplitPiece>>;
}
