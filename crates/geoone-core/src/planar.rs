//! Planar reference implementation of the geometry engine traits.
//!
//! Overlay work is delegated to `geo::BooleanOps`; buffers are assembled as
//! the union of per-segment rectangles plus cap and join pieces.

use geo::{Area, BooleanOps, Coord, Geometry, LineString, MultiLineString, MultiPolygon, Polygon};

use crate::engine::{
    BufferStyle, CapStyle, JoinStyle, LineEngine, LineFeature, OffsetStyle, OverlayEngine,
    SplitPiece,
};
use crate::error::{Error, Result};
use crate::spatial::{
    arc_coords, circle_polygon, coords_close, cross, distance, dot, left_normal, offset_coord,
    unit_direction, EPS_M,
};

/// Pieces smaller than this (m^2) are dropped from overlay results.
const MIN_PIECE_AREA: f64 = 1e-9;

/// Geometry engine for projected coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarEngine;

impl PlanarEngine {
    pub fn new() -> Self {
        Self
    }
}

impl LineEngine for PlanarEngine {
    fn extend_line(
        &self,
        line: &LineString<f64>,
        start: f64,
        end: f64,
    ) -> Result<LineString<f64>> {
        let coords = dedup_coords(&line.0);
        let n = coords.len();
        if n < 2 {
            return Err(Error::collaborator(
                "cannot extend a line with fewer than two distinct points",
            ));
        }

        // Both directions exist: consecutive duplicates were removed above.
        let backwards = unit_direction(coords[1], coords[0])
            .ok_or_else(|| Error::collaborator("zero-length first segment"))?;
        let forwards = unit_direction(coords[n - 2], coords[n - 1])
            .ok_or_else(|| Error::collaborator("zero-length last segment"))?;

        let mut extended = coords.clone();
        extended[0] = offset_coord(coords[0], backwards, start);
        extended[n - 1] = offset_coord(coords[n - 1], forwards, end);
        Ok(LineString::from(extended))
    }

    fn offset_lines(
        &self,
        line: &LineString<f64>,
        count: usize,
        offset: f64,
        style: &OffsetStyle,
    ) -> Result<Vec<LineString<f64>>> {
        if !offset.is_finite() {
            return Err(Error::collaborator("offset distance must be finite"));
        }
        (0..count)
            .map(|k| offset_line_string(line, offset * k as f64, style))
            .collect()
    }
}

impl OverlayEngine for PlanarEngine {
    fn buffer(
        &self,
        geometry: &Geometry<f64>,
        distance: f64,
        style: &BufferStyle,
    ) -> Result<MultiPolygon<f64>> {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(Error::collaborator(format!(
                "buffer distance must be positive, got {distance}"
            )));
        }

        match geometry {
            Geometry::Point(p) => Ok(MultiPolygon::new(vec![circle_polygon(
                p.0,
                distance,
                style.segments,
            )])),
            Geometry::MultiPoint(points) => Ok(union_all(
                points
                    .0
                    .iter()
                    .map(|p| circle_polygon(p.0, distance, style.segments))
                    .collect(),
            )),
            Geometry::Line(line) => buffer_line_string(
                &LineString::from(vec![line.start, line.end]),
                distance,
                style,
            ),
            Geometry::LineString(ls) => buffer_line_string(ls, distance, style),
            Geometry::MultiLineString(mls) => {
                let mut merged = MultiPolygon::new(vec![]);
                for ls in &mls.0 {
                    merged = merged.union(&buffer_line_string(ls, distance, style)?);
                }
                Ok(merged)
            }
            Geometry::Polygon(poly) => buffer_polygon(poly, distance, style),
            Geometry::MultiPolygon(polys) => {
                let mut merged = MultiPolygon::new(vec![]);
                for poly in &polys.0 {
                    merged = merged.union(&buffer_polygon(poly, distance, style)?);
                }
                Ok(merged)
            }
            _ => Err(Error::collaborator("unsupported geometry type for buffer")),
        }
    }

    fn polygon_to_lines(&self, polygons: &MultiPolygon<f64>) -> Result<Vec<LineString<f64>>> {
        Ok(polygons
            .0
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors().iter()))
            .filter(|ring| ring.0.len() >= 2)
            .cloned()
            .collect())
    }

    fn intersection(
        &self,
        lines: &[LineFeature],
        overlay: &MultiPolygon<f64>,
    ) -> Result<Vec<LineFeature>> {
        Ok(lines
            .iter()
            .filter_map(|feature| {
                let clipped = overlay.clip(&feature.geometry, false);
                let parts: Vec<LineString<f64>> = clipped
                    .0
                    .into_iter()
                    .filter(|part| part.0.windows(2).any(|w| distance(w[0], w[1]) > EPS_M))
                    .collect();
                (!parts.is_empty()).then(|| LineFeature {
                    id: feature.id,
                    geometry: MultiLineString::new(parts),
                })
            })
            .collect())
    }

    fn split_with_lines(
        &self,
        polygons: &[Polygon<f64>],
        splitters: &[LineString<f64>],
    ) -> Result<Vec<SplitPiece>> {
        let mut region = MultiPolygon::new(vec![]);
        for splitter in splitters {
            let closed = splitter.0.len() >= 4
                && coords_close(splitter.0[0], splitter.0[splitter.0.len() - 1], EPS_M);
            if !closed {
                return Err(Error::collaborator(
                    "only closed splitter rings are supported by the planar engine",
                ));
            }
            let ring = MultiPolygon::new(vec![Polygon::new(splitter.clone(), vec![])]);
            // Even-odd fill, so an outline plus its holes rebuilds the region.
            region = region.xor(&ring);
        }

        let mut pieces = Vec::new();
        for (source_index, polygon) in polygons.iter().enumerate() {
            if region.0.is_empty() {
                pieces.push(SplitPiece {
                    source_index,
                    polygon: polygon.clone(),
                });
                continue;
            }
            let parcel = MultiPolygon::new(vec![polygon.clone()]);
            let inside = parcel.intersection(&region);
            let outside = parcel.difference(&region);
            pieces.extend(
                inside
                    .0
                    .into_iter()
                    .chain(outside.0)
                    .filter(|piece| piece.unsigned_area() > MIN_PIECE_AREA)
                    .map(|polygon| SplitPiece {
                        source_index,
                        polygon,
                    }),
            );
        }
        Ok(pieces)
    }
}

fn dedup_coords(coords: &[Coord<f64>]) -> Vec<Coord<f64>> {
    let mut out: Vec<Coord<f64>> = Vec::with_capacity(coords.len());
    for &c in coords {
        if out.last().map_or(true, |&last| !coords_close(last, c, EPS_M)) {
            out.push(c);
        }
    }
    out
}

/// Offset a polyline by `d` (positive = left side).
fn offset_line_string(
    line: &LineString<f64>,
    d: f64,
    style: &OffsetStyle,
) -> Result<LineString<f64>> {
    let coords = dedup_coords(&line.0);
    if coords.len() < 2 {
        return Err(Error::collaborator(
            "cannot offset a line with fewer than two distinct points",
        ));
    }
    if d == 0.0 {
        return Ok(LineString::from(coords));
    }

    let dirs: Vec<Coord<f64>> = coords
        .windows(2)
        .filter_map(|w| unit_direction(w[0], w[1]))
        .collect();
    let normals: Vec<Coord<f64>> = dirs.iter().map(|&u| left_normal(u)).collect();

    let mut out = vec![offset_coord(coords[0], normals[0], d)];
    for j in 1..coords.len() - 1 {
        let vertex = coords[j];
        let (e1, e2) = (dirs[j - 1], dirs[j]);
        let (n1, n2) = (normals[j - 1], normals[j]);
        let a = offset_coord(vertex, n1, d);
        let b = offset_coord(vertex, n2, d);
        let turn = cross(e1, e2);

        if turn.abs() <= EPS_M && dot(e1, e2) > 0.0 {
            out.push(a);
            continue;
        }

        let inner = turn * d > 0.0;
        if inner {
            match miter_point(vertex, n1, n2, d) {
                Some(m) => out.push(m),
                None => out.extend([a, b]),
            }
            continue;
        }

        match style.join {
            JoinStyle::Round => {
                let from = (a.y - vertex.y).atan2(a.x - vertex.x);
                let to = (b.y - vertex.y).atan2(b.x - vertex.x);
                let sweep = normalize_angle(to - from);
                out.extend(arc_coords(vertex, d.abs(), from, from + sweep, style.segments));
            }
            JoinStyle::Miter => match miter_point(vertex, n1, n2, d) {
                Some(m) if distance(vertex, m) <= style.miter_limit * d.abs() => out.push(m),
                _ => out.extend([a, b]),
            },
            JoinStyle::Bevel => out.extend([a, b]),
        }
    }
    let last = coords.len() - 1;
    out.push(offset_coord(coords[last], normals[normals.len() - 1], d));

    Ok(LineString::from(dedup_coords(&out)))
}

/// Intersection of the two offset lines at a vertex, or `None` for a reversal.
fn miter_point(vertex: Coord<f64>, n1: Coord<f64>, n2: Coord<f64>, d: f64) -> Option<Coord<f64>> {
    let denom = 1.0 + dot(n1, n2);
    if denom <= EPS_M {
        return None;
    }
    Some(Coord {
        x: vertex.x + d * (n1.x + n2.x) / denom,
        y: vertex.y + d * (n1.y + n2.y) / denom,
    })
}

/// Wrap an angle into (-PI, PI].
fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

fn buffer_polygon(
    polygon: &Polygon<f64>,
    d: f64,
    style: &BufferStyle,
) -> Result<MultiPolygon<f64>> {
    let mut merged = MultiPolygon::new(vec![polygon.clone()]);
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors().iter()) {
        merged = merged.union(&buffer_line_string(ring, d, style)?);
    }
    Ok(merged)
}

fn buffer_line_string(
    line: &LineString<f64>,
    d: f64,
    style: &BufferStyle,
) -> Result<MultiPolygon<f64>> {
    let coords = dedup_coords(&line.0);
    match coords.len() {
        0 => return Err(Error::collaborator("cannot buffer an empty line")),
        1 => return Ok(MultiPolygon::new(vec![circle_polygon(coords[0], d, style.segments)])),
        _ => {}
    }

    let mut pieces = Vec::new();
    let mut dirs = Vec::with_capacity(coords.len() - 1);
    for w in coords.windows(2) {
        let Some(u) = unit_direction(w[0], w[1]) else {
            continue;
        };
        let n = left_normal(u);
        pieces.push(polygon_from(vec![
            offset_coord(w[0], n, d),
            offset_coord(w[1], n, d),
            offset_coord(w[1], n, -d),
            offset_coord(w[0], n, -d),
        ]));
        dirs.push(u);
    }

    for j in 1..coords.len() - 1 {
        let vertex = coords[j];
        let (e1, e2) = (dirs[j - 1], dirs[j]);
        let turn = cross(e1, e2);
        if turn.abs() <= EPS_M && dot(e1, e2) > 0.0 {
            continue;
        }
        // The outer side of the corner is opposite the turn direction.
        let side = if turn > 0.0 { -d } else { d };
        let a = offset_coord(vertex, left_normal(e1), side);
        let b = offset_coord(vertex, left_normal(e2), side);
        match style.join {
            JoinStyle::Round => pieces.push(circle_polygon(vertex, d, style.segments)),
            JoinStyle::Miter => {
                match miter_point(vertex, left_normal(e1), left_normal(e2), side) {
                    Some(m) if distance(vertex, m) <= style.miter_limit * d => {
                        pieces.push(polygon_from(vec![vertex, a, m, b]))
                    }
                    _ => pieces.push(polygon_from(vec![vertex, a, b])),
                }
            }
            JoinStyle::Bevel => pieces.push(polygon_from(vec![vertex, a, b])),
        }
    }

    let (first, last) = (coords[0], coords[coords.len() - 1]);
    match style.cap {
        CapStyle::Round => {
            pieces.push(circle_polygon(first, d, style.segments));
            pieces.push(circle_polygon(last, d, style.segments));
        }
        CapStyle::Flat => {}
        CapStyle::Square => {
            let start_dir = dirs[0];
            let end_dir = dirs[dirs.len() - 1];
            pieces.push(square_cap(first, start_dir, -d, d));
            pieces.push(square_cap(last, end_dir, d, d));
        }
    }

    Ok(union_all(pieces))
}

/// Rectangle of half width `d` from `at` to `at + dir * reach`.
fn square_cap(at: Coord<f64>, dir: Coord<f64>, reach: f64, d: f64) -> Polygon<f64> {
    let n = left_normal(dir);
    let tip = offset_coord(at, dir, reach);
    polygon_from(vec![
        offset_coord(at, n, d),
        offset_coord(tip, n, d),
        offset_coord(tip, n, -d),
        offset_coord(at, n, -d),
    ])
}

fn polygon_from(ring: Vec<Coord<f64>>) -> Polygon<f64> {
    Polygon::new(LineString::from(ring), vec![])
}

fn union_all(pieces: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    pieces
        .into_iter()
        .filter(|p| p.unsigned_area() > MIN_PIECE_AREA)
        .fold(MultiPolygon::new(vec![]), |acc, piece| {
            acc.union(&MultiPolygon::new(vec![piece]))
        })
}
