//! JSON input files and report output.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use geo::{Coord, LineString, Polygon};
use geoone_core::{Crs, TerrainBoundary};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A single ring or line: `{"crs": "EPSG:31983", "vertices": [[x, y], ...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeInput {
    #[serde(default)]
    pub crs: Crs,
    pub vertices: Vec<[f64; 2]>,
}

impl ShapeInput {
    pub fn coords(&self) -> Vec<Coord<f64>> {
        to_coords(&self.vertices)
    }

    pub fn boundary(&self) -> TerrainBoundary {
        TerrainBoundary::new(self.crs.clone(), self.coords())
    }

    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(LineString::new(self.coords()), vec![])
    }

    pub fn line_string(&self) -> LineString<f64> {
        LineString::new(self.coords())
    }
}

/// Parcel rings: `{"crs": ..., "parcels": [[[x, y], ...], ...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParcelsInput {
    #[serde(default)]
    pub crs: Crs,
    pub parcels: Vec<Vec<[f64; 2]>>,
}

impl ParcelsInput {
    pub fn polygons(&self) -> Vec<Polygon<f64>> {
        self.parcels
            .iter()
            .map(|ring| Polygon::new(LineString::new(to_coords(ring)), vec![]))
            .collect()
    }
}

fn to_coords(points: &[[f64; 2]]) -> Vec<Coord<f64>> {
    points.iter().map(|&[x, y]| Coord { x, y }).collect()
}

/// Command result stamped with the time it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub generated_at: DateTime<Utc>,
    pub crs: Crs,
    pub result: T,
}

impl<T: Serialize> Report<T> {
    pub fn new(crs: Crs, result: T) -> Self {
        Self {
            generated_at: Utc::now(),
            crs,
            result,
        }
    }

    pub fn render(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.context("serializing report")
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_json(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    Ok(serde_json::from_str(raw)?)
}

/// Write the report to `output`, or to stdout when no path is given.
pub fn write_report<T: Serialize>(
    report: &Report<T>,
    output: Option<&Path>,
    pretty: bool,
) -> Result<()> {
    let rendered = report.render(pretty)?;
    match output {
        Some(path) => {
            fs::write(path, rendered + "\n")
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Both inputs of a split run must share a CRS when both name one.
pub fn check_same_crs(a: &Crs, b: &Crs) -> Result<()> {
    if !a.as_str().is_empty() && !b.as_str().is_empty() && a != b {
        bail!("CRS mismatch: {} vs {}", a.as_str(), b.as_str());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shape_with_closing_vertex() {
        let input: ShapeInput = parse_json(
            r#"{"crs": "EPSG:31983", "vertices": [[0, 0], [10, 0], [10, 5], [0, 5], [0, 0]]}"#,
        )
        .unwrap();
        assert_eq!(input.crs, Crs::new("EPSG:31983"));
        let boundary = input.boundary();
        assert_eq!(boundary.vertices.len(), 5);
        assert_eq!(boundary.distinct_vertices().len(), 4);
        assert_eq!(input.polygon().exterior().0.len(), 5);
    }

    #[test]
    fn test_missing_crs_defaults_to_empty() {
        let input: ShapeInput = parse_json(r#"{"vertices": [[1, 2], [3, 4]]}"#).unwrap();
        assert_eq!(input.crs.as_str(), "");
        assert_eq!(input.line_string().0.len(), 2);
    }

    #[test]
    fn test_parse_parcels() {
        let input: ParcelsInput = parse_json(
            r#"{"crs": "EPSG:4674", "parcels": [[[0, 0], [1, 0], [1, 1]], [[5, 5], [6, 5], [6, 6]]]}"#,
        )
        .unwrap();
        let polygons = input.polygons();
        assert_eq!(polygons.len(), 2);
        // geo closes rings on construction
        assert_eq!(polygons[1].exterior().0.len(), 4);
    }

    #[test]
    fn test_malformed_vertex_is_rejected() {
        let result: Result<ShapeInput> = parse_json(r#"{"vertices": [[1, 2, 3]]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_carries_timestamp() {
        let report = Report::new(Crs::new("EPSG:31983"), vec![1, 2, 3]);
        let value: serde_json::Value =
            serde_json::from_str(&report.render(false).unwrap()).unwrap();
        let stamp = value["generated_at"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
        assert_eq!(value["crs"], "EPSG:31983");
        assert_eq!(value["result"], serde_json::json!([1, 2, 3]));
        assert!(report.render(true).unwrap().contains('\n'));
    }

    #[test]
    fn test_crs_check() {
        let a = Crs::new("EPSG:31983");
        assert!(check_same_crs(&a, &a).is_ok());
        assert!(check_same_crs(&a, &Crs::default()).is_ok());
        assert!(check_same_crs(&a, &Crs::new("EPSG:4326")).is_err());
    }
}
