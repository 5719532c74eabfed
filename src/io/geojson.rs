//! GeoJSON writing for the grid, plus geometry parsing for geocoder
//! responses.

use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{anyhow, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};

use crate::grid::HexGrid;

/// Write the grid as a GeoJSON FeatureCollection of hexagon features.
pub(crate) fn write_grid_geojson(grid: &HexGrid, path: &Path) -> Result<()> {
    let features: Vec<Value> = grid
        .cells()
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let exterior: Vec<Vec<f64>> = cell
                .geometry
                .exterior()
                .coords()
                .map(|c| vec![c.x, c.y])
                .collect();
            let mut rings = vec![exterior];
            rings.extend(
                cell.geometry
                    .interiors()
                    .iter()
                    .map(|ls| ls.coords().map(|c| vec![c.x, c.y]).collect()),
            );

            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": rings,
                },
                "properties": {
                    "index": idx,
                    "people": cell.people,
                }
            })
        })
        .collect();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    let file = File::create(path)
        .with_context(|| format!("Failed to create GeoJSON file: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &collection)
        .context("Failed to serialize GeoJSON")
}

/// Parse a GeoJSON geometry object (Polygon or MultiPolygon).
pub(crate) fn multipolygon_from_value(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"]
        .as_array()
        .ok_or_else(|| anyhow!("GeoJSON geometry has no coordinates"))?;
    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon_coords(coords)?])),
        Some("MultiPolygon") => {
            let polygons = coords
                .iter()
                .map(|rings| {
                    rings
                        .as_array()
                        .ok_or_else(|| anyhow!("invalid MultiPolygon member"))
                        .and_then(|r| parse_polygon_coords(r))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(MultiPolygon(polygons))
        }
        other => Err(anyhow!("unsupported GeoJSON geometry type: {other:?}")),
    }
}

/// Parse GeoJSON polygon rings: [exterior, hole, hole, ...].
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("invalid polygon ring"))
            .and_then(|r| parse_ring_coords(r))
    });
    let exterior = rings
        .next()
        .ok_or_else(|| anyhow!("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring ([[x, y], [x, y], ...]), closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());
    for pair in coords {
        let pair = pair
            .as_array()
            .ok_or_else(|| anyhow!("invalid coordinate pair"))?;
        let x = pair
            .first()
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
        let y = pair
            .get(1)
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
        points.push(Coord { x, y });
    }

    // Ensure ring is closed (first point == last point)
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}
