use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use geo::MultiPolygon;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::common::http::blocking_client;
use crate::io::geojson::multipolygon_from_value;

/// Resolves a free-text place name to a boundary and metadata.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<GeocodedPlace>;
}

/// One geocoding result: names, centroid and boundary (lon/lat degrees).
#[derive(Debug, Clone)]
pub struct GeocodedPlace {
    pub display_name: String,
    /// Administrative type of the match, e.g. "city".
    pub admin_type: String,
    pub lat: f64,
    pub lon: f64,
    pub boundary: MultiPolygon<f64>,
}

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

// Nominatim serializes coordinates as strings in jsonv2.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    geojson: Option<serde_json::Value>,
}

/// Geocoder backed by the Nominatim search API.
pub struct NominatimGeocoder {
    base_url: String,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self> {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Point the client at a different Nominatim instance.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: blocking_client(Duration::from_secs(30))?,
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, query: &str) -> Result<GeocodedPlace> {
        let url = format!("{}/search", self.base_url);
        let body = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("polygon_geojson", "1"),
                ("limit", "1"),
            ])
            .send()
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .context("geocoding request returned error status")?
            .text()
            .context("failed to read geocoding response")?;

        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).context("failed to parse geocoding response")?;
        let hit = hits
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no geocoding result for {query:?}"))?;
        hit_to_place(hit)
    }
}

fn hit_to_place(hit: SearchHit) -> Result<GeocodedPlace> {
    let lat: f64 = hit.lat.parse().context("non-numeric lat in geocoding result")?;
    let lon: f64 = hit.lon.parse().context("non-numeric lon in geocoding result")?;
    let geometry = hit
        .geojson
        .ok_or_else(|| anyhow!("geocoding result has no boundary geometry"))?;
    let boundary = multipolygon_from_value(&geometry)?;
    if boundary.0.is_empty() {
        bail!("geocoding result boundary is not polygonal");
    }
    Ok(GeocodedPlace {
        display_name: hit.display_name,
        admin_type: hit.kind,
        lat,
        lon,
        boundary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(json: &str) -> SearchHit {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn polygon_hit_parses() {
        let place = hit_to_place(hit(
            r#"{
                "lat": "46.4983",
                "lon": "11.3548",
                "display_name": "Bolzano - Bozen, Südtirol, Italia",
                "type": "city",
                "geojson": {
                    "type": "Polygon",
                    "coordinates": [[[11.3, 46.4], [11.4, 46.4], [11.4, 46.6], [11.3, 46.4]]]
                }
            }"#,
        ))
        .unwrap();

        assert_eq!(place.admin_type, "city");
        assert!((place.lat - 46.4983).abs() < 1e-9);
        assert!((place.lon - 11.3548).abs() < 1e-9);
        assert_eq!(place.boundary.0.len(), 1);
    }

    #[test]
    fn multipolygon_hit_parses() {
        let place = hit_to_place(hit(
            r#"{
                "lat": "0.5",
                "lon": "0.5",
                "display_name": "Twin Isles",
                "type": "administrative",
                "geojson": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[0.0, 0.0], [0.4, 0.0], [0.4, 0.4], [0.0, 0.0]]],
                        [[[0.6, 0.6], [1.0, 0.6], [1.0, 1.0], [0.6, 0.6]]]
                    ]
                }
            }"#,
        ))
        .unwrap();

        assert_eq!(place.boundary.0.len(), 2);
    }

    #[test]
    fn hit_without_geometry_fails() {
        let err = hit_to_place(hit(
            r#"{"lat": "1.0", "lon": "2.0", "display_name": "Nowhere", "type": "hamlet"}"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("no boundary geometry"));
    }

    #[test]
    fn point_geometry_is_rejected() {
        let err = hit_to_place(hit(
            r#"{
                "lat": "1.0",
                "lon": "2.0",
                "display_name": "Spot",
                "type": "locality",
                "geojson": {"type": "Point", "coordinates": [2.0, 1.0]}
            }"#,
        ))
        .unwrap_err();
        assert!(err.to_string().contains("unsupported GeoJSON geometry type"));
    }
}
