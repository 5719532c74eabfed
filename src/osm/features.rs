use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use geo::{BoundingRect, Coord, Intersects, LineString, MultiPolygon, Polygon};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::catalog::TypeFilter;
use crate::common::http::blocking_client;
use crate::place::Place;

use super::{ElementKind, FeatureId, RawFeature};

/// Retrieves tagged building features for a resolved place.
pub trait FeatureSource {
    fn fetch_features(&self, place: &Place, filter: &TypeFilter) -> Result<Vec<RawFeature>>;
}

const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
const OVERPASS_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    #[serde(default)]
    tags: ahash::AHashMap<String, String>,
    #[serde(default)]
    geometry: Vec<LatLon>,
    #[serde(default)]
    members: Vec<OverpassMember>,
}

#[derive(Debug, Deserialize)]
struct OverpassMember {
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<LatLon>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct LatLon {
    lat: f64,
    lon: f64,
}

/// Feature source backed by the Overpass API.
pub struct OverpassSource {
    base_url: String,
    client: Client,
}

impl OverpassSource {
    pub fn new() -> Result<Self> {
        Self::with_base_url(OVERPASS_URL)
    }

    /// Point the client at a different Overpass instance.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.into(),
            client: blocking_client(Duration::from_secs(OVERPASS_TIMEOUT_SECS))?,
        })
    }
}

impl FeatureSource for OverpassSource {
    fn fetch_features(&self, place: &Place, filter: &TypeFilter) -> Result<Vec<RawFeature>> {
        let query = overpass_query(place, filter)?;
        let body = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .with_context(|| format!("POST {}", self.base_url))?
            .error_for_status()
            .context("feature request returned error status")?
            .text()
            .context("failed to read feature response")?;

        let resp: OverpassResponse =
            serde_json::from_str(&body).context("failed to parse feature response")?;
        Ok(clip_to_boundary(parse_elements(resp.elements), place.boundary()))
    }
}

/// One Overpass QL query over the boundary's bounding box.
fn overpass_query(place: &Place, filter: &TypeFilter) -> Result<String> {
    let bounds = place
        .boundary()
        .bounding_rect()
        .ok_or_else(|| anyhow!("place boundary has no extent"))?;
    let bbox = format!(
        "{},{},{},{}",
        bounds.min().y,
        bounds.min().x,
        bounds.max().y,
        bounds.max().x
    );
    let tag = match filter {
        TypeFilter::All => "[\"building\"]".to_string(),
        TypeFilter::Only(types) => format!("[\"building\"~\"^({})$\"]", types.join("|")),
    };
    Ok(format!(
        "[out:json][timeout:{OVERPASS_TIMEOUT_SECS}];nwr{tag}({bbox});out tags geom;"
    ))
}

/// Convert raw Overpass elements into features, assembling way rings and
/// relation outer members into polygons.
fn parse_elements(elements: Vec<OverpassElement>) -> Vec<RawFeature> {
    elements
        .into_iter()
        .filter_map(|el| {
            let OverpassElement { kind, id, mut tags, geometry, members } = el;
            let kind = ElementKind::from_overpass(&kind)?;
            let geometry = match kind {
                ElementKind::Node => None,
                ElementKind::Way => {
                    ring_to_polygon(&geometry).map(|p| MultiPolygon(vec![p]))
                }
                ElementKind::Relation => {
                    let outers: Vec<Polygon<f64>> = members
                        .iter()
                        .filter(|m| m.role == "outer")
                        .filter_map(|m| ring_to_polygon(&m.geometry))
                        .collect();
                    (!outers.is_empty()).then(|| MultiPolygon(outers))
                }
            };
            Some(RawFeature {
                id: FeatureId { kind, id },
                geometry,
                building_type: tags.remove("building"),
                levels: tags.remove("building:levels"),
            })
        })
        .collect()
}

/// A coordinate list becomes a footprint polygon only if it closes on itself.
fn ring_to_polygon(coords: &[LatLon]) -> Option<Polygon<f64>> {
    if coords.len() < 4 {
        return None;
    }
    let ring: Vec<Coord<f64>> = coords.iter().map(|c| Coord { x: c.lon, y: c.lat }).collect();
    if ring[0] != ring[ring.len() - 1] {
        return None; // open way, not a footprint
    }
    Some(Polygon::new(LineString(ring), vec![]))
}

/// Drop polygonal features outside the place boundary; the bbox query
/// over-fetches around non-rectangular places.
fn clip_to_boundary(features: Vec<RawFeature>, boundary: &MultiPolygon<f64>) -> Vec<RawFeature> {
    features
        .into_iter()
        .filter(|f| match &f.geometry {
            Some(geometry) => geometry.intersects(boundary),
            None => true, // bare nodes are dropped later, during cataloging
        })
        .collect()
}
