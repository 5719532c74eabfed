//! Stub collaborators and synthetic geometry for unit tests.

use std::cell::Cell;

use anyhow::Result;
use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::catalog::TypeFilter;
use crate::osm::{ElementKind, FeatureId, FeatureSource, GeocodedPlace, Geocoder, RawFeature};
use crate::place::{City, Place};

pub(crate) const TEST_LON: f64 = 11.35;
pub(crate) const TEST_LAT: f64 = 46.5;

/// Square polygon centered at (lon, lat) with roughly the given side in meters.
pub(crate) fn geo_square(lon: f64, lat: f64, side_m: f64) -> Polygon<f64> {
    let dlat = side_m / 2.0 / 111_320.0;
    let dlon = side_m / 2.0 / (111_320.0 * lat.to_radians().cos());
    Polygon::new(
        LineString(vec![
            Coord { x: lon - dlon, y: lat - dlat },
            Coord { x: lon + dlon, y: lat - dlat },
            Coord { x: lon + dlon, y: lat + dlat },
            Coord { x: lon - dlon, y: lat + dlat },
            Coord { x: lon - dlon, y: lat - dlat },
        ]),
        vec![],
    )
}

/// A building way footprint centered at (lon, lat).
pub(crate) fn building(
    id: i64,
    lon: f64,
    lat: f64,
    side_m: f64,
    building_type: &str,
    levels: Option<&str>,
) -> RawFeature {
    RawFeature {
        id: FeatureId { kind: ElementKind::Way, id },
        geometry: Some(MultiPolygon(vec![geo_square(lon, lat, side_m)])),
        building_type: Some(building_type.to_string()),
        levels: levels.map(str::to_string),
    }
}

pub(crate) struct StubGeocoder {
    place: GeocodedPlace,
}

impl StubGeocoder {
    /// A 2 km × 2 km square city in UTM zone 32N.
    pub(crate) fn town() -> Self {
        Self {
            place: GeocodedPlace {
                display_name: "Testville, Testland".to_string(),
                admin_type: "city".to_string(),
                lat: TEST_LAT,
                lon: TEST_LON,
                boundary: MultiPolygon(vec![geo_square(TEST_LON, TEST_LAT, 2_000.0)]),
            },
        }
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, _query: &str) -> Result<GeocodedPlace> {
        Ok(self.place.clone())
    }
}

/// Feature source that serves a fixed feature set and counts fetches.
pub(crate) struct StubSource {
    features: Vec<RawFeature>,
    pub(crate) calls: Cell<u32>,
}

impl StubSource {
    pub(crate) fn new(features: Vec<RawFeature>) -> Self {
        Self { features, calls: Cell::new(0) }
    }
}

impl FeatureSource for StubSource {
    fn fetch_features(&self, _place: &Place, filter: &TypeFilter) -> Result<Vec<RawFeature>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self
            .features
            .iter()
            .filter(|f| match &f.building_type {
                Some(t) => filter.admits(t),
                None => matches!(filter, TypeFilter::All),
            })
            .cloned()
            .collect())
    }
}

pub(crate) fn resolve_town() -> City {
    City::resolve(&StubGeocoder::town(), "Testville", 0).unwrap()
}
