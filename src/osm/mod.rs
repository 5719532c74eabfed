mod features;
mod geocode;

pub use features::{FeatureSource, OverpassSource};
pub use geocode::{GeocodedPlace, Geocoder, NominatimGeocoder};

use geo::MultiPolygon;

/// Kind of OSM element a feature came from.
// Variants ordered by wire name; the derived ordering fixes the catalog sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    Node,
    Relation,
    Way,
}

impl ElementKind {
    pub(crate) fn from_overpass(kind: &str) -> Option<Self> {
        match kind {
            "node" => Some(Self::Node),
            "relation" => Some(Self::Relation),
            "way" => Some(Self::Way),
            _ => None,
        }
    }
}

/// Stable feature identifier: element kind plus the OSM numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId {
    pub kind: ElementKind,
    pub id: i64,
}

/// A tagged feature as returned by the retrieval service, before cleaning.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub id: FeatureId,
    /// Footprint polygon(s) in geographic coordinates; `None` for bare nodes.
    pub geometry: Option<MultiPolygon<f64>>,
    /// Value of the `building` tag.
    pub building_type: Option<String>,
    /// Raw value of the `building:levels` tag.
    pub levels: Option<String>,
}
