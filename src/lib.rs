#![doc = "hexpop public API"]
mod catalog;
mod common;
mod estimate;
mod geom;
mod grid;
mod io;
mod osm;
mod place;

#[cfg(test)]
mod testutil;

#[doc(inline)]
pub use catalog::{Building, BuildingCatalog, TypeFilter};

#[doc(inline)]
pub use estimate::{AREA_PER_PERSON_M2, OCCUPANCY_FACTOR};

#[doc(inline)]
pub use geom::{HexOrientation, UtmZone};

#[doc(inline)]
pub use grid::{default_radius, HexCell, HexGrid};

#[doc(inline)]
pub use io::ExportFormat;

#[doc(inline)]
pub use osm::{
    ElementKind, FeatureId, FeatureSource, GeocodedPlace, Geocoder, NominatimGeocoder,
    OverpassSource, RawFeature,
};

#[doc(inline)]
pub use place::{City, Place};
