mod city;

pub use city::City;

use geo::MultiPolygon;

use crate::geom::UtmZone;
use crate::osm::GeocodedPlace;

/// EPSG code of the geographic CRS everything arrives in.
pub(crate) const GEOGRAPHIC_EPSG: u32 = 4326;

/// A resolved place: names, boundary and coordinate systems.
///
/// Immutable once constructed; pipeline state that changes between
/// stages lives on [`City`].
#[derive(Debug, Clone)]
pub struct Place {
    query: String,
    display_name: String,
    name_en: String,
    admin_type: String,
    lat: f64,
    lon: f64,
    boundary: MultiPolygon<f64>, // geographic coordinates (EPSG:4326)
    utm: UtmZone,
}

impl Place {
    pub(crate) fn from_geocoded(query: &str, geocoded: GeocodedPlace) -> Self {
        let name_en = geocoded
            .display_name
            .split(',')
            .next()
            .unwrap_or(&geocoded.display_name)
            .trim()
            .to_string();
        let utm = UtmZone::from_lon_lat(geocoded.lon, geocoded.lat);
        Self {
            query: query.to_string(),
            display_name: geocoded.display_name,
            name_en,
            admin_type: geocoded.admin_type,
            lat: geocoded.lat,
            lon: geocoded.lon,
            boundary: geocoded.boundary,
            utm,
        }
    }

    /// The free-text query this place was resolved from.
    #[inline] pub fn query(&self) -> &str { &self.query }

    /// Full display name as returned by the geocoder.
    #[inline] pub fn display_name(&self) -> &str { &self.display_name }

    /// First component of the display name, used for export paths.
    #[inline] pub fn name_en(&self) -> &str { &self.name_en }

    /// Administrative type of the place (e.g. "city").
    #[inline] pub fn admin_type(&self) -> &str { &self.admin_type }

    /// Geocoded centroid latitude, degrees.
    #[inline] pub fn lat(&self) -> f64 { self.lat }

    /// Geocoded centroid longitude, degrees.
    #[inline] pub fn lon(&self) -> f64 { self.lon }

    /// Boundary polygon in geographic coordinates.
    #[inline] pub fn boundary(&self) -> &MultiPolygon<f64> { &self.boundary }

    /// Best-fit metric CRS for this place.
    #[inline] pub fn utm(&self) -> &UtmZone { &self.utm }
}

#[cfg(test)]
mod tests {
    use geo::polygon;

    use super::*;

    fn geocoded() -> GeocodedPlace {
        GeocodedPlace {
            display_name: "Bolzano - Bozen, Südtirol, Italia".to_string(),
            admin_type: "city".to_string(),
            lat: 46.4983,
            lon: 11.3548,
            boundary: MultiPolygon(vec![polygon![
                (x: 11.3, y: 46.4),
                (x: 11.4, y: 46.4),
                (x: 11.4, y: 46.6),
                (x: 11.3, y: 46.6),
            ]]),
        }
    }

    #[test]
    fn name_en_is_first_display_component() {
        let place = Place::from_geocoded("Bolzano", geocoded());
        assert_eq!(place.name_en(), "Bolzano - Bozen");
        assert_eq!(place.admin_type(), "city");
        assert_eq!(place.query(), "Bolzano");
    }

    #[test]
    fn derives_utm_from_centroid() {
        let place = Place::from_geocoded("Bolzano", geocoded());
        assert_eq!(place.utm().epsg(), 32632);
    }
}
