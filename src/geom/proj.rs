use anyhow::{anyhow, Context, Result};
use geo::{Coord, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// A UTM zone picked from a geographic centroid, used as the place's
/// locally-accurate metric CRS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    zone: u32,
    north: bool,
}

impl UtmZone {
    /// Pick the best-fit UTM zone for a lon/lat center (degrees).
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        let zone = ((((lon + 180.0) / 6.0).floor() as i64).rem_euclid(60) + 1) as u32;
        Self { zone, north: lat >= 0.0 }
    }

    /// Zone number, 1..=60.
    #[inline] pub fn zone(&self) -> u32 { self.zone }

    /// Whether the zone lies in the northern hemisphere.
    #[inline] pub fn is_north(&self) -> bool { self.north }

    /// EPSG code: 326zz north of the equator, 327zz south of it.
    #[inline]
    pub fn epsg(&self) -> u32 {
        if self.north { 32600 + self.zone } else { 32700 + self.zone }
    }

    /// PROJ.4 string for this zone (WGS84 datum, meters).
    pub(crate) fn proj4(&self) -> String {
        let south = if self.north { "" } else { " +south" };
        format!("+proj=utm +zone={}{south} +datum=WGS84 +units=m +no_defs +type=crs", self.zone)
    }
}

/// PROJ.4 string for the geographic CRS (degrees ↔ radians handled in code).
const GEOGRAPHIC_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Transforms geometry between the geographic CRS and one UTM zone.
pub(crate) struct Projector {
    geographic: Proj4,
    projected: Proj4,
}

impl Projector {
    pub(crate) fn new(utm: &UtmZone) -> Result<Self> {
        let geographic = Proj4::from_proj_string(GEOGRAPHIC_PROJ4)
            .with_context(|| anyhow!("failed to build source PROJ.4: {GEOGRAPHIC_PROJ4}"))?;
        let proj_string = utm.proj4();
        let projected = Proj4::from_proj_string(&proj_string)
            .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?;
        Ok(Self { geographic, projected })
    }

    /// Reproject from lon/lat degrees to UTM meters.
    pub(crate) fn to_projected<G>(&self, geom: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        geom.map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
            transform(&self.geographic, &self.projected, &mut point)
                .expect("CRS transform failed");
            Coord { x: point.0, y: point.1 } // UTM meters
        })
    }

    /// Reproject from UTM meters back to lon/lat degrees.
    pub(crate) fn to_geographic<G>(&self, geom: &G) -> G::Output
    where
        G: MapCoords<f64, f64>,
    {
        geom.map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x, coord.y, 0.0);
            transform(&self.projected, &self.geographic, &mut point)
                .expect("CRS transform failed");
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        })
    }
}
