use anyhow::{anyhow, Result};

use crate::catalog::{BuildingCatalog, TypeFilter};
use crate::grid::HexGrid;
use crate::osm::{FeatureSource, Geocoder};

use super::Place;

/// One city run: the resolved place plus the derived state the pipeline
/// stages fill in.
#[derive(Debug)]
pub struct City {
    place: Place,
    catalog: Option<BuildingCatalog>,
    grid: Option<HexGrid>, // canonical copy, geographic CRS
    verbose: u8,
}

impl City {
    /// Resolve a free-text place name into a city ready for the pipeline.
    pub fn resolve(geocoder: &impl Geocoder, query: &str, verbose: u8) -> Result<Self> {
        if verbose > 0 {
            eprintln!("[geocode] {query}");
        }
        let geocoded = geocoder.geocode(query)?;
        let place = Place::from_geocoded(query, geocoded);
        if verbose > 0 {
            eprintln!("[geocode] {} -> EPSG:{}", place.display_name(), place.utm().epsg());
        }
        Ok(Self { place, catalog: None, grid: None, verbose })
    }

    #[inline] pub fn place(&self) -> &Place { &self.place }

    /// The current building catalog, if one has been fetched.
    #[inline] pub fn catalog(&self) -> Option<&BuildingCatalog> { self.catalog.as_ref() }

    /// The canonical grid in geographic coordinates, if one has been built.
    #[inline] pub fn grid(&self) -> Option<&HexGrid> { self.grid.as_ref() }

    #[inline] pub(crate) fn verbose(&self) -> u8 { self.verbose }

    /// Fetch and clean the building catalog, replacing any previous one.
    pub fn fetch_buildings(
        &mut self,
        source: &impl FeatureSource,
        filter: &TypeFilter,
    ) -> Result<&BuildingCatalog> {
        if self.verbose > 0 {
            eprintln!("[features] fetching buildings for {} ({filter})", self.place.name_en());
        }
        let raw = source.fetch_features(&self.place, filter)?;
        let catalog = BuildingCatalog::from_features(raw);
        if self.verbose > 0 {
            eprintln!("[features] catalog holds {} buildings", catalog.len());
        }
        Ok(self.catalog.insert(catalog))
    }

    /// Build the catalog only if absent. Returns `true` when a fetch
    /// happened, `false` when the existing catalog was reused.
    pub fn ensure_catalog(
        &mut self,
        source: &impl FeatureSource,
        filter: &TypeFilter,
    ) -> Result<bool> {
        if self.catalog.is_some() {
            return Ok(false);
        }
        self.fetch_buildings(source, filter)?;
        Ok(true)
    }

    pub(crate) fn require_catalog(&self) -> Result<&BuildingCatalog> {
        self.catalog
            .as_ref()
            .ok_or_else(|| anyhow!("no building catalog; call fetch_buildings first"))
    }

    pub(crate) fn require_catalog_mut(&mut self) -> Result<&mut BuildingCatalog> {
        self.catalog
            .as_mut()
            .ok_or_else(|| anyhow!("no building catalog; call fetch_buildings first"))
    }

    pub(crate) fn require_grid(&self) -> Result<&HexGrid> {
        self.grid
            .as_ref()
            .ok_or_else(|| anyhow!("no grid; call build_grid first"))
    }

    pub(crate) fn set_grid(&mut self, grid: HexGrid) {
        self.grid = Some(grid);
    }
}
