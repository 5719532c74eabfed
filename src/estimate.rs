//! Occupant estimation from floor area.

use anyhow::Result;
use geo::Area;

use crate::catalog::{Building, TypeFilter};
use crate::geom::Projector;
use crate::osm::FeatureSource;
use crate::place::City;

/// Fraction of each floor assumed built-up.
pub const OCCUPANCY_FACTOR: f64 = 0.4;

/// Usable floor area per occupant, m².
pub const AREA_PER_PERSON_M2: f64 = 20.0;

impl City {
    /// Estimate occupants for every admitted building.
    ///
    /// Builds the catalog first if none exists. Footprints are
    /// reprojected to the place's UTM zone before areas are taken;
    /// results are written back onto the catalog rows, and rows outside
    /// the filter keep `area_m2`/`people` unset. Returns the
    /// reprojected subset that was computed.
    pub fn estimate_people(
        &mut self,
        source: &impl FeatureSource,
        filter: &TypeFilter,
    ) -> Result<Vec<Building>> {
        self.ensure_catalog(source, filter)?;

        let projector = Projector::new(self.place().utm())?;
        let catalog = self.require_catalog_mut()?;

        // wipe any previous estimates across the whole catalog
        for building in catalog.buildings_mut() {
            building.area_m2 = None;
            building.people = None;
        }

        let mut computed = Vec::new();
        for building in catalog.buildings_mut() {
            if !filter.admits(&building.building_type) {
                continue;
            }
            let footprint = projector.to_projected(&building.geometry);
            let area = footprint.unsigned_area() * building.levels * OCCUPANCY_FACTOR;
            let mut people = (area / AREA_PER_PERSON_M2).round();
            if people == 0.0 {
                people = 1.0; // every standing building houses someone
            }
            building.area_m2 = Some(area);
            building.people = Some(people);

            let mut projected = building.clone();
            projected.geometry = footprint;
            computed.push(projected);
        }

        if self.verbose() > 0 {
            let total: f64 = computed.iter().filter_map(|b| b.people).sum();
            eprintln!("[estimate] {} buildings, {total:.0} people", computed.len());
        }
        Ok(computed)
    }
}
