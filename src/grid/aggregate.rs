use anyhow::Result;
use geo::{BoundingRect, Centroid, Intersects};
use rstar::{RTree, AABB};

use crate::geom::{CellEnvelope, Projector};
use crate::place::{City, GEOGRAPHIC_EPSG};

use super::{HexCell, HexGrid};

impl City {
    /// Sum estimated occupants into the grid cells containing each
    /// building's centroid.
    ///
    /// Requires a built grid and a populated catalog. Cells with no
    /// buildings keep exactly 0. The aggregated grid replaces the
    /// canonical one (geographic CRS); the projected version is returned.
    pub fn aggregate(&mut self) -> Result<HexGrid> {
        let projector = Projector::new(self.place().utm())?;
        let epsg = self.place().utm().epsg();

        let grid = self.require_grid()?;
        let catalog = self.require_catalog()?;

        let mut cells: Vec<HexCell> = grid
            .cells()
            .iter()
            .map(|c| HexCell { geometry: projector.to_projected(&c.geometry), people: 0.0 })
            .collect();

        let rtree = RTree::bulk_load(
            cells
                .iter()
                .enumerate()
                .filter_map(|(idx, cell)| {
                    cell.geometry.bounding_rect().map(|r| CellEnvelope::new(idx, r))
                })
                .collect(),
        );

        // left join: every cell collects the people of the centroids it contains
        for building in catalog.buildings() {
            let Some(people) = building.people else { continue };
            let Some(centroid) = projector.to_projected(&building.geometry).centroid() else {
                continue;
            };
            let envelope = AABB::from_point([centroid.x(), centroid.y()]);
            for entry in rtree.locate_in_envelope_intersecting(&envelope) {
                if cells[entry.idx()].geometry.intersects(&centroid) {
                    cells[entry.idx()].people += people;
                }
            }
        }

        let aggregated = HexGrid::new(cells, epsg);
        self.set_grid(aggregated.map_cells(GEOGRAPHIC_EPSG, |p| projector.to_geographic(p)));
        if self.verbose() > 0 {
            eprintln!(
                "[aggregate] {:.0} people across {} cells",
                aggregated.total_people(),
                aggregated.len()
            );
        }
        Ok(aggregated)
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::TypeFilter;
    use crate::geom::HexOrientation;
    use crate::grid::default_radius;
    use crate::testutil::{building, resolve_town, StubSource, TEST_LAT, TEST_LON};

    #[test]
    fn population_is_conserved_across_gridding() {
        // a few buildings well inside the boundary, away from cell edges
        let source = StubSource::new(vec![
            building(1, TEST_LON, TEST_LAT, 30.0, "house", Some("2")),
            building(2, TEST_LON + 0.003, TEST_LAT + 0.002, 40.0, "apartments", Some("5")),
            building(3, TEST_LON - 0.004, TEST_LAT - 0.003, 25.0, "house", Some("1")),
        ]);
        let mut city = resolve_town();
        city.estimate_people(&source, &TypeFilter::All).unwrap();
        city.build_grid(default_radius(), HexOrientation::FlatTop).unwrap();

        let grid = city.aggregate().unwrap();
        let expected = city.catalog().unwrap().total_people();
        assert!(expected > 0.0);
        assert_eq!(grid.total_people(), expected);
    }

    #[test]
    fn empty_cells_report_zero() {
        let source = StubSource::new(vec![building(
            1, TEST_LON, TEST_LAT, 30.0, "house", Some("2"),
        )]);
        let mut city = resolve_town();
        city.estimate_people(&source, &TypeFilter::All).unwrap();
        city.build_grid(400.0, HexOrientation::PointyTop).unwrap();

        let grid = city.aggregate().unwrap();
        let empty = grid.cells().iter().filter(|c| c.people == 0.0).count();
        assert!(empty > 0, "a single building cannot fill every cell");
        assert!(grid.cells().iter().all(|c| c.people >= 0.0));
    }

    #[test]
    fn unestimated_buildings_contribute_nothing() {
        let source = StubSource::new(vec![
            building(1, TEST_LON, TEST_LAT, 30.0, "house", Some("2")),
            building(2, TEST_LON + 0.003, TEST_LAT, 40.0, "retail", Some("1")),
        ]);
        let mut city = resolve_town();
        city.fetch_buildings(&source, &TypeFilter::All).unwrap();
        city.estimate_people(&source, &TypeFilter::only(["house"])).unwrap();
        city.build_grid(default_radius(), HexOrientation::FlatTop).unwrap();

        let grid = city.aggregate().unwrap();
        let house_people = city
            .catalog()
            .unwrap()
            .buildings()
            .iter()
            .find(|b| b.building_type == "house")
            .unwrap()
            .people
            .unwrap();
        assert_eq!(grid.total_people(), house_people);
    }

    #[test]
    fn aggregate_requires_grid_and_catalog() {
        let mut city = resolve_town();
        assert!(city.aggregate().is_err());

        city.build_grid(400.0, HexOrientation::FlatTop).unwrap();
        assert!(city.aggregate().is_err(), "catalog is still missing");
    }

    #[test]
    fn canonical_grid_stays_geographic() {
        let source = StubSource::new(vec![building(
            1, TEST_LON, TEST_LAT, 30.0, "house", Some("2"),
        )]);
        let mut city = resolve_town();
        city.estimate_people(&source, &TypeFilter::All).unwrap();
        city.build_grid(default_radius(), HexOrientation::FlatTop).unwrap();

        let projected = city.aggregate().unwrap();
        assert_eq!(projected.epsg(), 32632);

        let canonical = city.grid().unwrap();
        assert_eq!(canonical.epsg(), 4326);
        assert_eq!(canonical.total_people(), projected.total_people());
    }
}
