mod aggregate;

use anyhow::{anyhow, ensure, Result};
use geo::{BoundingRect, Coord, Polygon};

use crate::geom::{hexagon, HexOrientation, Projector};
use crate::place::{City, GEOGRAPHIC_EPSG};

/// One grid cell: a regular hexagon and its aggregated occupant count.
#[derive(Debug, Clone)]
pub struct HexCell {
    pub geometry: Polygon<f64>,
    pub people: f64,
}

/// A hexagonal grid tiling a place's bounding box.
#[derive(Debug, Clone)]
pub struct HexGrid {
    cells: Vec<HexCell>,
    epsg: u32,
}

impl HexGrid {
    pub(crate) fn new(cells: Vec<HexCell>, epsg: u32) -> Self {
        Self { cells, epsg }
    }

    #[inline] pub fn cells(&self) -> &[HexCell] { &self.cells }

    /// Number of cells in the grid.
    #[inline] pub fn len(&self) -> usize { self.cells.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    /// EPSG code of the CRS the cell geometry is expressed in.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Sum of `people` over all cells.
    pub fn total_people(&self) -> f64 {
        self.cells.iter().map(|c| c.people).sum()
    }

    /// Same grid with every cell geometry re-expressed through `f`.
    pub(crate) fn map_cells(&self, epsg: u32, f: impl Fn(&Polygon<f64>) -> Polygon<f64>) -> Self {
        Self {
            cells: self
                .cells
                .iter()
                .map(|c| HexCell { geometry: f(&c.geometry), people: c.people })
                .collect(),
            epsg,
        }
    }
}

/// Inradius (m) that makes each hexagon cover ≈1 km².
pub fn default_radius() -> f64 {
    (500_000.0 / 3f64.sqrt()).sqrt()
}

impl City {
    /// Tessellate the place's bounding box with regular hexagons.
    ///
    /// `radius` is the inradius in meters. The new, empty grid replaces
    /// any previous one on the city (stored in geographic coordinates);
    /// the projected-CRS version is returned.
    pub fn build_grid(&mut self, radius: f64, orientation: HexOrientation) -> Result<HexGrid> {
        ensure!(
            radius.is_finite() && radius > 0.0,
            "hexagon radius must be positive, got {radius}"
        );

        let projector = Projector::new(self.place().utm())?;
        let boundary = projector.to_projected(self.place().boundary());
        let bounds = boundary
            .bounding_rect()
            .ok_or_else(|| anyhow!("place boundary has no extent"))?;

        let (dx, dy) = orientation.lattice_steps(radius);
        let cols = ((bounds.max().x - bounds.min().x) / dx).ceil() as usize;
        let rows = ((bounds.max().y - bounds.min().y) / dy).ceil() as usize;

        let mut cells = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                // checkerboard parity picks true hexagon centers out of
                // the rectangular lattice
                if (row + col) % 2 != 0 {
                    continue;
                }
                let center = Coord {
                    x: bounds.min().x + col as f64 * dx,
                    y: bounds.min().y + row as f64 * dy,
                };
                cells.push(HexCell {
                    geometry: hexagon(center, radius, orientation),
                    people: 0.0,
                });
            }
        }

        let grid = HexGrid::new(cells, self.place().utm().epsg());
        self.set_grid(grid.map_cells(GEOGRAPHIC_EPSG, |p| projector.to_geographic(p)));
        if self.verbose() > 0 {
            eprintln!("[grid] {} cells at r={radius:.1} m ({orientation})", grid.len());
        }
        Ok(grid)
    }
}
