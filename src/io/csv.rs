//! CSV export of the aggregated grid.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use geo::{LineString, Polygon};
use polars::{frame::DataFrame, io::SerWriter, prelude::{CsvWriter, NamedFrom}, series::Series};

use crate::grid::HexGrid;

/// Write a DataFrame to a CSV file.
fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("Failed to write CSV to {}", path.display()))
}

/// Write the grid as tabular rows: geometry as WKT text plus people.
pub(crate) fn write_grid_csv(grid: &HexGrid, path: &Path) -> Result<()> {
    let (geometry, people): (Vec<String>, Vec<f64>) = grid
        .cells()
        .iter()
        .map(|cell| (polygon_to_wkt(&cell.geometry), cell.people))
        .unzip();

    let mut df = DataFrame::new(vec![
        Series::new("geometry".into(), geometry).into(),
        Series::new("people".into(), people).into(),
    ])?;

    write_csv(&mut df, path)
}

/// Format a polygon as WKT.
pub(crate) fn polygon_to_wkt(polygon: &Polygon<f64>) -> String {
    fn ring(ls: &LineString<f64>) -> String {
        let coords: Vec<String> = ls.coords().map(|c| format!("{} {}", c.x, c.y)).collect();
        format!("({})", coords.join(", "))
    }

    let mut rings = vec![ring(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring));
    format!("POLYGON ({})", rings.join(", "))
}
