use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Result};

use crate::common::fs::ensure_dir_exists;
use crate::place::City;

use super::csv::write_grid_csv;
use super::geojson::write_grid_geojson;

/// Supported grid export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    GeoJson,
}

impl ExportFormat {
    fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "hex.csv",
            Self::GeoJson => "hex.geojson",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "geojson" => Ok(Self::GeoJson),
            other => bail!("unsupported export format {other:?} (expected \"csv\" or \"geojson\")"),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::GeoJson => write!(f, "geojson"),
        }
    }
}

impl City {
    /// Write the canonical grid under `{out_root}/{admin_type}/{name_en}/`.
    ///
    /// Returns the path of the written file.
    pub fn export(&self, format: ExportFormat, out_root: &Path) -> Result<PathBuf> {
        let grid = self.require_grid()?;

        let dir = out_root
            .join(self.place().admin_type())
            .join(self.place().name_en());
        ensure_dir_exists(&dir)?;

        let path = dir.join(format.file_name());
        match format {
            ExportFormat::Csv => write_grid_csv(grid, &path)?,
            ExportFormat::GeoJson => write_grid_geojson(grid, &path)?,
        }
        if self.verbose() > 0 {
            eprintln!("[export] {}", path.display());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use crate::geom::HexOrientation;
    use crate::io::geojson::multipolygon_from_value;
    use crate::testutil::resolve_town;

    use super::*;

    #[test]
    fn format_parses_known_and_rejects_unknown() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("geojson".parse::<ExportFormat>().unwrap(), ExportFormat::GeoJson);

        let err = "shapefile".parse::<ExportFormat>().unwrap_err();
        assert!(err.to_string().contains("unsupported export format"));
    }

    #[test]
    fn export_writes_into_admin_type_and_name_dirs() {
        let out = tempfile::tempdir().unwrap();
        let mut city = resolve_town();
        city.build_grid(500.0, HexOrientation::FlatTop).unwrap();

        let path = city.export(ExportFormat::Csv, out.path()).unwrap();
        assert_eq!(path, out.path().join("city").join("Testville").join("hex.csv"));

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("geometry,people"));
        assert_eq!(lines.count(), city.grid().unwrap().len());
        assert!(content.contains("POLYGON ("));
    }

    #[test]
    fn geojson_round_trips_people() {
        let out = tempfile::tempdir().unwrap();
        let mut city = resolve_town();
        city.build_grid(500.0, HexOrientation::PointyTop).unwrap();

        let path = city.export(ExportFormat::GeoJson, out.path()).unwrap();
        let collection: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        let features = collection["features"].as_array().unwrap();
        assert_eq!(features.len(), city.grid().unwrap().len());
        for feature in features {
            assert_eq!(feature["properties"]["people"].as_f64(), Some(0.0));
            let geometry = multipolygon_from_value(&feature["geometry"]).unwrap();
            assert_eq!(geometry.0.len(), 1);
        }
    }

    #[test]
    fn export_without_grid_fails() {
        let out = tempfile::tempdir().unwrap();
        let city = resolve_town();
        assert!(city.export(ExportFormat::Csv, out.path()).is_err());
    }
}
