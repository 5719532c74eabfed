use std::fmt;

use ahash::AHashMap;
use geo::MultiPolygon;

use crate::osm::{FeatureId, RawFeature};

/// Which building types a fetch or estimate admits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    /// Admit every tagged building.
    #[default]
    All,
    /// Admit only the listed `building` tag values.
    Only(Vec<String>),
}

impl TypeFilter {
    /// Build a filter from an explicit list of admitted type tags.
    pub fn only<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(types.into_iter().map(Into::into).collect())
    }

    pub(crate) fn admits(&self, building_type: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(types) => types.iter().any(|t| t == building_type),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all types"),
            Self::Only(types) => write!(f, "types {}", types.join(",")),
        }
    }
}

/// One building footprint with its cleaned attributes.
#[derive(Debug, Clone)]
pub struct Building {
    pub id: FeatureId,
    /// Footprint in geographic coordinates; projected copies are made on demand.
    pub geometry: MultiPolygon<f64>,
    /// Value of the `building` tag.
    pub building_type: String,
    /// Floor count; imputed from the same-type mean where the tag was
    /// missing or non-numeric.
    pub levels: f64,
    /// Usable floor area in m². Missing until estimated.
    pub area_m2: Option<f64>,
    /// Estimated occupants. Missing until estimated.
    pub people: Option<f64>,
}

/// The cleaned building collection for one place.
#[derive(Debug, Clone, Default)]
pub struct BuildingCatalog {
    buildings: Vec<Building>,
}

impl BuildingCatalog {
    /// Clean raw features into a catalog.
    ///
    /// Keeps polygonal, `building`-tagged features in identifier order,
    /// coerces `building:levels` to a number, and imputes missing floor
    /// counts with the truncated per-type mean. Types where no building
    /// has a numeric floor count are dropped wholesale.
    pub fn from_features(mut features: Vec<RawFeature>) -> Self {
        features.sort_by_key(|f| f.id);

        // geometry + type + numeric levels; bare nodes and untagged features go
        let rows: Vec<(FeatureId, MultiPolygon<f64>, String, Option<f64>)> = features
            .into_iter()
            .filter_map(|f| {
                let geometry = f.geometry?;
                let building_type = f.building_type?;
                let levels = f.levels.as_deref().and_then(coerce_levels);
                Some((f.id, geometry, building_type, levels))
            })
            .collect();

        // per-type mean of known floor counts
        let mut sums: AHashMap<String, (f64, u32)> = AHashMap::new();
        for (_, _, building_type, levels) in &rows {
            let entry = sums.entry(building_type.clone()).or_insert((0.0, 0));
            if let Some(levels) = levels {
                entry.0 += levels;
                entry.1 += 1;
            }
        }

        let buildings = rows
            .into_iter()
            .filter_map(|(id, geometry, building_type, levels)| {
                let (sum, count) = sums[&building_type];
                if count == 0 {
                    return None; // no floor data anywhere for this type
                }
                let mean = (sum / count as f64).trunc();
                Some(Building {
                    id,
                    geometry,
                    levels: levels.unwrap_or(mean),
                    building_type,
                    area_m2: None,
                    people: None,
                })
            })
            .collect();

        Self { buildings }
    }

    /// Number of buildings in the catalog.
    #[inline] pub fn len(&self) -> usize { self.buildings.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.buildings.is_empty() }

    #[inline] pub fn buildings(&self) -> &[Building] { &self.buildings }

    pub(crate) fn buildings_mut(&mut self) -> &mut [Building] { &mut self.buildings }

    /// Sum of estimated occupants over rows that have been estimated.
    pub fn total_people(&self) -> f64 {
        self.buildings.iter().filter_map(|b| b.people).sum()
    }
}

/// `building:levels` values arrive as strings; non-numeric ones count as missing.
fn coerce_levels(tag: &str) -> Option<f64> {
    tag.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
