use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use geo::{Coord, LineString, Polygon};

/// Which way a hexagon's flat side faces.
///
/// `FlatTop` hexagons have an edge parallel to the x axis; `PointyTop`
/// hexagons are rotated 30° so a vertex points up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexOrientation {
    FlatTop,
    PointyTop,
}

impl HexOrientation {
    /// Rectangular lattice steps (dx, dy) that place hexagon centers for
    /// this orientation, given the inradius.
    pub(crate) fn lattice_steps(&self, inradius: f64) -> (f64, f64) {
        match self {
            Self::FlatTop => (inradius * 3f64.sqrt(), inradius),
            Self::PointyTop => (inradius, inradius * 3f64.sqrt()),
        }
    }

    /// Angle of the first vertex, degrees counterclockwise from +x.
    fn start_angle_deg(&self) -> f64 {
        match self {
            Self::FlatTop => 0.0,
            Self::PointyTop => 30.0,
        }
    }
}

impl FromStr for HexOrientation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Self::FlatTop),
            "pointy" | "point" => Ok(Self::PointyTop),
            other => bail!("invalid hexagon orientation {other:?} (expected \"flat\" or \"pointy\")"),
        }
    }
}

impl fmt::Display for HexOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlatTop => write!(f, "flat"),
            Self::PointyTop => write!(f, "pointy"),
        }
    }
}

/// Circumradius (center → vertex) of a regular hexagon with the given inradius.
#[inline]
pub(crate) fn circumradius(inradius: f64) -> f64 {
    2.0 * inradius / 3f64.sqrt()
}

/// Build a regular hexagon polygon around `center`.
pub(crate) fn hexagon(
    center: Coord<f64>,
    inradius: f64,
    orientation: HexOrientation,
) -> Polygon<f64> {
    let side = circumradius(inradius);
    let start = orientation.start_angle_deg();
    let mut ring: Vec<Coord<f64>> = (0..6)
        .map(|i| {
            let angle = (start + 60.0 * i as f64).to_radians();
            Coord {
                x: center.x + side * angle.cos(),
                y: center.y + side * angle.sin(),
            }
        })
        .collect();
    ring.push(ring[0]); // close the ring
    Polygon::new(LineString(ring), vec![])
}
