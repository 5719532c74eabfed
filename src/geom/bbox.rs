use geo::Rect;
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a grid cell by index.
#[derive(Debug, Clone)]
pub(crate) struct CellEnvelope {
    idx: usize, // Index of corresponding cell polygon
    bbox: Rect<f64>,
}

impl CellEnvelope {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding cell.
    pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for CellEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}
