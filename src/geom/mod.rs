mod bbox;
mod hex;
mod proj;

pub use hex::HexOrientation;
pub use proj::UtmZone;

pub(crate) use bbox::CellEnvelope;
pub(crate) use hex::hexagon;
pub(crate) use proj::Projector;
