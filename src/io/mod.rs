mod csv;
mod export;
pub(crate) mod geojson;

pub use export::ExportFormat;
