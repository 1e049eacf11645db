//! Still image codec adapters

mod raster;

pub use raster::RasterResizer;
