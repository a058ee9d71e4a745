pub mod globe;
pub mod picking;
pub mod raster;

pub use globe::*;
pub use picking::*;
pub use raster::*;
