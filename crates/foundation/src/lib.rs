//! Globe math (vectors, lon/lat, equirectangular projection) and frame time.

pub mod math;
pub mod time;

pub use time::*;
