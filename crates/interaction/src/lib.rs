pub mod config;
pub mod controller;
pub mod hit;
pub mod rotation;

pub use config::*;
pub use controller::*;
pub use hit::*;
pub use rotation::*;
