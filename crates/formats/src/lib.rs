pub mod countries;
pub mod topology;

pub use countries::*;
pub use topology::*;
