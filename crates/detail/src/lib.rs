//! Selected-country detail: service clients, panel state and the fetch
//! that ties them together.

pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod panel;
pub mod services;

pub use config::*;
pub use error::*;
pub use fetch::*;
pub use http::*;
pub use panel::*;
pub use services::*;
