pub mod canvas;
pub mod compositor;
pub mod symbology;
pub mod visibility;

pub use canvas::*;
pub use compositor::*;
pub use symbology::*;
pub use visibility::*;
