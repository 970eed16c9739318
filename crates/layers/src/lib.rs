pub mod layer;
pub mod map;
pub mod popup;
pub mod symbology;

pub use layer::*;
pub use map::*;
