pub mod analysis;
pub mod normalization;
pub mod source;
pub mod table;

pub use normalization::*;
pub use source::*;
pub use table::*;
