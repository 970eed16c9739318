pub mod generation;
pub mod metrics;

pub use generation::*;
pub use metrics::*;
