pub mod feature_table;

pub use feature_table::*;
