//! Histogram panel driven by the selected normalization mode.
//!
//! A refresh builds request parameters from the mode, fetches a histogram and
//! summary statistics as an all-settled pair, and applies the pair to the
//! panel's labels and histogram widget. Every refresh carries a generation;
//! only the latest issued generation may update the display.

pub mod controller;
pub mod format;
pub mod params;
pub mod task;
pub mod widget;

pub use compute::NormalizationMode;
pub use controller::*;
pub use format::*;
pub use params::*;
pub use task::*;
pub use widget::*;
