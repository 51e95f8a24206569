//! Display ordering of image records

/// Weight and hue sort engine
pub mod sort;

pub use sort::{HueDirection, SortedView, sort_records};
