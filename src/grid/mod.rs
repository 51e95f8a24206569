//! Grid layout and compositing
//!
//! This module contains:
//! - Grid configuration and cell geometry
//! - Asynchronous compositing of ordered records into one exported raster

/// Grid compositing and PNG export
pub mod compositor;
/// Grid configuration and cell geometry
pub mod layout;

pub use compositor::{ExportedImage, export_grid};
pub use layout::{CellSize, GridConfig, GridLayout};
