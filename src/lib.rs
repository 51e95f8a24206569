//! Order a batch of images by dominant color and composite them into one grid
//!
//! Each image gets a representative color from a quantized histogram of its
//! pixels. Images are ordered by a user-assigned weight and then by the hue
//! of that color, and the first rows by columns of them are drawn onto a
//! single PNG canvas.

#![forbid(unsafe_code)]

/// Color model, dominant color extraction and pixel sampling
pub mod color;
/// Grid geometry and compositing
pub mod grid;
/// Input/output operations and error handling
pub mod io;
/// Image records and the session that owns them
pub mod library;
/// Weight and hue ordering
pub mod ordering;

pub use io::error::{Result, SorterError};
