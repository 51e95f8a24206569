//! Color analysis: HSL conversion, dominant color extraction and pixel sampling

/// Dominant color extraction via quantized bucket counting
pub mod dominant;
/// RGB to HSL conversion
pub mod hsl;
/// Display coordinate to raster pixel sampling
pub mod sampler;

pub use hsl::{Hsl, Rgb};
