//! Pointer-to-pixel mapping for manual color overrides
//!
//! A pointer position inside the displayed image is mapped back to the pixel
//! of the original raster underneath it. Out-of-range positions clamp to the
//! nearest edge pixel instead of failing.

use image::RgbaImage;

use crate::color::hsl::Rgb;

/// Pointer position in display space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    /// Horizontal display coordinate
    pub x: f64,
    /// Vertical display coordinate
    pub y: f64,
}

impl PointerPosition {
    /// Create a pointer position
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle the image occupies in display space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Rendered width
    pub width: f64,
    /// Rendered height
    pub height: f64,
}

impl DisplayRect {
    /// Create a display rectangle
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin
    pub const fn at_origin(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

// floor(offset * size / extent), clamped to [0, size - 1]
fn map_axis(offset: f64, extent: f64, size: u32) -> u32 {
    let Some(last) = size.checked_sub(1) else {
        return 0;
    };
    if extent.is_nan() || extent <= 0.0 || !offset.is_finite() {
        return 0;
    }

    let scaled = (offset * f64::from(size) / extent).floor();
    if scaled <= 0.0 {
        0
    } else if scaled >= f64::from(last) {
        last
    } else {
        scaled as u32
    }
}

/// Map a display position to raster coordinates `(x, y)`
///
/// The result is always inside a non-empty raster.
pub fn map_to_raster(
    pointer: PointerPosition,
    rect: DisplayRect,
    raster_width: u32,
    raster_height: u32,
) -> (u32, u32) {
    (
        map_axis(pointer.x - rect.left, rect.width, raster_width),
        map_axis(pointer.y - rect.top, rect.height, raster_height),
    )
}

/// Exact, unquantized color under the pointer
///
/// Returns `None` only for a raster with no pixels.
pub fn sample_pixel(raster: &RgbaImage, pointer: PointerPosition, rect: DisplayRect) -> Option<Rgb> {
    let (width, height) = raster.dimensions();
    let (x, y) = map_to_raster(pointer, rect, width, height);
    raster.get_pixel_checked(x, y).map(|pixel| Rgb::from_rgba(pixel.0))
}
