//! RGB triplets and their conversion to hue, saturation and lightness

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit per channel RGB color
///
/// Every value of this type is a valid color, so range checks never
/// have to be repeated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color from its three channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build a color from the first three channels of an RGBA pixel
    pub const fn from_rgba(pixel: [u8; 4]) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }

    /// Convert to hue, saturation and lightness
    pub fn to_hsl(self) -> Hsl {
        rgb_to_hsl(self)
    }

    /// Hue angle in degrees
    pub fn hue(self) -> f64 {
        rgb_to_hsl(self).hue
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A color in HSL coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    /// Hue angle in `[0, 360)`
    pub hue: f64,
    /// Saturation in `[0, 100]`
    pub saturation: f64,
    /// Lightness in `[0, 100]`
    pub lightness: f64,
}

/// Convert an RGB color to HSL
///
/// Achromatic colors (all channels equal) report a hue and saturation of 0.
/// Otherwise the hue comes from the 60° sector of the largest channel,
/// checked in red, green, blue order.
#[allow(clippy::float_cmp)]
pub fn rgb_to_hsl(color: Rgb) -> Hsl {
    let r = f64::from(color.r) / 255.0;
    let g = f64::from(color.g) / 255.0;
    let b = f64::from(color.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;

    if max == min {
        return Hsl {
            hue: 0.0,
            saturation: 0.0,
            lightness: lightness * 100.0,
        };
    }

    let d = max - min;
    let saturation = if lightness > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    // Channels are compared exactly: max is one of r, g, b verbatim
    let sector = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl {
        hue: (sector / 6.0 * 360.0).rem_euclid(360.0),
        saturation: saturation * 100.0,
        lightness: lightness * 100.0,
    }
}
