//! Dominant color extraction from decoded rasters
//!
//! The raster is reduced to at most [`ANALYSIS_MAX_SIDE`] pixels on its longer
//! side, every surviving pixel is quantized into a bucket, and the most
//! populated bucket wins. Buckets live in a fixed array indexed by the packed
//! quantized channels, and ties resolve to the bucket seen first in scan order.

use std::borrow::Cow;

use image::{RgbaImage, imageops, imageops::FilterType};

use crate::color::hsl::Rgb;
use crate::io::configuration::{
    ALPHA_THRESHOLD, ANALYSIS_MAX_SIDE, FALLBACK_COLOR, NEAR_WHITE_THRESHOLD, QUANTIZATION_STEP,
};

/// Quantization levels per channel
const LEVELS: usize = 256 / QUANTIZATION_STEP as usize;

/// Number of distinct quantized colors
pub const BUCKET_COUNT: usize = LEVELS * LEVELS * LEVELS;

/// Round a channel down to its bucket floor
pub const fn quantize_channel(value: u8) -> u8 {
    value / QUANTIZATION_STEP * QUANTIZATION_STEP
}

/// Whether a pixel is skipped before counting
///
/// Mostly transparent pixels and near-white pixels are dropped. Near-black
/// pixels are kept.
pub const fn is_excluded(pixel: [u8; 4]) -> bool {
    let [r, g, b, a] = pixel;
    a < ALPHA_THRESHOLD
        || (r > NEAR_WHITE_THRESHOLD && g > NEAR_WHITE_THRESHOLD && b > NEAR_WHITE_THRESHOLD)
}

/// Pack a pixel's quantized channels into a bucket index
pub const fn bucket_index(pixel: [u8; 4]) -> usize {
    let step = QUANTIZATION_STEP as usize;
    let r = pixel[0] as usize / step;
    let g = pixel[1] as usize / step;
    let b = pixel[2] as usize / step;
    (r * LEVELS + g) * LEVELS + b
}

/// Representative color of a bucket (its quantized floor, not a member average)
pub const fn bucket_color(index: usize) -> Rgb {
    let step = QUANTIZATION_STEP as usize;
    let b = index % LEVELS;
    let g = (index / LEVELS) % LEVELS;
    let r = (index / (LEVELS * LEVELS)) % LEVELS;
    Rgb::new((r * step) as u8, (g * step) as u8, (b * step) as u8)
}

/// Frequency count per quantized color, remembering first-seen order
pub struct BucketHistogram {
    counts: Vec<u32>,
    seen_order: Vec<usize>,
}

impl Default for BucketHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketHistogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self {
            counts: vec![0; BUCKET_COUNT],
            seen_order: Vec::new(),
        }
    }

    /// Count one pixel, ignoring excluded ones
    pub fn record(&mut self, pixel: [u8; 4]) {
        if is_excluded(pixel) {
            return;
        }

        let index = bucket_index(pixel);
        if let Some(count) = self.counts.get_mut(index) {
            if *count == 0 {
                self.seen_order.push(index);
            }
            *count += 1;
        }
    }

    /// Number of pixels counted into the bucket containing `color`
    pub fn count_of(&self, color: Rgb) -> u32 {
        let index = bucket_index([color.r, color.g, color.b, u8::MAX]);
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Total pixels that passed the exclusion filters
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Most populated bucket, or `None` when nothing was counted
    ///
    /// Only a strictly larger count displaces the current leader, so the
    /// earliest seen bucket wins a tie.
    pub fn dominant(&self) -> Option<Rgb> {
        let mut best: Option<(usize, u32)> = None;
        for &index in &self.seen_order {
            let count = self.counts.get(index).copied().unwrap_or(0);
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((index, count));
            }
        }
        best.map(|(index, _)| bucket_color(index))
    }
}

/// Rescale a raster so its longer side is [`ANALYSIS_MAX_SIDE`]
///
/// Small rasters are scaled up as well as large ones down, so every image is
/// counted at the same resolution. Rasters already at that size are borrowed.
pub fn analysis_sample(image: &RgbaImage) -> Cow<'_, RgbaImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || width.max(height) == ANALYSIS_MAX_SIDE {
        return Cow::Borrowed(image);
    }

    let scale = (f64::from(ANALYSIS_MAX_SIDE) / f64::from(width))
        .min(f64::from(ANALYSIS_MAX_SIDE) / f64::from(height));
    let target_width = ((f64::from(width) * scale) as u32).max(1);
    let target_height = ((f64::from(height) * scale) as u32).max(1);

    Cow::Owned(imageops::resize(
        image,
        target_width,
        target_height,
        FilterType::Triangle,
    ))
}

/// Build the bucket histogram of a raster's analysis sample
pub fn histogram(image: &RgbaImage) -> BucketHistogram {
    let sample = analysis_sample(image);
    let mut histogram = BucketHistogram::new();
    for pixel in sample.pixels() {
        histogram.record(pixel.0);
    }
    histogram
}

/// Most frequent quantized color of a raster
///
/// Returns [`FALLBACK_COLOR`] when every pixel is excluded or the raster is empty.
pub fn extract_dominant_color(image: &RgbaImage) -> Rgb {
    let histogram = histogram(image);
    let color = histogram.dominant().unwrap_or(FALLBACK_COLOR);

    tracing::trace!(
        width = image.width(),
        height = image.height(),
        counted = histogram.total(),
        %color,
        "Extracted dominant color"
    );

    color
}
