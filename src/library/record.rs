//! Image records: identity, stored source, raster, color and weight

use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::color::dominant::extract_dominant_color;
use crate::color::hsl::Rgb;
use crate::io::configuration::{DEFAULT_WEIGHT, MAX_WEIGHT, MIN_WEIGHT};
use crate::io::decode::{DecodedImage, EncodedImage};
use crate::io::error::{Result, SorterError, WithContext, invalid_parameter};

/// Stable record identifier, never reused within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// User-assigned priority in `[MIN_WEIGHT, MAX_WEIGHT]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Weight(u8);

impl Weight {
    /// Validate a weight
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when the value is outside `1..=5`
    pub fn new(value: u8) -> Result<Self> {
        if (MIN_WEIGHT..=MAX_WEIGHT).contains(&value) {
            Ok(Self(value))
        } else {
            Err(invalid_parameter(
                "weight",
                &value,
                &format!("must be between {MIN_WEIGHT} and {MAX_WEIGHT}"),
            ))
        }
    }

    /// Numeric value
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self(DEFAULT_WEIGHT)
    }
}

impl TryFrom<u8> for Weight {
    type Error = SorterError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Weight> for u8 {
    fn from(weight: Weight) -> Self {
        weight.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ingested image
///
/// The record owns its encoded source for its whole lifetime. The decoded
/// raster may be released to save memory and is rebuilt from the source
/// when needed again.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    id: RecordId,
    name: String,
    source: EncodedImage,
    raster: Option<RgbaImage>,
    dimensions: (u32, u32),
    color: Rgb,
    weight: Weight,
}

impl ImageRecord {
    /// Build a record from a decoded upload, extracting its dominant color
    pub fn new(id: RecordId, decoded: DecodedImage) -> Self {
        let color = extract_dominant_color(&decoded.raster);
        Self {
            id,
            name: decoded.name,
            source: decoded.source,
            dimensions: decoded.raster.dimensions(),
            raster: Some(decoded.raster),
            color,
            weight: Weight::default(),
        }
    }

    /// Identifier
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Original file name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stored encoded source
    pub const fn source(&self) -> &EncodedImage {
        &self.source
    }

    /// Decoded raster, if currently resident
    pub const fn raster(&self) -> Option<&RgbaImage> {
        self.raster.as_ref()
    }

    /// Raster `(width, height)`, known even while the raster is released
    pub const fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Current representative color
    pub const fn color(&self) -> Rgb {
        self.color
    }

    /// Current weight
    pub const fn weight(&self) -> Weight {
        self.weight
    }

    /// Hue of the current color in degrees
    pub fn hue(&self) -> f64 {
        self.color.hue()
    }

    /// Override the representative color
    pub const fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    /// Change the weight
    pub const fn set_weight(&mut self, weight: Weight) {
        self.weight = weight;
    }

    /// Drop the decoded raster, keeping the encoded source
    ///
    /// Returns whether a raster was resident.
    pub fn release_raster(&mut self) -> bool {
        self.raster.take().is_some()
    }

    /// Resident raster, decoding it from the stored source first if needed
    ///
    /// # Errors
    ///
    /// Returns `Decode` tagged with this record when the source is malformed
    pub fn ensure_raster(&mut self) -> Result<&RgbaImage> {
        let raster = if let Some(raster) = self.raster.take() {
            raster
        } else {
            let raster = self.source.decode().with_record(self.id)?;
            tracing::debug!(id = %self.id, "Re-decoded released raster");
            raster
        };

        Ok(self.raster.insert(raster))
    }
}
