//! Ingestion: encoding detection and asynchronous decoding of PNG and JPEG sources

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::join_all;
use image::{ImageFormat, RgbaImage};

use crate::io::error::{Result, SorterError};

/// Accepted input encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
}

impl SourceFormat {
    /// Detect the encoding from the leading bytes
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` when the bytes are not PNG or JPEG
    pub fn detect(name: &str, bytes: &[u8]) -> Result<Self> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => Ok(Self::Png),
            Ok(ImageFormat::Jpeg) => Ok(Self::Jpeg),
            Ok(other) => Err(SorterError::UnsupportedFormat {
                name: name.to_string(),
                detected: Some(format!("{other:?}")),
            }),
            Err(_unrecognized) => Err(SorterError::UnsupportedFormat {
                name: name.to_string(),
                detected: None,
            }),
        }
    }

    /// Matching `image` crate format
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => f.write_str("image/png"),
            Self::Jpeg => f.write_str("image/jpeg"),
        }
    }
}

/// Encoded bytes of an ingested image, kept so its raster can be rebuilt
#[derive(Debug, Clone)]
pub struct EncodedImage {
    format: SourceFormat,
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    /// Wrap encoded bytes after checking their encoding
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` when the bytes are not PNG or JPEG
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<Self> {
        let format = SourceFormat::detect(name, &bytes)?;
        Ok(Self {
            format,
            bytes: bytes.into(),
        })
    }

    /// Encoding of the stored bytes
    pub const fn format(&self) -> SourceFormat {
        self.format
    }

    /// Stored bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode into an RGBA raster on the current task
    ///
    /// # Errors
    ///
    /// Returns `Decode` when the bytes are malformed
    pub fn decode(&self) -> Result<RgbaImage> {
        let image = image::load_from_memory_with_format(&self.bytes, self.format.image_format())?;
        Ok(image.to_rgba8())
    }

    /// Decode after yielding to the scheduler, so pending decodes interleave
    ///
    /// # Errors
    ///
    /// Returns `Decode` when the bytes are malformed
    pub async fn decode_async(&self) -> Result<RgbaImage> {
        tokio::task::yield_now().await;
        self.decode()
    }
}

/// A successfully decoded upload, ready to become a record
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Original file name
    pub name: String,
    /// Stored encoded source
    pub source: EncodedImage,
    /// Decoded raster
    pub raster: RgbaImage,
}

/// Check and decode an in-memory upload
///
/// # Errors
///
/// Returns `UnsupportedFormat` for other encodings and `Decode` for malformed data
pub async fn decode_bytes(name: impl Into<String> + Send, bytes: Vec<u8>) -> Result<DecodedImage> {
    let name = name.into();
    let source = EncodedImage::from_bytes(&name, bytes)?;
    let raster = source.decode_async().await?;

    tracing::debug!(
        name = %name,
        format = %source.format(),
        width = raster.width(),
        height = raster.height(),
        "Decoded image"
    );

    Ok(DecodedImage {
        name,
        source,
        raster,
    })
}

/// Read and decode an image file
///
/// # Errors
///
/// Returns `FileSystem` if the file cannot be read, `UnsupportedFormat` for
/// other encodings and `ImageLoad` for malformed data
pub async fn decode_file(path: &Path) -> Result<DecodedImage> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SorterError::FileSystem {
            path: path.to_path_buf(),
            operation: "read",
            source: e,
        })?;

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned();

    decode_bytes(name, bytes).await.map_err(|e| match e {
        SorterError::Decode { source, .. } => SorterError::ImageLoad {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Decode a batch of files concurrently on the current task
///
/// Results come back in submission order. `on_complete` runs as each file
/// settles, with whether it succeeded.
pub async fn decode_files<F>(paths: &[PathBuf], on_complete: F) -> Vec<Result<DecodedImage>>
where
    F: Fn(&Path, bool) + Send + Sync,
{
    let on_complete = &on_complete;
    join_all(paths.iter().map(|path| async move {
        let result = decode_file(path).await;
        on_complete(path, result.is_ok());
        result
    }))
    .await
}
