//! Grid compositing and PNG export
//!
//! Records are drawn in order into row-major cells on a neutral background.
//! Records beyond the grid capacity are dropped. Cells whose raster was
//! released decode it again from the stored source; the export completes only
//! when every cell is drawn and fails as a whole if any decode fails.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::future::try_join_all;
use image::{ImageFormat, RgbaImage, imageops, imageops::FilterType};

use crate::grid::layout::{CellSize, GridLayout};
use crate::io::configuration::{BACKGROUND_COLOR, EXPORT_FILE_PREFIX};
use crate::io::error::{Result, SorterError, WithContext};
use crate::library::record::ImageRecord;

/// A scaled cell image and where it goes
struct DrawnCell {
    origin: (u32, u32),
    tile: RgbaImage,
}

fn scale_to_cell(raster: &RgbaImage, cell: CellSize) -> RgbaImage {
    if raster.dimensions() == (cell.width(), cell.height()) {
        raster.clone()
    } else {
        imageops::resize(raster, cell.width(), cell.height(), FilterType::Triangle)
    }
}

// Resident rasters are used as-is; released ones are decoded again
async fn render_cell(record: &ImageRecord, origin: (u32, u32), cell: CellSize) -> Result<DrawnCell> {
    let tile = if let Some(raster) = record.raster() {
        scale_to_cell(raster, cell)
    } else {
        let raster = record
            .source()
            .decode_async()
            .await
            .with_record(record.id())?;
        scale_to_cell(&raster, cell)
    };

    Ok(DrawnCell { origin, tile })
}

/// Composite records into a single canvas laid out by `layout`
///
/// # Errors
///
/// Returns `Decode` for the first record whose stored source cannot be
/// decoded; no canvas is produced in that case
pub async fn compose(records: &[&ImageRecord], layout: &GridLayout) -> Result<RgbaImage> {
    let (width, height) = layout.canvas_size();
    let cell = layout.cell();

    let cells = layout
        .visible(records)
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            layout
                .cell_origin(index)
                .map(|origin| render_cell(record, origin, cell))
        });
    let drawn = try_join_all(cells).await?;

    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND_COLOR);
    for placed in &drawn {
        imageops::overlay(
            &mut canvas,
            &placed.tile,
            i64::from(placed.origin.0),
            i64::from(placed.origin.1),
        );
    }

    Ok(canvas)
}

/// Suggested download name: `sorted-images-<unix millis>.png`
pub fn suggested_file_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    format!("{EXPORT_FILE_PREFIX}-{millis}.png")
}

/// Flattened export result with its suggested file name
#[derive(Debug, Clone)]
pub struct ExportedImage {
    image: RgbaImage,
    file_name: String,
}

impl ExportedImage {
    /// Pair a canvas with a file name
    pub fn new(image: RgbaImage, file_name: impl Into<String>) -> Self {
        Self {
            image,
            file_name: file_name.into(),
        }
    }

    /// Composited canvas
    pub const fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Suggested file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Take the canvas
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode the canvas as PNG
    ///
    /// # Errors
    ///
    /// Returns `ImageExport` if encoding fails
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        self.image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| SorterError::ImageExport {
                path: self.file_name.clone().into(),
                source: e,
            })?;
        Ok(buffer.into_inner())
    }

    /// Write the canvas as a PNG file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The image cannot be encoded or written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| SorterError::FileSystem {
                path: parent.to_path_buf(),
                operation: "create directory",
                source: e,
            })?;
        }

        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| SorterError::ImageExport {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!(path = %path.display(), "Saved exported grid");
        Ok(())
    }
}

/// Composite records and name the result for download
///
/// # Errors
///
/// Propagates any decode failure from [`compose`]
pub async fn export_grid(records: &[&ImageRecord], layout: &GridLayout) -> Result<ExportedImage> {
    let image = compose(records, layout).await?;
    let exported = ExportedImage::new(image, suggested_file_name());

    tracing::info!(
        cells = layout.visible(records).len(),
        width = exported.image().width(),
        height = exported.image().height(),
        file = exported.file_name(),
        "Exported grid"
    );

    Ok(exported)
}
