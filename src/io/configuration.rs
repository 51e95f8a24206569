//! Pipeline constants and runtime configuration defaults

use image::Rgba;

use crate::color::hsl::Rgb;

// Ingestion limits
/// Maximum number of records a session may hold
pub const MAX_IMAGES: usize = 60;

// Grid settings
/// Default number of grid rows
pub const DEFAULT_ROWS: u32 = 3;
/// Default number of grid columns
pub const DEFAULT_COLS: u32 = 4;
/// Default spacing between cells in pixels
pub const DEFAULT_GAP: u32 = 10;
/// Smallest allowed row or column count
pub const MIN_GRID_DIMENSION: u32 = 1;
/// Largest allowed row or column count
pub const MAX_GRID_DIMENSION: u32 = 10;
/// Largest allowed gap in pixels
pub const MAX_GAP: u32 = 50;

// Weighting
/// Lowest user-assignable weight
pub const MIN_WEIGHT: u8 = 1;
/// Highest user-assignable weight
pub const MAX_WEIGHT: u8 = 5;
/// Weight given to freshly ingested records
pub const DEFAULT_WEIGHT: u8 = 3;

// Dominant color analysis
/// Longest side, in pixels, an image is reduced to before counting colors
pub const ANALYSIS_MAX_SIDE: u32 = 100;
/// Width of a quantization bucket per channel
pub const QUANTIZATION_STEP: u8 = 16;
/// Pixels with alpha below this value are ignored
pub const ALPHA_THRESHOLD: u8 = 128;
/// Pixels with every channel above this value count as near-white and are ignored
pub const NEAR_WHITE_THRESHOLD: u8 = 240;
/// Color reported when no pixel survives the exclusion filters
pub const FALLBACK_COLOR: Rgb = Rgb::new(128, 128, 128);

// Export settings
/// Cell edge length used when no rendered cell size is known
pub const DEFAULT_CELL_SIZE: u32 = 200;
// Keeps a 10x10 canvas well inside u32 pixel coordinates
/// Largest accepted cell edge length
pub const MAX_CELL_SIZE: u32 = 2048;
/// Canvas fill behind and between cells (`#f3f4f6`)
pub const BACKGROUND_COLOR: Rgba<u8> = Rgba([0xf3, 0xf4, 0xf6, 0xff]);
/// Prefix of suggested export filenames
pub const EXPORT_FILE_PREFIX: &str = "sorted-images";

// Persistence
/// Key under which the project snapshot is stored
pub const PROJECT_KEY: &str = "huegrid-project";

// Progress bar display settings
/// Width of the progress bar in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
