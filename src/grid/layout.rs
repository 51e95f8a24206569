//! Grid configuration and cell geometry shared by display and export

use crate::color::sampler::DisplayRect;
use crate::io::configuration::{
    DEFAULT_CELL_SIZE, DEFAULT_COLS, DEFAULT_GAP, DEFAULT_ROWS, MAX_CELL_SIZE, MAX_GAP,
    MAX_GRID_DIMENSION, MIN_GRID_DIMENSION,
};
use crate::io::error::{Result, invalid_parameter};
use crate::ordering::sort::HueDirection;

fn check_dimension(parameter: &'static str, value: u32) -> Result<u32> {
    if (MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION).contains(&value) {
        Ok(value)
    } else {
        Err(invalid_parameter(
            parameter,
            &value,
            &format!("must be between {MIN_GRID_DIMENSION} and {MAX_GRID_DIMENSION}"),
        ))
    }
}

fn check_gap(value: u32) -> Result<u32> {
    if value <= MAX_GAP {
        Ok(value)
    } else {
        Err(invalid_parameter(
            "gap",
            &value,
            &format!("must be at most {MAX_GAP} pixels"),
        ))
    }
}

/// Session grid settings
///
/// Changing any of these reorders and re-renders the grid but never
/// re-extracts colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    rows: u32,
    cols: u32,
    gap: u32,
    direction: HueDirection,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            gap: DEFAULT_GAP,
            direction: HueDirection::default(),
        }
    }
}

impl GridConfig {
    /// Validate and build a configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if rows or cols fall outside `1..=10`
    /// or gap exceeds 50
    pub fn new(rows: u32, cols: u32, gap: u32, direction: HueDirection) -> Result<Self> {
        Ok(Self {
            rows: check_dimension("rows", rows)?,
            cols: check_dimension("cols", cols)?,
            gap: check_gap(gap)?,
            direction,
        })
    }

    /// Number of rows
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Spacing between cells in pixels
    pub const fn gap(&self) -> u32 {
        self.gap
    }

    /// Hue ordering direction
    pub const fn direction(&self) -> HueDirection {
        self.direction
    }

    /// Number of cells, and so the most records the grid shows
    pub const fn capacity(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Change the row count
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `rows` is outside `1..=10`
    pub fn set_rows(&mut self, rows: u32) -> Result<()> {
        self.rows = check_dimension("rows", rows)?;
        Ok(())
    }

    /// Change the column count
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `cols` is outside `1..=10`
    pub fn set_cols(&mut self, cols: u32) -> Result<()> {
        self.cols = check_dimension("cols", cols)?;
        Ok(())
    }

    /// Change the gap
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `gap` exceeds 50
    pub fn set_gap(&mut self, gap: u32) -> Result<()> {
        self.gap = check_gap(gap)?;
        Ok(())
    }

    /// Change the hue direction
    pub const fn set_direction(&mut self, direction: HueDirection) {
        self.direction = direction;
    }
}

/// Rendered size of one grid cell in pixels
///
/// Both sides are in `1..=MAX_CELL_SIZE`, which keeps every canvas
/// dimension well inside `u32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSize {
    width: u32,
    height: u32,
}

impl Default for CellSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CELL_SIZE,
            height: DEFAULT_CELL_SIZE,
        }
    }
}

impl CellSize {
    /// Validate a cell size
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if either side is zero or larger than
    /// the maximum cell size
    pub fn new(width: u32, height: u32) -> Result<Self> {
        for (parameter, value) in [("cell width", width), ("cell height", height)] {
            if value == 0 || value > MAX_CELL_SIZE {
                return Err(invalid_parameter(
                    parameter,
                    &value,
                    &format!("must be between 1 and {MAX_CELL_SIZE} pixels"),
                ));
            }
        }
        Ok(Self { width, height })
    }

    /// Square cell
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `side` is zero or too large
    pub fn square(side: u32) -> Result<Self> {
        Self::new(side, side)
    }

    /// Cell width
    pub const fn width(self) -> u32 {
        self.width
    }

    /// Cell height
    pub const fn height(self) -> u32 {
        self.height
    }
}

/// Row and column of a cell, both zero-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    /// Zero-based row
    pub row: u32,
    /// Zero-based column
    pub col: u32,
}

/// Concrete grid geometry: configuration plus cell size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    config: GridConfig,
    cell: CellSize,
}

impl GridLayout {
    /// Layout with an explicit cell size
    pub const fn new(config: GridConfig, cell: CellSize) -> Self {
        Self { config, cell }
    }

    /// Layout whose square cells fill `container_width`
    ///
    /// Mirrors a display of `cols` equal-width square columns separated by
    /// `gap` pixels.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the width leaves no room for a cell
    pub fn fit_width(config: GridConfig, container_width: u32) -> Result<Self> {
        let gaps = (config.cols - 1) * config.gap;
        let side = container_width.saturating_sub(gaps) / config.cols;
        if side == 0 {
            return Err(invalid_parameter(
                "width",
                &container_width,
                &format!(
                    "too narrow for {} columns with a {} pixel gap",
                    config.cols, config.gap
                ),
            ));
        }
        Ok(Self::new(config, CellSize::square(side.min(MAX_CELL_SIZE))?))
    }

    /// Grid configuration
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Cell size
    pub const fn cell(&self) -> CellSize {
        self.cell
    }

    /// Canvas `(width, height)`: `cols*cellW + (cols-1)*gap` by `rows*cellH + (rows-1)*gap`
    pub const fn canvas_size(&self) -> (u32, u32) {
        let gap = self.config.gap;
        (
            self.config.cols * self.cell.width + (self.config.cols - 1) * gap,
            self.config.rows * self.cell.height + (self.config.rows - 1) * gap,
        )
    }

    /// Row and column of the `index`-th cell in row-major order
    ///
    /// Returns `None` for indices past the last cell.
    pub const fn cell_position(&self, index: usize) -> Option<CellPosition> {
        if index >= self.config.capacity() {
            return None;
        }
        let cols = self.config.cols as usize;
        Some(CellPosition {
            row: (index / cols) as u32,
            col: (index % cols) as u32,
        })
    }

    /// Top-left pixel of the `index`-th cell
    pub fn cell_origin(&self, index: usize) -> Option<(u32, u32)> {
        self.cell_position(index).map(|position| {
            (
                position.col * (self.cell.width + self.config.gap),
                position.row * (self.cell.height + self.config.gap),
            )
        })
    }

    /// Display rectangle of the `index`-th cell
    pub fn cell_rect(&self, index: usize) -> Option<DisplayRect> {
        self.cell_origin(index).map(|(x, y)| {
            DisplayRect::new(
                f64::from(x),
                f64::from(y),
                f64::from(self.cell.width),
                f64::from(self.cell.height),
            )
        })
    }

    /// The prefix of `items` that fits in the grid; the rest is not shown
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        items
            .get(..self.config.capacity().min(items.len()))
            .unwrap_or(&[])
    }
}
