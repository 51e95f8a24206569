//! Command-line interface: ingest a batch, order it by color and export the grid

use crate::color::sampler::{DisplayRect, PointerPosition};
use crate::grid::layout::{CellSize, GridConfig, GridLayout};
use crate::io::decode::decode_files;
use crate::io::error::{Result, SorterError};
use crate::io::persistence::{FileStore, load_project, save_project};
use crate::io::progress::ProgressManager;
use crate::library::record::{ImageRecord, RecordId, Weight};
use crate::library::session::Session;
use crate::ordering::sort::HueDirection;
use clap::Parser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extensions picked up when scanning a directory
const DIRECTORY_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Weight to assign to the image with a given file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightAssignment {
    /// File name of the image
    pub name: String,
    /// Weight to assign
    pub weight: Weight,
}

/// Color pick on the image with a given file name
#[derive(Debug, Clone, PartialEq)]
pub struct PickRequest {
    /// File name of the image
    pub name: String,
    /// Pointer position inside the rendered cell
    pub pointer: PointerPosition,
}

/// Parse `NAME=WEIGHT`
///
/// # Errors
///
/// Returns a message if the separator is missing or the weight is not in `1..=5`
pub fn parse_weight_assignment(value: &str) -> std::result::Result<WeightAssignment, String> {
    let (name, weight) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=WEIGHT, got '{value}'"))?;
    let weight: u8 = weight
        .trim()
        .parse()
        .map_err(|e| format!("invalid weight '{weight}': {e}"))?;
    let weight = Weight::new(weight).map_err(|e| e.to_string())?;

    Ok(WeightAssignment {
        name: name.to_string(),
        weight,
    })
}

/// Parse `NAME@X,Y`
///
/// # Errors
///
/// Returns a message if a separator is missing or a coordinate is not a number
pub fn parse_pick_request(value: &str) -> std::result::Result<PickRequest, String> {
    let (name, coordinates) = value
        .rsplit_once('@')
        .ok_or_else(|| format!("expected NAME@X,Y, got '{value}'"))?;
    let (x, y) = coordinates
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y coordinates, got '{coordinates}'"))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|e| format!("invalid x coordinate '{x}': {e}"))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|e| format!("invalid y coordinate '{y}': {e}"))?;

    Ok(PickRequest {
        name: name.to_string(),
        pointer: PointerPosition::new(x, y),
    })
}

#[derive(Parser)]
#[command(name = "huegrid")]
#[command(
    author,
    version,
    about = "Order images by dominant color and export them as one grid"
)]
/// Command-line arguments for the color grid tool
pub struct Cli {
    /// PNG or JPEG files, or directories containing them
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Grid rows (1-10)
    #[arg(short, long)]
    pub rows: Option<u32>,

    /// Grid columns (1-10)
    #[arg(short, long)]
    pub cols: Option<u32>,

    /// Gap between cells in pixels (0-50)
    #[arg(short, long)]
    pub gap: Option<u32>,

    /// Hue ordering within each weight
    #[arg(short, long, value_enum)]
    pub direction: Option<HueDirection>,

    /// Edge length of a square cell in pixels
    #[arg(long, conflicts_with = "width")]
    pub cell_size: Option<u32>,

    /// Total grid width in pixels; the cell size is derived from it
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Assign a weight (1-5) to an image by file name
    #[arg(long = "weight", value_name = "NAME=WEIGHT", value_parser = parse_weight_assignment)]
    pub weights: Vec<WeightAssignment>,

    /// Override an image's color with the pixel under a point of its cell
    #[arg(long = "pick", value_name = "NAME@X,Y", value_parser = parse_pick_request)]
    pub picks: Vec<PickRequest>,

    /// Output PNG path (defaults to a timestamped name in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory where settings are restored from and saved to
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Apply explicitly given grid settings on top of `base`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if any given value is out of range
    pub fn grid_config(&self, base: GridConfig) -> Result<GridConfig> {
        let mut config = base;
        if let Some(rows) = self.rows {
            config.set_rows(rows)?;
        }
        if let Some(cols) = self.cols {
            config.set_cols(cols)?;
        }
        if let Some(gap) = self.gap {
            config.set_gap(gap)?;
        }
        if let Some(direction) = self.direction {
            config.set_direction(direction);
        }
        Ok(config)
    }

    /// Grid geometry from `--width`, `--cell-size` or the default cell size
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the size leaves no room for a cell
    pub fn layout(&self, config: GridConfig) -> Result<GridLayout> {
        match (self.width, self.cell_size) {
            (Some(width), _) => GridLayout::fit_width(config, width),
            (None, Some(side)) => Ok(GridLayout::new(config, CellSize::square(side)?)),
            (None, None) => Ok(GridLayout::new(config, CellSize::default())),
        }
    }
}

/// Runs one ingest, order and export pass
pub struct BatchRunner {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl BatchRunner {
    /// Create a runner with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process inputs according to CLI arguments
    ///
    /// Returns the path of the exported image, or `None` when only settings
    /// were saved.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input path does not exist
    /// - The batch exceeds the image cap or no image could be decoded
    /// - A grid setting is out of range
    /// - The export cannot be composited or written
    pub async fn run(&self) -> Result<Option<PathBuf>> {
        let mut store = self.cli.project.as_ref().map(FileStore::new);
        let mut session = Session::new();

        if let Some(store) = &store
            && let Some(snapshot) = load_project(store)?
        {
            session.restore(snapshot)?;
        }
        session.set_config(self.cli.grid_config(*session.config())?);
        let layout = self.cli.layout(*session.config())?;

        let files = self.collect_files()?;
        if files.is_empty()
            && let Some(store) = &mut store
        {
            save_project(store, &session.snapshot())?;
            tracing::info!(path = %store.root().display(), "Saved settings");
            return Ok(None);
        }

        session.check_capacity(files.len())?;
        self.ingest(&mut session, &files).await?;
        self.apply_weights(&mut session)?;
        self.apply_picks(&mut session, layout.cell())?;
        session.process()?;

        if let Some(ref pm) = self.progress_manager {
            pm.start_export(session.visible_records().len());
        }
        let exported = session.export(Some(layout.cell())).await?;
        let output = self
            .cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(exported.file_name()));
        exported.save(&output)?;

        if let Some(ref pm) = self.progress_manager {
            pm.complete_export(exported.file_name());
            pm.finish();
        }

        // A failed save leaves the export and the session intact
        if let Some(store) = &mut store
            && let Err(e) = save_project(store, &session.snapshot())
        {
            tracing::warn!(error = %e, "Could not save project");
        }

        Ok(Some(output))
    }

    async fn ingest(&self, session: &mut Session, files: &[PathBuf]) -> Result<()> {
        if let Some(ref pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        let results = decode_files(files, |path, succeeded| {
            if let Some(ref pm) = self.progress_manager {
                pm.complete_file(path, succeeded);
            }
        })
        .await;

        let decoded: Vec<_> = files
            .iter()
            .zip(results)
            .filter_map(|(path, result)| {
                result
                    .inspect_err(|e| {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping image");
                    })
                    .ok()
            })
            .collect();

        session.ingest_all(decoded)?;
        Ok(())
    }

    fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for target in &self.cli.inputs {
            if target.is_file() {
                files.push(target.clone());
            } else if target.is_dir() {
                let mut found = Vec::new();
                let entries = std::fs::read_dir(target).map_err(|e| SorterError::FileSystem {
                    path: target.clone(),
                    operation: "read directory",
                    source: e,
                })?;
                for entry in entries {
                    let path = entry?.path();
                    if path.is_file() && has_image_extension(&path) {
                        found.push(path);
                    }
                }
                found.sort();
                files.extend(found);
            } else {
                return Err(SorterError::FileSystem {
                    path: target.clone(),
                    operation: "open input",
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "input is neither a file nor a directory",
                    ),
                });
            }
        }

        Ok(files)
    }

    fn apply_weights(&self, session: &mut Session) -> Result<()> {
        for assignment in &self.cli.weights {
            let Some(id) = find_by_name(session, &assignment.name) else {
                tracing::warn!(name = %assignment.name, "No image to weight");
                continue;
            };
            session.set_weight(id, assignment.weight)?;
        }
        Ok(())
    }

    fn apply_picks(&self, session: &mut Session, cell: CellSize) -> Result<()> {
        let rect = DisplayRect::at_origin(f64::from(cell.width()), f64::from(cell.height()));

        for request in &self.cli.picks {
            let Some(id) = find_by_name(session, &request.name) else {
                tracing::warn!(name = %request.name, "No image to pick from");
                continue;
            };
            session.begin_pick(id)?;
            session.commit_pick(request.pointer, rect)?;
        }
        Ok(())
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            DIRECTORY_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

fn find_by_name(session: &Session, name: &str) -> Option<RecordId> {
    session
        .records()
        .iter()
        .find(|record| record.name() == name)
        .map(ImageRecord::id)
}
