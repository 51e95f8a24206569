//! Session state: the record set, grid settings, interaction mode and display order
//!
//! A session starts unordered and shows records in ingestion order. Once
//! [`Session::process`] has run, every change to membership, a weight, a
//! color or the grid settings re-sorts the whole set before returning, so
//! readers never see a stale or half-updated order.

use std::collections::BTreeSet;

use crate::color::hsl::Rgb;
use crate::color::sampler::{DisplayRect, PointerPosition, sample_pixel};
use crate::grid::compositor::{ExportedImage, export_grid};
use crate::grid::layout::{CellSize, GridConfig, GridLayout};
use crate::io::configuration::MAX_IMAGES;
use crate::io::decode::DecodedImage;
use crate::io::error::{Result, SorterError, precondition};
use crate::io::persistence::{ProjectSnapshot, SavedRecord};
use crate::library::record::{ImageRecord, RecordId, Weight};
use crate::ordering::sort::{HueDirection, SortedView, sort_records};

/// What the user is currently doing with a record
///
/// At most one record can be picked or have its weight editor open, and
/// never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Nothing in progress
    #[default]
    Idle,
    /// Pointer input samples colors from this record
    Picking(RecordId),
    /// The weight editor is open for this record
    EditingWeight(RecordId),
}

/// One editing session over a batch of images
#[derive(Debug, Default)]
pub struct Session {
    records: Vec<ImageRecord>,
    next_id: u64,
    config: GridConfig,
    mode: InteractionMode,
    preview: Option<Rgb>,
    selection: BTreeSet<RecordId>,
    sorted: Option<SortedView>,
    saved: Vec<SavedRecord>,
}

impl Session {
    /// Empty session with default grid settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty session with the given grid settings
    pub fn with_config(config: GridConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current grid settings
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Records in ingestion order
    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Number of records
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the session holds no records
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record
    pub fn record(&self, id: RecordId) -> Option<&ImageRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    fn require(&self, id: RecordId) -> Result<()> {
        if self.record(id).is_some() {
            Ok(())
        } else {
            Err(SorterError::UnknownRecord { id })
        }
    }

    fn record_mut(&mut self, id: RecordId) -> Result<&mut ImageRecord> {
        self.records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or(SorterError::UnknownRecord { id })
    }

    /// Current interaction mode
    pub const fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Color under the pointer while picking
    pub const fn preview(&self) -> Option<Rgb> {
        self.preview
    }

    /// Selected records
    pub const fn selection(&self) -> &BTreeSet<RecordId> {
        &self.selection
    }

    /// Whether an ordering has been computed
    pub const fn is_processed(&self) -> bool {
        self.sorted.is_some()
    }

    /// Current ordering, once processed
    pub const fn sorted_view(&self) -> Option<&SortedView> {
        self.sorted.as_ref()
    }

    /// Saved entries still waiting for their image to be ingested again
    pub fn pending_restores(&self) -> &[SavedRecord] {
        &self.saved
    }

    // Full recomputation after every qualifying change
    fn refresh(&mut self) {
        if self.sorted.is_some() {
            self.sorted = Some(sort_records(&self.records, self.config.direction()));
        }
    }

    /// Check that `incoming` more records fit under the cap
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the total would pass [`MAX_IMAGES`]
    pub const fn check_capacity(&self, incoming: usize) -> Result<()> {
        if self.records.len() + incoming > MAX_IMAGES {
            return Err(SorterError::CapacityExceeded {
                current: self.records.len(),
                incoming,
                limit: MAX_IMAGES,
            });
        }
        Ok(())
    }

    fn insert(&mut self, decoded: DecodedImage) -> RecordId {
        let id = RecordId::new(self.next_id);
        self.next_id += 1;

        let mut record = ImageRecord::new(id, decoded);
        if let Some(index) = self
            .saved
            .iter()
            .position(|saved| !saved.name.is_empty() && saved.name == record.name())
        {
            let saved = self.saved.remove(index);
            record.set_weight(saved.weight);
            record.set_color(saved.color);
            tracing::debug!(id = %id, name = record.name(), "Restored saved weight and color");
        }

        tracing::info!(
            id = %id,
            name = record.name(),
            color = %record.color(),
            "Ingested image"
        );
        self.records.push(record);
        id
    }

    /// Add one decoded image as a new record
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the session is full
    pub fn ingest(&mut self, decoded: DecodedImage) -> Result<RecordId> {
        self.check_capacity(1)?;
        let id = self.insert(decoded);
        self.refresh();
        Ok(id)
    }

    /// Add a batch of decoded images, all or none
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if the whole batch does not fit; nothing is added
    pub fn ingest_all(&mut self, batch: Vec<DecodedImage>) -> Result<Vec<RecordId>> {
        self.check_capacity(batch.len())?;
        let ids: Vec<RecordId> = batch.into_iter().map(|decoded| self.insert(decoded)).collect();
        self.refresh();
        Ok(ids)
    }

    /// Compute the display ordering
    ///
    /// # Errors
    ///
    /// Returns `Precondition` when there are no records
    pub fn process(&mut self) -> Result<&SortedView> {
        if self.records.is_empty() {
            return Err(precondition("process images", &"no images have been added"));
        }

        let view = self.sorted.insert(sort_records(&self.records, self.config.direction()));
        tracing::info!(images = view.len(), "Sorted images");
        Ok(view)
    }

    /// Records in display order: sorted once processed, ingestion order before
    pub fn display_order(&self) -> Vec<&ImageRecord> {
        match &self.sorted {
            Some(view) => view.ids().iter().filter_map(|&id| self.record(id)).collect(),
            None => self.records.iter().collect(),
        }
    }

    /// The records that fit in the grid, in display order
    pub fn visible_records(&self) -> Vec<&ImageRecord> {
        let mut order = self.display_order();
        order.truncate(self.config.capacity());
        order
    }

    /// Replace all grid settings
    pub fn set_config(&mut self, config: GridConfig) {
        self.config = config;
        self.refresh();
    }

    /// Change the row count
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `rows` is out of range
    pub fn set_rows(&mut self, rows: u32) -> Result<()> {
        self.config.set_rows(rows)?;
        self.refresh();
        Ok(())
    }

    /// Change the column count
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `cols` is out of range
    pub fn set_cols(&mut self, cols: u32) -> Result<()> {
        self.config.set_cols(cols)?;
        self.refresh();
        Ok(())
    }

    /// Change the gap
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `gap` is out of range
    pub fn set_gap(&mut self, gap: u32) -> Result<()> {
        self.config.set_gap(gap)?;
        self.refresh();
        Ok(())
    }

    /// Change the hue direction
    pub fn set_direction(&mut self, direction: HueDirection) {
        self.config.set_direction(direction);
        self.refresh();
    }

    /// Change a record's weight
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecord` if no record has this id
    pub fn set_weight(&mut self, id: RecordId, weight: Weight) -> Result<()> {
        self.record_mut(id)?.set_weight(weight);
        self.refresh();
        Ok(())
    }

    /// Override a record's color directly
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecord` if no record has this id
    pub fn set_color(&mut self, id: RecordId, color: Rgb) -> Result<()> {
        self.record_mut(id)?.set_color(color);
        self.refresh();
        Ok(())
    }

    /// Open the weight editor for a record, or close it if already open
    ///
    /// Any color pick in progress is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecord` if no record has this id
    pub fn toggle_weight_editor(&mut self, id: RecordId) -> Result<InteractionMode> {
        self.require(id)?;
        self.preview = None;
        self.mode = if self.mode == InteractionMode::EditingWeight(id) {
            InteractionMode::Idle
        } else {
            InteractionMode::EditingWeight(id)
        };
        Ok(self.mode)
    }

    /// Choose a weight from the editor, closing it
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecord` if no record has this id
    pub fn choose_weight(&mut self, id: RecordId, weight: Weight) -> Result<()> {
        self.set_weight(id, weight)?;
        if self.mode == InteractionMode::EditingWeight(id) {
            self.mode = InteractionMode::Idle;
        }
        Ok(())
    }

    /// Enter picking mode for a record
    ///
    /// Closes the weight editor and replaces any other pick. The record's
    /// raster is decoded again first if it had been released.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecord` if no record has this id and `Decode` if its
    /// raster cannot be rebuilt
    pub fn begin_pick(&mut self, id: RecordId) -> Result<()> {
        self.record_mut(id)?.ensure_raster()?;
        self.mode = InteractionMode::Picking(id);
        self.preview = None;
        tracing::debug!(id = %id, "Started color picking");
        Ok(())
    }

    /// Leave picking mode without changing any color
    pub const fn cancel_pick(&mut self) {
        if matches!(self.mode, InteractionMode::Picking(_)) {
            self.mode = InteractionMode::Idle;
        }
        self.preview = None;
    }

    fn sample_picked(
        &mut self,
        pointer: PointerPosition,
        rect: DisplayRect,
    ) -> Result<Option<(RecordId, Rgb)>> {
        let InteractionMode::Picking(id) = self.mode else {
            return Ok(None);
        };
        let raster = self.record_mut(id)?.ensure_raster()?;
        Ok(sample_pixel(raster, pointer, rect).map(|color| (id, color)))
    }

    /// Show the color under the pointer without committing it
    ///
    /// Returns `None` when no record is being picked.
    ///
    /// # Errors
    ///
    /// Returns `Decode` if the picked record's raster cannot be rebuilt
    pub fn preview_pick(
        &mut self,
        pointer: PointerPosition,
        rect: DisplayRect,
    ) -> Result<Option<Rgb>> {
        let sampled = self.sample_picked(pointer, rect)?;
        self.preview = sampled.map(|(_, color)| color);
        Ok(self.preview)
    }

    /// Commit the color under the pointer and leave picking mode
    ///
    /// # Errors
    ///
    /// Returns `Precondition` when no record is being picked and `Decode` if
    /// its raster cannot be rebuilt
    pub fn commit_pick(&mut self, pointer: PointerPosition, rect: DisplayRect) -> Result<Rgb> {
        let (id, color) = self
            .sample_picked(pointer, rect)?
            .ok_or_else(|| precondition("commit color", &"no image is being picked"))?;

        self.record_mut(id)?.set_color(color);
        self.mode = InteractionMode::Idle;
        self.preview = None;
        self.refresh();

        tracing::info!(id = %id, %color, "Picked color");
        Ok(color)
    }

    /// Toggle a record in or out of the selection
    ///
    /// Selection is frozen while picking. Returns whether the record is
    /// selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecord` if no record has this id
    pub fn toggle_selection(&mut self, id: RecordId) -> Result<bool> {
        self.require(id)?;
        if matches!(self.mode, InteractionMode::Picking(_)) {
            return Ok(self.selection.contains(&id));
        }
        if self.selection.remove(&id) {
            Ok(false)
        } else {
            self.selection.insert(id);
            Ok(true)
        }
    }

    /// Remove records from the set and from the current ordering
    ///
    /// Unknown ids are ignored. Returns the ids actually removed.
    pub fn delete(&mut self, ids: &[RecordId]) -> Vec<RecordId> {
        let doomed: std::collections::HashSet<RecordId> = ids
            .iter()
            .copied()
            .filter(|&id| self.record(id).is_some())
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }

        self.records.retain(|record| !doomed.contains(&record.id()));
        if let Some(view) = &mut self.sorted {
            view.remove(&doomed);
        }
        self.selection.retain(|id| !doomed.contains(id));
        if let InteractionMode::Picking(id) | InteractionMode::EditingWeight(id) = self.mode
            && doomed.contains(&id)
        {
            self.mode = InteractionMode::Idle;
            self.preview = None;
        }

        tracing::info!(count = doomed.len(), "Deleted images");
        ids.iter().copied().filter(|id| doomed.contains(id)).collect()
    }

    /// Delete every selected record and clear the selection
    pub fn delete_selected(&mut self) -> Vec<RecordId> {
        let selected: Vec<RecordId> = std::mem::take(&mut self.selection).into_iter().collect();
        self.delete(&selected)
    }

    /// Drop a record's decoded raster, keeping its encoded source
    ///
    /// # Errors
    ///
    /// Returns `UnknownRecord` if no record has this id
    pub fn release_raster(&mut self, id: RecordId) -> Result<bool> {
        Ok(self.record_mut(id)?.release_raster())
    }

    /// Persistable view of the session
    pub fn snapshot(&self) -> ProjectSnapshot {
        ProjectSnapshot {
            images: self.records.iter().map(SavedRecord::from).collect(),
            settings: Some(self.config.into()),
        }
    }

    /// Apply a saved snapshot
    ///
    /// Settings take effect immediately. Saved image entries are kept and
    /// applied to images with the same name when they are ingested again.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the saved settings are out of range;
    /// the session is left unchanged
    pub fn restore(&mut self, snapshot: ProjectSnapshot) -> Result<()> {
        if let Some(settings) = snapshot.settings {
            self.config = GridConfig::try_from(settings)?;
        }
        self.saved = snapshot.images;
        self.refresh();

        tracing::info!(
            rows = self.config.rows(),
            cols = self.config.cols(),
            gap = self.config.gap(),
            saved_images = self.saved.len(),
            "Restored project"
        );
        Ok(())
    }

    /// Grid geometry for a given cell size
    pub const fn layout(&self, cell: CellSize) -> GridLayout {
        GridLayout::new(self.config, cell)
    }

    /// Composite the current ordering into one image
    ///
    /// `cell` is the rendered cell size; without one the default size is used.
    ///
    /// # Errors
    ///
    /// Returns `Precondition` before [`Session::process`] has produced a
    /// non-empty ordering, and `Decode` if any released raster fails to decode
    pub async fn export(&self, cell: Option<CellSize>) -> Result<ExportedImage> {
        let Some(view) = self.sorted.as_ref().filter(|view| !view.is_empty()) else {
            return Err(precondition(
                "export",
                &"process the images before exporting",
            ));
        };

        let layout = self.layout(cell.unwrap_or_default());
        let records: Vec<&ImageRecord> = view
            .first(self.config.capacity())
            .iter()
            .filter_map(|&id| self.record(id))
            .collect();

        export_grid(&records, &layout).await
    }
}
