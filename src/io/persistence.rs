//! Project persistence through an opaque key-value store
//!
//! Only grid settings and per-image `(id, name, color, weight)` entries are
//! stored. Raster data never is, so restored images have to be ingested again.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::hsl::Rgb;
use crate::grid::layout::GridConfig;
use crate::io::configuration::PROJECT_KEY;
use crate::io::error::{Result, SorterError};
use crate::library::record::{ImageRecord, RecordId, Weight};
use crate::ordering::sort::HueDirection;

/// Failure reported by a key-value store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Not enough space for the value
    QuotaExceeded {
        /// Bytes the write needed
        needed: usize,
        /// Bytes still free
        available: usize,
    },
    /// The store cannot be used at all
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuotaExceeded { needed, available } => {
                write!(f, "quota exceeded: needed {needed} bytes, {available} available")
            }
            Self::Unavailable(reason) => write!(f, "store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// String key-value storage
pub trait KeyValueStore {
    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the store cannot be read
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns `QuotaExceeded` when there is no room and `Unavailable` on other failures
    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StoreError>;

    /// Delete a value; deleting a missing key succeeds
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the store cannot be written
    fn remove(&mut self, key: &str) -> std::result::Result<(), StoreError>;
}

/// In-memory store with an optional byte quota over keys plus values
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Unlimited store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store refusing writes beyond `quota` bytes
    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        if let Some(quota) = self.quota {
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(self.used_excluding(key));
            if needed > available {
                return Err(StoreError::QuotaExceeded { needed, available });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> std::result::Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store holding one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the values
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn staging_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json.tmp"))
    }
}

fn unavailable(path: &Path, error: &std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {error}", path.display()))
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(&path, &e)),
        }
    }

    // Staged next to the target, then renamed over it
    fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        std::fs::create_dir_all(&self.root).map_err(|e| unavailable(&self.root, &e))?;
        let path = self.path_for(key);
        let staging = self.staging_path_for(key);

        if let Err(e) = std::fs::write(&staging, value) {
            let _ = std::fs::remove_file(&staging);
            return Err(match e.kind() {
                std::io::ErrorKind::StorageFull => StoreError::QuotaExceeded {
                    needed: value.len(),
                    available: 0,
                },
                _ => unavailable(&staging, &e),
            });
        }

        std::fs::rename(&staging, &path).map_err(|e| {
            let _ = std::fs::remove_file(&staging);
            unavailable(&path, &e)
        })
    }

    fn remove(&mut self, key: &str) -> std::result::Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(&path, &e)),
        }
    }
}

/// Persisted grid settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Grid rows
    pub rows: u32,
    /// Grid columns
    pub cols: u32,
    /// Gap in pixels
    pub gap: u32,
    /// Hue ordering direction
    pub sort_direction: HueDirection,
}

impl From<GridConfig> for ProjectSettings {
    fn from(config: GridConfig) -> Self {
        Self {
            rows: config.rows(),
            cols: config.cols(),
            gap: config.gap(),
            sort_direction: config.direction(),
        }
    }
}

impl TryFrom<ProjectSettings> for GridConfig {
    type Error = SorterError;

    fn try_from(settings: ProjectSettings) -> Result<Self> {
        Self::new(
            settings.rows,
            settings.cols,
            settings.gap,
            settings.sort_direction,
        )
    }
}

/// Persisted per-image entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRecord {
    /// Identifier in the saving session
    pub id: RecordId,
    /// Original file name, used to match re-ingested images
    #[serde(default)]
    pub name: String,
    /// Representative color
    pub color: Rgb,
    /// Weight
    pub weight: Weight,
}

impl From<&ImageRecord> for SavedRecord {
    fn from(record: &ImageRecord) -> Self {
        Self {
            id: record.id(),
            name: record.name().to_string(),
            color: record.color(),
            weight: record.weight(),
        }
    }
}

/// Everything persisted for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Per-image entries
    #[serde(default)]
    pub images: Vec<SavedRecord>,
    /// Grid settings, absent in snapshots saved before any were chosen
    #[serde(default)]
    pub settings: Option<ProjectSettings>,
}

/// Write a snapshot under [`PROJECT_KEY`]
///
/// When the store is full the previously saved project is removed to
/// recover space and the write is abandoned.
///
/// # Errors
///
/// Returns `StorageFull` on quota exhaustion, `StorageUnavailable` when the
/// store fails otherwise, and `Serialization` if encoding fails
pub fn save_project(store: &mut dyn KeyValueStore, snapshot: &ProjectSnapshot) -> Result<()> {
    let json = serde_json::to_string(snapshot)?;

    match store.set(PROJECT_KEY, &json) {
        Ok(()) => {
            tracing::debug!(
                images = snapshot.images.len(),
                bytes = json.len(),
                "Saved project"
            );
            Ok(())
        }
        Err(StoreError::QuotaExceeded { needed, available }) => {
            let cleared = store
                .remove(PROJECT_KEY)
                .inspect_err(|e| tracing::warn!(error = %e, "Could not clear saved project"))
                .is_ok();
            tracing::warn!(needed, available, cleared, "Project storage is full");
            Err(SorterError::StorageFull {
                key: PROJECT_KEY.to_string(),
                cleared,
            })
        }
        Err(StoreError::Unavailable(reason)) => Err(SorterError::StorageUnavailable {
            key: PROJECT_KEY.to_string(),
            reason,
        }),
    }
}

/// Read the snapshot stored under [`PROJECT_KEY`], if any
///
/// # Errors
///
/// Returns `StorageUnavailable` if the store cannot be read and
/// `Serialization` if the stored value is not a valid snapshot
pub fn load_project(store: &dyn KeyValueStore) -> Result<Option<ProjectSnapshot>> {
    let stored = store
        .get(PROJECT_KEY)
        .map_err(|e| SorterError::StorageUnavailable {
            key: PROJECT_KEY.to_string(),
            reason: e.to_string(),
        })?;

    let Some(json) = stored else {
        tracing::debug!("No saved project found");
        return Ok(None);
    };

    let snapshot: ProjectSnapshot = serde_json::from_str(&json)?;
    tracing::debug!(images = snapshot.images.len(), "Loaded project");
    Ok(Some(snapshot))
}
