//! Error types and context management for ingestion, ordering and export

use std::fmt;
use std::path::PathBuf;

use crate::library::record::RecordId;

/// Main error type for all pipeline operations
#[derive(Debug)]
pub enum SorterError {
    /// Failed to read or decode an image at ingestion
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Input is neither PNG nor JPEG
    UnsupportedFormat {
        /// Name of the rejected input
        name: String,
        /// Encoding that was detected, if any
        detected: Option<String>,
    },

    /// Accepting the batch would exceed the record cap
    CapacityExceeded {
        /// Records already held
        current: usize,
        /// Records in the rejected batch
        incoming: usize,
        /// Maximum number of records
        limit: usize,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// No record carries this identifier
    UnknownRecord {
        /// The identifier that was looked up
        id: RecordId,
    },

    /// Operation requested before its inputs exist
    Precondition {
        /// Operation that was refused
        operation: &'static str,
        /// What is missing
        reason: String,
    },

    /// Stored image source could not be decoded again
    Decode {
        /// Record whose source failed, when known
        record: Option<RecordId>,
        /// Underlying decoding error
        source: image::ImageError,
    },

    /// Key-value store rejected the write for lack of space
    StorageFull {
        /// Key that was being written
        key: String,
        /// Whether the previously stored value was removed to recover space
        cleared: bool,
    },

    /// Key-value store could not be reached
    StorageUnavailable {
        /// Key involved in the operation
        key: String,
        /// Description of the failure
        reason: String,
    },

    /// Project snapshot could not be encoded or decoded
    Serialization {
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// Failed to encode or save the exported image
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for SorterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::UnsupportedFormat { name, detected } => match detected {
                Some(format) => write!(
                    f,
                    "Unsupported format for '{name}' ({format}), only PNG and JPEG are accepted"
                ),
                None => write!(
                    f,
                    "Unrecognized format for '{name}', only PNG and JPEG are accepted"
                ),
            },
            Self::CapacityExceeded {
                current,
                incoming,
                limit,
            } => {
                write!(
                    f,
                    "Cannot add {incoming} image(s) to {current}: at most {limit} images are allowed"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::UnknownRecord { id } => write!(f, "No image with id {id}"),
            Self::Precondition { operation, reason } => {
                write!(f, "Cannot {operation}: {reason}")
            }
            Self::Decode { record, source } => match record {
                Some(id) => write!(f, "Failed to decode image {id}: {source}"),
                None => write!(f, "Failed to decode image: {source}"),
            },
            Self::StorageFull { key, cleared } => {
                if *cleared {
                    write!(
                        f,
                        "Storage full while saving '{key}', previously saved data was cleared"
                    )
                } else {
                    write!(f, "Storage full while saving '{key}'")
                }
            }
            Self::StorageUnavailable { key, reason } => {
                write!(f, "Storage unavailable for '{key}': {reason}")
            }
            Self::Serialization { source } => {
                write!(f, "Invalid project data: {source}")
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for SorterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. }
            | Self::Decode { source, .. }
            | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            Self::Serialization { source } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for pipeline results
pub type Result<T> = std::result::Result<T, SorterError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorContext {
    /// Record being processed when the error occurred
    pub record: Option<RecordId>,
}

/// Enriches errors with the record they concern
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the record context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the record context applied
    fn with_record(self, record: RecordId) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<SorterError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only decode failures carry a record slot
            if let SorterError::Decode { record, .. } = &mut error {
                if record.is_none() {
                    *record = context.record;
                }
            }
            error
        })
    }

    fn with_record(self, record: RecordId) -> Result<T> {
        self.with_context(ErrorContext {
            record: Some(record),
        })
    }
}

impl From<image::ImageError> for SorterError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode {
            record: None,
            source: err,
        }
    }
}

impl From<std::io::Error> for SorterError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for SorterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization { source: err }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> SorterError {
    SorterError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a precondition error
pub fn precondition(operation: &'static str, reason: &impl ToString) -> SorterError {
    SorterError::Precondition {
        operation,
        reason: reason.to_string(),
    }
}
