//! Image records and the session that owns them

/// Image record types
pub mod record;
/// Session state and mutation
pub mod session;

pub use record::{ImageRecord, RecordId, Weight};
pub use session::{InteractionMode, Session};
