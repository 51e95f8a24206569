//! Input/output: command line, decoding, persistence, progress and errors

/// Command-line parsing and the batch runner
pub mod cli;
/// Tunable constants
pub mod configuration;
/// Encoded image detection and decoding
pub mod decode;
/// Error types
pub mod error;
/// Project save and restore over a key-value store
pub mod persistence;
/// Terminal progress display
pub mod progress;
