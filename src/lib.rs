//! Shuttersync - Automatic PNG to JPEG Conversion
//!
//! Shuttersync watches a source directory tree for newly created PNG files,
//! converts each one to a maximum-quality JPEG in a mirrored target tree,
//! and removes the original once the converted copy is safely in place.
//! Files already present at startup are handled by an initial backlog pass
//! before live watching begins.

pub mod config;
pub mod convert;
pub mod error;
pub mod watch;

// Re-export key types for convenience
pub use {
    config::{SettingsManager, WatchConfig, WatchSettings},
    convert::{ConversionEvent, ConversionPipeline, Outcome},
    error::{ConfigError, ConvertError, SessionError},
    watch::{BacklogScanner, SessionState, TreeWatcher, WatchSession},
};
