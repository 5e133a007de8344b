//! Watch configuration and persistent settings management.
//!
//! This module provides the persisted settings layer (XDG Base Directory
//! compliant) and the validated runtime configuration sessions start from.

pub mod settings;

pub use settings::{SettingsError, SettingsManager, WatchConfig, WatchSettings, get_config_path};
