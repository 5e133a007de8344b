//! Watch configuration management with XDG Base Directory compliance.
//!
//! This module provides persistent settings management with proper XDG
//! directory usage, plus the validated runtime configuration a watch
//! session is constructed from.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    io::Error as StdError,
    path::PathBuf,
};

use {
    parking_lot::{RwLock, RwLockReadGuard},
    serde::{Deserialize, Serialize},
    serde_json::{Error as SerdeJsonError, from_str, to_string_pretty},
    thiserror::Error,
    tracing::debug,
};

use crate::error::domain::ConfigError;

/// Error type for settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to read or write the settings file.
    #[error("IO error: {0}")]
    IoError(#[from] StdError),
    /// Failed to serialize or deserialize settings.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] SerdeJsonError),
}

/// Serializable watch settings with default values.
///
/// These mirror the inputs the presentation layer collects: the two tree
/// roots and the heartbeat interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Directory tree watched for new PNG files.
    pub source_directory: String,
    /// Directory tree receiving the converted JPEG files.
    pub target_directory: String,
    /// Heartbeat interval in seconds.
    pub poll_interval_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            source_directory: String::new(),
            target_directory: String::new(),
            poll_interval_secs: 5,
        }
    }
}

/// Handles loading and saving of persisted watch settings.
#[derive(Debug)]
pub struct SettingsManager {
    /// Thread-safe settings storage.
    settings: RwLock<WatchSettings>,
    /// Path to the configuration file on disk.
    config_path: PathBuf,
}

impl SettingsManager {
    /// Creates a new settings manager with the default config path.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn new() -> Result<Self, SettingsError> {
        Self::with_config_path(get_config_path())
    }

    /// Creates a new settings manager with a custom config path (for testing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be loaded from disk.
    pub fn with_config_path(config_path: PathBuf) -> Result<Self, SettingsError> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            create_dir_all(parent)?;
        }

        let settings = if config_path.exists() {
            debug!("Loading settings from existing file: {:?}", config_path);
            let contents = read_to_string(&config_path)?;
            from_str(&contents)?
        } else {
            debug!("Creating new default settings file: {:?}", config_path);
            WatchSettings::default()
        };

        Ok(SettingsManager {
            settings: RwLock::new(settings),
            config_path,
        })
    }

    /// Gets the current settings.
    pub fn get_settings(&self) -> RwLockReadGuard<'_, WatchSettings> {
        self.settings.read()
    }

    /// Gets the configuration file path.
    pub fn get_config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Updates the settings and saves them to disk.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if settings cannot be saved to disk.
    pub fn update_settings(&self, new_settings: WatchSettings) -> Result<(), SettingsError> {
        let mut settings_write = self.settings.write();
        *settings_write = new_settings;
        drop(settings_write);
        self.save_settings()
    }

    /// Saves the current settings to disk.
    fn save_settings(&self) -> Result<(), SettingsError> {
        debug!("Saving settings to file: {:?}", self.config_path);
        let contents = to_string_pretty(&*self.settings.read())?;
        write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Validated runtime configuration for a watch session.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Absolute path of the watched source tree.
    pub source_root: PathBuf,
    /// Absolute path of the mirrored target tree.
    pub target_root: PathBuf,
    /// Heartbeat interval in seconds. A liveness tick only; event delivery
    /// is push-based and this has no conversion effect.
    pub poll_interval_secs: u64,
}

impl WatchConfig {
    /// Builds and validates a runtime configuration from persisted settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the settings do not describe a startable
    /// session.
    pub fn from_settings(settings: &WatchSettings) -> Result<Self, ConfigError> {
        let config = Self {
            source_root: PathBuf::from(&settings.source_directory),
            target_root: PathBuf::from(&settings.target_directory),
            poll_interval_secs: settings.poll_interval_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration against the session start invariants.
    ///
    /// The source root must be an existing directory. The target root may
    /// be absent (it is created at session start) but must be a directory
    /// if present. Overlapping or nested roots are rejected: a converter
    /// writing into its own watch tree would feed itself.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` describing the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        for root in [&self.source_root, &self.target_root] {
            if !root.is_absolute() {
                return Err(ConfigError::RelativeRoot {
                    path: root.clone(),
                });
            }
        }

        if !self.source_root.is_dir() {
            return Err(ConfigError::SourceRootInvalid {
                path: self.source_root.clone(),
            });
        }

        if self.target_root.exists() && !self.target_root.is_dir() {
            return Err(ConfigError::TargetRootInvalid {
                path: self.target_root.clone(),
            });
        }

        if self.source_root.starts_with(&self.target_root)
            || self.target_root.starts_with(&self.source_root)
        {
            return Err(ConfigError::OverlappingRoots {
                source_root: self.source_root.clone(),
                target_root: self.target_root.clone(),
            });
        }

        Ok(())
    }
}

/// Ensures proper XDG directory usage for the config file.
#[must_use]
pub fn get_config_path() -> PathBuf {
    let mut config_dir = get_xdg_config_home();
    config_dir.push("shuttersync");
    config_dir.push("settings.json");
    config_dir
}

/// Gets the XDG config home directory following XDG Base Directory specification.
///
/// Uses `XDG_CONFIG_HOME` environment variable if set, otherwise defaults to $HOME/.config
fn get_xdg_config_home() -> PathBuf {
    if let Ok(config_home) = var("XDG_CONFIG_HOME")
        && !config_home.is_empty()
    {
        return PathBuf::from(config_home);
    }

    if let Ok(home) = var("HOME") {
        let mut path = PathBuf::from(home);
        path.push(".config");
        return path;
    }

    // Fallback to current directory if HOME is not set (shouldn't happen on Unix)
    PathBuf::from(".")
}
