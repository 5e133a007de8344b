//! Domain-specific error types using `thiserror`.
//!
//! This module defines the error enums for the three failure domains:
//! configuration validation, per-file conversion, and session-fatal
//! conditions. Per-file errors never terminate a session; they are captured
//! into conversion events at the pipeline boundary.

use std::{io::Error as IoError, path::PathBuf};

use {image::ImageError, notify::Error as NotifyError, thiserror::Error};

/// Configuration validation errors.
///
/// All variants are fatal: a session with an invalid configuration never
/// starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Source root is missing or not a directory.
    #[error("source root is not an existing directory: {}", .path.display())]
    SourceRootInvalid { path: PathBuf },
    /// Target root exists but is not a directory.
    #[error("target root exists but is not a directory: {}", .path.display())]
    TargetRootInvalid { path: PathBuf },
    /// Roots must be given as absolute paths.
    #[error("root path must be absolute: {}", .path.display())]
    RelativeRoot { path: PathBuf },
    /// Roots are equal or one is nested inside the other.
    #[error(
        "source and target roots overlap: {} / {}",
        .source_root.display(),
        .target_root.display()
    )]
    OverlappingRoots {
        source_root: PathBuf,
        target_root: PathBuf,
    },
    /// The heartbeat interval must be at least one second.
    #[error("poll interval must be positive")]
    ZeroPollInterval,
}

/// Per-file conversion errors.
///
/// These are logged and turned into failure events; the source file is left
/// in place and the session keeps running.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The path does not live under the watched source root.
    #[error("path {} is not under source root {}", .path.display(), .root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },
    /// The source image could not be decoded (corrupt, truncated, or still
    /// being written when the event fired).
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    /// The destination (or an intermediate directory) could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: IoError,
    },
}

/// Session-fatal errors.
///
/// Unlike [`ConvertError`], these terminate the session and are surfaced on
/// the fatal error stream, distinct from the per-file event log.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Configuration rejected at session start.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The filesystem watch subscription itself failed.
    #[error("filesystem watch failed: {0}")]
    Watch(#[from] NotifyError),
    /// I/O failure on one of the tree roots.
    #[error("i/o failure on {}: {source}", .path.display())]
    RootIo {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    /// The session was used outside its single start/stop lifecycle.
    #[error("invalid session state: {reason}")]
    InvalidState { reason: String },
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::error::domain::{ConfigError, ConvertError, SessionError};

    #[test]
    fn test_config_error_display() {
        let overlap = ConfigError::OverlappingRoots {
            source_root: PathBuf::from("/photos"),
            target_root: PathBuf::from("/photos/out"),
        };
        assert_eq!(
            overlap.to_string(),
            "source and target roots overlap: /photos / /photos/out"
        );

        let interval = ConfigError::ZeroPollInterval;
        assert_eq!(interval.to_string(), "poll interval must be positive");
    }

    #[test]
    fn test_convert_error_display() {
        let outside = ConvertError::OutsideRoot {
            path: PathBuf::from("/elsewhere/shot.png"),
            root: PathBuf::from("/photos"),
        };
        assert_eq!(
            outside.to_string(),
            "path /elsewhere/shot.png is not under source root /photos"
        );
    }

    #[test]
    fn test_session_error_display() {
        let state_error = SessionError::InvalidState {
            reason: "test reason".to_string(),
        };
        assert_eq!(state_error.to_string(), "invalid session state: test reason");

        let config_error: SessionError = ConfigError::ZeroPollInterval.into();
        assert_eq!(
            config_error.to_string(),
            "configuration error: poll interval must be positive"
        );
    }
}
