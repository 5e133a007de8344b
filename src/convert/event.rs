//! Conversion outcome events delivered to session observers.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};

/// Outcome of a single conversion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The file was converted (source removal may still have failed; see
    /// the event detail).
    Success,
    /// The file was not converted and remains in place.
    Failure,
}

/// Record of one conversion attempt.
///
/// Events are immutable once created and are emitted to the session's
/// observer channel, never stored. The `Display` impl renders the
/// human-readable timestamped log line the presentation layer shows.
#[derive(Debug, Clone)]
pub struct ConversionEvent {
    /// Path of the source file the attempt was made for.
    pub source_path: PathBuf,
    /// Mapped destination path; `None` only when the failure occurred
    /// before path mapping succeeded.
    pub dest_path: Option<PathBuf>,
    /// Local time the attempt finished.
    pub timestamp: DateTime<Local>,
    /// Whether the conversion succeeded.
    pub outcome: Outcome,
    /// Human-readable qualifier: the removal status on success, the error
    /// description on failure.
    pub detail: String,
}

impl ConversionEvent {
    /// Creates a success event.
    pub fn success(source_path: PathBuf, dest_path: PathBuf, detail: String) -> Self {
        Self {
            source_path,
            dest_path: Some(dest_path),
            timestamp: Local::now(),
            outcome: Outcome::Success,
            detail,
        }
    }

    /// Creates a failure event.
    pub fn failure(source_path: PathBuf, dest_path: Option<PathBuf>, detail: String) -> Self {
        Self {
            source_path,
            dest_path,
            timestamp: Local::now(),
            outcome: Outcome::Failure,
            detail,
        }
    }
}

impl Display for ConversionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let stamp = self.timestamp.format("%Y-%m-%d %H:%M:%S");
        match self.outcome {
            Outcome::Success => {
                let dest = self.dest_path.as_deref().unwrap_or(Path::new("?"));
                write!(
                    f,
                    "[{}] converted: {} -> {} ({})",
                    stamp,
                    self.source_path.display(),
                    dest.display(),
                    self.detail
                )
            }
            Outcome::Failure => {
                write!(
                    f,
                    "[{}] conversion failed: {}: {}",
                    stamp,
                    self.source_path.display(),
                    self.detail
                )
            }
        }
    }
}
