//! Per-file conversion pipeline with failure isolation.

use std::{fs::remove_file, path::Path};

use tracing::{debug, warn};

use crate::{
    config::WatchConfig,
    convert::{ConversionEvent, ImageConverter, PathMapper, is_source_image},
};

/// Convert-and-remove pipeline for one watched tree pair.
///
/// The pipeline filters, maps, converts, and finally removes the source
/// file. Every per-file error is captured here and turned into a failure
/// event: nothing that happens to a single file can abort the watching
/// session.
#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    mapper: PathMapper,
}

impl ConversionPipeline {
    /// Creates a pipeline over the configured tree roots.
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            mapper: PathMapper::new(&config.source_root, &config.target_root),
        }
    }

    /// Runs one file through the pipeline.
    ///
    /// Returns `None` for paths that do not match the watched source
    /// extension; those are ignored silently and produce no event.
    pub fn process(&self, source_path: &Path) -> Option<ConversionEvent> {
        if !is_source_image(source_path) {
            return None;
        }
        Some(self.convert_and_remove(source_path))
    }

    fn convert_and_remove(&self, source_path: &Path) -> ConversionEvent {
        let dest_path = match self.mapper.map(source_path) {
            Ok(path) => path,
            Err(error) => {
                warn!(source = %source_path.display(), error = %error, "path mapping failed");
                return ConversionEvent::failure(
                    source_path.to_path_buf(),
                    None,
                    error.to_string(),
                );
            }
        };

        if let Err(error) = ImageConverter::convert(source_path, &dest_path) {
            warn!(source = %source_path.display(), error = %error, "conversion failed");
            return ConversionEvent::failure(
                source_path.to_path_buf(),
                Some(dest_path),
                error.to_string(),
            );
        }

        // At-least-once: the converted file stays even if removal fails.
        // The freshness check skips the surviving source on later passes.
        let detail = match remove_file(source_path) {
            Ok(()) => "source removed".to_string(),
            Err(error) => {
                warn!(source = %source_path.display(), error = %error, "failed to remove source");
                format!("source not removed: {}", error)
            }
        };

        debug!(
            source = %source_path.display(),
            dest = %dest_path.display(),
            "processed file"
        );
        ConversionEvent::success(source_path.to_path_buf(), dest_path, detail)
    }
}
