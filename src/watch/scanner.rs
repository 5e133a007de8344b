//! Initial backlog scanning of the source tree.
//!
//! Files already present when a session starts never trigger filesystem
//! events, so the session walks the tree once before activating the live
//! watcher. The freshness check keeps the pass idempotent across restarts.

use std::{
    fs::read_dir,
    path::{Path, PathBuf},
    time::SystemTime,
};

use tracing::{debug, warn};

use crate::{
    config::WatchConfig,
    convert::{PathMapper, is_source_image},
};

/// One-shot scanner for source images present at session start.
#[derive(Debug)]
pub struct BacklogScanner {
    source_root: PathBuf,
    mapper: PathMapper,
}

impl BacklogScanner {
    /// Creates a scanner over the configured tree roots.
    pub fn new(config: &WatchConfig) -> Self {
        Self {
            source_root: config.source_root.clone(),
            mapper: PathMapper::new(&config.source_root, &config.target_root),
        }
    }

    /// Collects every source image under the root that still needs
    /// conversion.
    ///
    /// Each call performs a fresh walk of the tree, so the result reflects
    /// the directory state at call time: a second call after a completed
    /// pass returns an empty list.
    pub fn pending_files(&self) -> Vec<PathBuf> {
        let mut pending = Vec::new();
        self.collect_from_directory(&self.source_root, &mut pending);
        debug!(
            "backlog scan found {} file(s) pending conversion",
            pending.len()
        );
        pending
    }

    /// Recursively collects pending source images from a directory and its
    /// subdirectories.
    fn collect_from_directory(&self, dir: &Path, pending: &mut Vec<PathBuf>) {
        let entries = match read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("skipping unreadable directory {:?}: {}", dir, e);
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();

            if path.is_dir() {
                self.collect_from_directory(&path, pending);
            } else if is_source_image(&path) && self.needs_conversion(&path) {
                pending.push(path);
            }
        }
    }

    /// Freshness check: convert only when the mapped destination is missing
    /// or has an earlier last-modified time than the source.
    ///
    /// This guards against reprocessing already-converted files across
    /// restarts when removal of the source failed.
    fn needs_conversion(&self, source_path: &Path) -> bool {
        // A mapping failure is surfaced by the pipeline, not masked here
        let Ok(dest_path) = self.mapper.resolve(source_path) else {
            return true;
        };

        if !dest_path.exists() {
            return true;
        }

        match (modified_time(source_path), modified_time(&dest_path)) {
            (Some(source), Some(dest)) => source > dest,
            // Unreadable metadata: err toward converting; the check re-runs
            // on the next pass
            _ => true,
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    path.metadata().ok().and_then(|meta| meta.modified().ok())
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{create_dir_all, write},
        path::Path,
        thread::sleep,
        time::Duration,
    };

    use {
        image::{Rgb, RgbImage},
        tempfile::tempdir,
    };

    use crate::{
        config::WatchConfig,
        convert::ConversionPipeline,
        watch::scanner::BacklogScanner,
    };

    fn test_config(source: &Path, target: &Path) -> WatchConfig {
        WatchConfig {
            source_root: source.to_path_buf(),
            target_root: target.to_path_buf(),
            poll_interval_secs: 5,
        }
    }

    #[test]
    fn test_pending_files_finds_nested_sources_only() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();

        let nested = source.path().join("a/b");
        create_dir_all(&nested).unwrap();
        write(source.path().join("top.png"), b"x").unwrap();
        write(nested.join("deep.png"), b"x").unwrap();
        write(nested.join("notes.txt"), b"x").unwrap();

        let scanner = BacklogScanner::new(&test_config(source.path(), target.path()));
        let mut pending = scanner.pending_files();
        pending.sort();

        assert_eq!(
            pending,
            vec![nested.join("deep.png"), source.path().join("top.png")]
        );
    }

    #[test]
    fn test_fresh_destination_is_skipped() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();

        // Source written first, destination after: destination is fresher
        write(source.path().join("done.png"), b"x").unwrap();
        write(target.path().join("done.jpg"), b"x").unwrap();

        let scanner = BacklogScanner::new(&test_config(source.path(), target.path()));
        assert!(scanner.pending_files().is_empty());
    }

    #[test]
    fn test_stale_destination_is_reconverted() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();

        write(target.path().join("stale.jpg"), b"x").unwrap();
        // Coarse-timestamp filesystems need a visible gap
        sleep(Duration::from_millis(1100));
        write(source.path().join("stale.png"), b"x").unwrap();

        let scanner = BacklogScanner::new(&test_config(source.path(), target.path()));
        assert_eq!(
            scanner.pending_files(),
            vec![source.path().join("stale.png")]
        );
    }

    #[test]
    fn test_scan_is_idempotent_after_processing() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        let config = test_config(source.path(), target.path());

        let nested = source.path().join("batch");
        create_dir_all(&nested).unwrap();
        for name in ["one.png", "two.png"] {
            RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]))
                .save(nested.join(name))
                .unwrap();
        }

        let scanner = BacklogScanner::new(&config);
        let pipeline = ConversionPipeline::new(&config);

        let first_pass = scanner.pending_files();
        assert_eq!(first_pass.len(), 2);
        for path in &first_pass {
            pipeline.process(path).unwrap();
        }

        // Sources are removed and destinations fresh: nothing left to do
        assert!(scanner.pending_files().is_empty());
    }
}
