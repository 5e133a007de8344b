//! PNG to JPEG conversion primitives.
//!
//! This module provides the per-file half of the system: mapping source
//! paths into the mirrored target tree, decoding and re-encoding images,
//! and the pipeline that combines both into a convert-and-remove operation
//! with failure isolation.

use std::path::Path;

pub mod event;
pub mod image_converter;
pub mod path_mapper;
pub mod pipeline;

pub use {
    event::{ConversionEvent, Outcome},
    image_converter::ImageConverter,
    path_mapper::PathMapper,
    pipeline::ConversionPipeline,
};

/// Extension of files picked up for conversion (case-insensitive).
pub const SOURCE_EXTENSION: &str = "png";

/// Extension given to converted files.
pub const TARGET_EXTENSION: &str = "jpg";

/// Checks if a path names a convertible source image.
pub fn is_source_image(path: &Path) -> bool {
    if let Some(extension) = path.extension() {
        if let Some(ext_str) = extension.to_str() {
            ext_str.eq_ignore_ascii_case(SOURCE_EXTENSION)
        } else {
            false
        }
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::convert::is_source_image;

    #[test]
    fn test_source_image_extensions() {
        let test_cases = vec![
            ("shot.png", true),
            ("SHOT.PNG", true), // Case insensitive
            ("shot.Png", true),
            ("shot.jpg", false),
            ("shot.png.bak", false),
            ("shot", false),
            (".png", false), // Hidden file with no stem has no extension
        ];

        for (filename, expected) in test_cases {
            let path = PathBuf::from(filename);
            assert_eq!(
                is_source_image(&path),
                expected,
                "Failed for filename: {}",
                filename
            );
        }
    }
}
