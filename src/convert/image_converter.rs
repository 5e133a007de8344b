//! PNG decoding and maximum-quality JPEG encoding.

use std::{
    fs::{File, remove_file, rename},
    io::{BufWriter, Error as IoError},
    path::Path,
};

use {image::codecs::jpeg::JpegEncoder, tracing::debug};

use crate::error::domain::ConvertError;

/// Highest quality setting accepted by the JPEG encoder. Conversion must
/// not introduce avoidable loss beyond the format change itself.
const JPEG_QUALITY: u8 = 100;

/// Decodes source images and re-encodes them as maximum-quality JPEGs.
pub struct ImageConverter;

impl ImageConverter {
    /// Converts the PNG at `source_path` into a JPEG at `dest_path`.
    ///
    /// The image is encoded to a temporary sibling first and renamed into
    /// place, so `dest_path` never holds a partially-written file: whenever
    /// the destination exists, it is complete.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::Decode` if the source cannot be decoded
    /// (corrupt, truncated, or still being written when the triggering
    /// event fired), or `ConvertError::Write` if the destination cannot be
    /// produced.
    pub fn convert(source_path: &Path, dest_path: &Path) -> Result<(), ConvertError> {
        let image = image::open(source_path).map_err(|source| ConvertError::Decode {
            path: source_path.to_path_buf(),
            source,
        })?;

        // JPEG has no alpha channel; flatten instead of failing on RGBA
        let pixels = image.into_rgb8();

        let tmp_path = dest_path.with_extension("jpg.tmp");
        let file = File::create(&tmp_path).map_err(|source| ConvertError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        let encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
        if let Err(error) = pixels.write_with_encoder(encoder) {
            let _ = remove_file(&tmp_path);
            return Err(ConvertError::Write {
                path: dest_path.to_path_buf(),
                source: IoError::other(error),
            });
        }

        if let Err(error) = writer.into_inner() {
            let _ = remove_file(&tmp_path);
            return Err(ConvertError::Write {
                path: dest_path.to_path_buf(),
                source: error.into_error(),
            });
        }

        rename(&tmp_path, dest_path).map_err(|source| {
            let _ = remove_file(&tmp_path);
            ConvertError::Write {
                path: dest_path.to_path_buf(),
                source,
            }
        })?;

        debug!(
            source = %source_path.display(),
            dest = %dest_path.display(),
            "converted image"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{read, write};

    use {
        image::{Rgb, RgbImage, Rgba, RgbaImage},
        tempfile::tempdir,
    };

    use crate::{convert::image_converter::ImageConverter, error::domain::ConvertError};

    #[test]
    fn test_round_trip_preserves_dimensions() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("shot.png");
        let dest = dir.path().join("shot.jpg");

        RgbImage::from_pixel(17, 9, Rgb([10, 120, 230]))
            .save(&source)
            .unwrap();

        ImageConverter::convert(&source, &dest).unwrap();

        let converted = image::open(&dest).unwrap();
        assert_eq!(converted.width(), 17);
        assert_eq!(converted.height(), 9);
    }

    #[test]
    fn test_alpha_source_is_flattened() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("overlay.png");
        let dest = dir.path().join("overlay.jpg");

        RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 128]))
            .save(&source)
            .unwrap();

        ImageConverter::convert(&source, &dest).unwrap();
        assert!(dest.exists());
    }

    #[test]
    fn test_zero_byte_source_fails_to_decode() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("empty.png");
        let dest = dir.path().join("empty.jpg");
        write(&source, []).unwrap();

        let result = ImageConverter::convert(&source, &dest);
        assert!(matches!(result, Err(ConvertError::Decode { .. })));
        assert!(source.exists());
        assert!(!dest.exists());
    }

    #[test]
    fn test_truncated_source_fails_to_decode() {
        let dir = tempdir().unwrap();
        let valid = dir.path().join("valid.png");
        RgbImage::from_pixel(32, 32, Rgb([1, 2, 3])).save(&valid).unwrap();

        let bytes = read(&valid).unwrap();
        let source = dir.path().join("truncated.png");
        write(&source, &bytes[..bytes.len() / 2]).unwrap();

        let dest = dir.path().join("truncated.jpg");
        let result = ImageConverter::convert(&source, &dest);
        assert!(matches!(result, Err(ConvertError::Decode { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_unwritable_destination_fails() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("shot.png");
        RgbImage::from_pixel(2, 2, Rgb([0, 0, 0])).save(&source).unwrap();

        let dest = dir.path().join("missing_dir/shot.jpg");
        let result = ImageConverter::convert(&source, &dest);
        assert!(matches!(result, Err(ConvertError::Write { .. })));
    }

    #[test]
    fn test_no_temporary_file_left_behind() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("shot.png");
        let dest = dir.path().join("shot.jpg");
        RgbImage::from_pixel(2, 2, Rgb([5, 5, 5])).save(&source).unwrap();

        ImageConverter::convert(&source, &dest).unwrap();
        assert!(!dir.path().join("shot.jpg.tmp").exists());
    }
}
