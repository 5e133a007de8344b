//! Source to target path mapping.

use std::{
    fs::create_dir_all,
    path::{Path, PathBuf},
};

use crate::{convert::TARGET_EXTENSION, error::domain::ConvertError};

/// Maps source file paths into the mirrored target tree.
///
/// A source path is re-rooted by taking its path relative to the source
/// root, joining it onto the target root, and swapping the extension for
/// the target format's.
#[derive(Debug, Clone)]
pub struct PathMapper {
    source_root: PathBuf,
    target_root: PathBuf,
}

impl PathMapper {
    /// Creates a mapper for the given pair of tree roots.
    pub fn new(source_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
        }
    }

    /// Computes the destination path for `source_path` without touching the
    /// filesystem.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::OutsideRoot` if `source_path` is not under
    /// the source root.
    pub fn resolve(&self, source_path: &Path) -> Result<PathBuf, ConvertError> {
        let relative =
            source_path
                .strip_prefix(&self.source_root)
                .map_err(|_| ConvertError::OutsideRoot {
                    path: source_path.to_path_buf(),
                    root: self.source_root.clone(),
                })?;

        Ok(self
            .target_root
            .join(relative)
            .with_extension(TARGET_EXTENSION))
    }

    /// Computes the destination path and ensures its parent directories
    /// exist, creating them if absent.
    ///
    /// Directory creation is idempotent and safe under concurrent calls for
    /// the same directory: "already exists" is success, not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::OutsideRoot` if `source_path` is not under
    /// the source root, or `ConvertError::Write` if an intermediate
    /// directory cannot be created.
    pub fn map(&self, source_path: &Path) -> Result<PathBuf, ConvertError> {
        let dest_path = self.resolve(source_path)?;

        if let Some(parent) = dest_path.parent() {
            create_dir_all(parent).map_err(|source| ConvertError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Ok(dest_path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use tempfile::tempdir;

    use crate::{convert::path_mapper::PathMapper, error::domain::ConvertError};

    #[test]
    fn test_resolve_mirrors_relative_path() {
        let mapper = PathMapper::new("/in", "/out");

        let dest = mapper.resolve(Path::new("/in/a/b/shot.png")).unwrap();
        assert_eq!(dest, PathBuf::from("/out/a/b/shot.jpg"));

        let top_level = mapper.resolve(Path::new("/in/shot.png")).unwrap();
        assert_eq!(top_level, PathBuf::from("/out/shot.jpg"));
    }

    #[test]
    fn test_resolve_swaps_uppercase_extension() {
        let mapper = PathMapper::new("/in", "/out");

        let dest = mapper.resolve(Path::new("/in/SHOT.PNG")).unwrap();
        assert_eq!(dest, PathBuf::from("/out/SHOT.jpg"));
    }

    #[test]
    fn test_resolve_rejects_path_outside_root() {
        let mapper = PathMapper::new("/in", "/out");

        let result = mapper.resolve(Path::new("/elsewhere/shot.png"));
        assert!(matches!(result, Err(ConvertError::OutsideRoot { .. })));
    }

    #[test]
    fn test_map_creates_intermediate_directories() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        let mapper = PathMapper::new(source.path(), target.path());

        let source_path = source.path().join("a/b/shot.png");
        let dest = mapper.map(&source_path).unwrap();

        assert_eq!(dest, target.path().join("a/b/shot.jpg"));
        assert!(target.path().join("a/b").is_dir());

        // Idempotent: mapping again with the directory in place succeeds
        assert_eq!(mapper.map(&source_path).unwrap(), dest);
    }
}
