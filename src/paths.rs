use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path};

use crate::error::PublishError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Round a byte count to megabytes with two decimals
#[inline]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// Size of a file in megabytes, two decimals
pub fn file_size_mb(path: &Path) -> Result<f64, PublishError> {
    let metadata = fs::metadata(path)?;
    Ok(bytes_to_mb(metadata.len()))
}

/// Extension including the leading dot, or an empty string (`.bashrc` has none)
pub fn extension_with_dot(path: &Path) -> String {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Path of `path` relative to `root`, joined with forward slashes
pub fn relative_posix(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Create a directory and its parents if missing
pub fn ensure_dir(path: &Path) -> Result<(), PublishError> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| {
        PublishError::from_io(e, path, |source| PublishError::CreateDirFailed {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Copy a single file from src to dst, creating the destination directory
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, PublishError> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    fs::copy(src, dst).map_err(|e| {
        PublishError::from_io(e, dst, |source| PublishError::CopyFailed {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // ==================== size tests ====================

    #[test]
    fn test_bytes_to_mb_rounds_two_decimals() {
        assert_eq!(bytes_to_mb(0), 0.0);
        assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mb(3_617_587), 3.45);
        // 5 KB rounds down to zero
        assert_eq!(bytes_to_mb(5 * 1024), 0.0);
    }

    #[test]
    fn test_file_size_mb() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("blob.bin");
        fs::write(&file, vec![0u8; 1024 * 1024 * 2]).unwrap();
        assert_eq!(file_size_mb(&file).unwrap(), 2.0);
    }

    #[test]
    fn test_file_size_mb_missing() {
        let temp = TempDir::new().unwrap();
        assert!(file_size_mb(&temp.path().join("missing")).is_err());
    }

    // ==================== extension tests ====================

    #[test]
    fn test_extension_with_dot() {
        assert_eq!(extension_with_dot(Path::new("/x/preview.png")), ".png");
        assert_eq!(extension_with_dot(Path::new("shot.final.JPG")), ".JPG");
        assert_eq!(extension_with_dot(Path::new("noext")), "");
        assert_eq!(extension_with_dot(Path::new(".bashrc")), "");
    }

    // ==================== relative_posix tests ====================

    #[test]
    fn test_relative_posix() {
        let root = PathBuf::from("/repo");
        let file = root.join("wallpapers").join("aurora").join("a.zip");
        assert_eq!(relative_posix(&root, &file), "wallpapers/aurora/a.zip");
    }

    #[test]
    fn test_relative_posix_with_dot_root() {
        let root = PathBuf::from(".");
        let file = root.join("previews").join("a_preview.png");
        assert_eq!(relative_posix(&root, &file), "previews/a_preview.png");
    }

    // ==================== copy_file tests ====================

    #[test]
    fn test_copy_file_creates_parent() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.png");
        fs::write(&src, b"png").unwrap();
        let dst = temp.path().join("previews").join("nested").join("dst.png");

        let bytes = copy_file(&src, &dst).unwrap();

        assert_eq!(bytes, 3);
        assert_eq!(fs::read(&dst).unwrap(), b"png");
    }

    #[test]
    fn test_copy_file_missing_source() {
        let temp = TempDir::new().unwrap();
        let result = copy_file(&temp.path().join("nope"), &temp.path().join("dst"));
        assert!(matches!(result, Err(PublishError::CopyFailed { .. })));
    }

    #[test]
    fn test_ensure_dir_existing_is_ok() {
        let temp = TempDir::new().unwrap();
        assert!(ensure_dir(temp.path()).is_ok());
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
