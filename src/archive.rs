//! Zip archive creation for theme source folders.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PublishError;
use crate::paths::{ensure_dir, file_size_mb, relative_posix};

/// One entry to be written into the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Absolute (or root-joined) path on disk
    pub path: PathBuf,
    /// Name inside the archive, `/`-separated and relative to the source root
    pub name: String,
    pub is_dir: bool,
}

/// Collect the directory's contents in a stable order, skipping `exclude`
pub fn collect_entries(src: &Path, exclude: &Path) -> Result<Vec<ArchiveEntry>, PublishError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();

        // The archive itself may live under the source folder
        if path == exclude {
            continue;
        }

        let file_type = entry.file_type();
        if !file_type.is_file() && !file_type.is_dir() {
            continue;
        }

        entries.push(ArchiveEntry {
            path: path.to_path_buf(),
            name: relative_posix(src, path),
            is_dir: file_type.is_dir(),
        });
    }

    Ok(entries)
}

/// Package `src` into a zip at `dst`, returning the archive size in MB.
///
/// Parent directories of `dst` are created first. The shutdown flag is
/// checked between entries; an interrupted build leaves whatever was
/// written so far on disk.
pub fn build_archive(
    src: &Path,
    dst: &Path,
    shutdown: &AtomicBool,
    progress: Option<&ProgressBar>,
) -> Result<f64, PublishError> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    let entries = collect_entries(src, dst)?;
    if let Some(pb) = progress {
        pb.set_length(entries.len() as u64);
    }

    let file = File::create(dst).map_err(|e| {
        PublishError::from_io(e, dst, |source| PublishError::ArchiveFailed {
            path: dst.to_path_buf(),
            source: source.into(),
        })
    })?;
    let mut archive = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let zip_err = |source: zip::result::ZipError| PublishError::ArchiveFailed {
        path: dst.to_path_buf(),
        source,
    };

    for entry in &entries {
        if shutdown.load(Ordering::Relaxed) {
            return Err(PublishError::Cancelled);
        }

        if entry.is_dir {
            archive.add_directory(entry.name.clone(), options).map_err(zip_err)?;
        } else {
            archive.start_file(entry.name.clone(), options).map_err(zip_err)?;
            let mut reader = File::open(&entry.path)?;
            io::copy(&mut reader, &mut archive).map_err(|e| {
                PublishError::from_io(e, dst, |source| PublishError::ArchiveFailed {
                    path: dst.to_path_buf(),
                    source: source.into(),
                })
            })?;
        }

        if let Some(pb) = progress {
            pb.inc(1);
            pb.set_message(entry.name.clone());
        }
    }

    let mut writer = archive.finish().map_err(zip_err)?;
    io::Write::flush(&mut writer)?;
    drop(writer);

    file_size_mb(dst)
}
